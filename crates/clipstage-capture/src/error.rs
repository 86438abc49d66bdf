//! Error types for the capture module.

use thiserror::Error;

/// Errors that can occur during capture operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The user declined access to the device.
    #[error("Permission denied for {device}")]
    PermissionDenied { device: String },

    /// Capture source not found.
    #[error("Capture source not found: {0}")]
    SourceNotFound(String),

    /// Capture already started.
    #[error("Capture already started")]
    AlreadyStarted,

    /// Capture not started.
    #[error("Capture not started")]
    NotStarted,

    /// The source ended unexpectedly (device unplugged, share revoked).
    #[error("Capture source ended")]
    SourceEnded,

    /// Requested dimensions or frame rate are not usable.
    #[error("Invalid capture request: {0}")]
    InvalidRequest(String),

    /// Channel send error.
    #[error("Failed to send frame: channel disconnected")]
    ChannelDisconnected,
}
