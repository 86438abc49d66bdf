//! Error types for the audio module.

use thiserror::Error;

/// Errors that can occur during audio operations.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The user declined microphone access.
    #[error("Permission denied for {device}")]
    PermissionDenied { device: String },

    /// Audio device not found.
    #[error("Audio device not found: {0}")]
    DeviceNotFound(String),

    /// Capture already started.
    #[error("Audio capture already started")]
    AlreadyStarted,

    /// Capture not started.
    #[error("Audio capture not started")]
    NotStarted,

    /// Channel send error.
    #[error("Failed to send audio: channel disconnected")]
    ChannelDisconnected,

    /// Graph construction error.
    #[error("Audio graph error: {0}")]
    GraphError(String),
}
