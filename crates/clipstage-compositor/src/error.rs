//! Error types for the compositor.

use thiserror::Error;

/// Errors that can occur during compositing.
#[derive(Debug, Error)]
pub enum CompositorError {
    /// Surface dimensions are unusable.
    #[error("Invalid surface dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Render loop already started.
    #[error("Render loop already started")]
    AlreadyStarted,

    /// Channel send error.
    #[error("Failed to send composited frame: channel disconnected")]
    ChannelDisconnected,
}
