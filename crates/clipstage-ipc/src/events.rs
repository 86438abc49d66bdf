//! Events sent from the engine to the UI.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::{SessionState, SessionWarning};

/// Events that the engine can send to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Session state has changed.
    StateChanged {
        /// Previous state.
        previous: SessionState,

        /// Current state.
        current: SessionState,
    },

    /// An optional source is unavailable; the session continues degraded.
    Warning(SessionWarning),

    /// A finished recording was persisted.
    RecordingSaved {
        id: Uuid,

        /// Duration in seconds, paused time excluded.
        duration_secs: f64,

        /// Container payload size.
        byte_size: u64,
    },

    /// A screenshot was persisted.
    ScreenshotSaved { id: Uuid },

    /// Error occurred.
    Error {
        /// Whether the error is recoverable.
        recoverable: bool,

        /// Error message.
        message: String,
    },

    /// Engine is ready.
    Ready,

    /// Engine has shut down.
    Shutdown,
}
