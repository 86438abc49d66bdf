//! Commands sent from the UI to the engine.

use serde::{Deserialize, Serialize};

use crate::settings::RecordingSettings;

/// Commands that the UI can send to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionCommand {
    /// Start recording with the given settings.
    Start { settings: RecordingSettings },

    /// Pause the active recording.
    Pause,

    /// Resume a paused recording.
    Resume,

    /// Stop and persist the recording.
    Stop,

    /// Capture the current composited frame as a still image.
    Screenshot,

    /// Request current session state.
    GetState,

    /// Shut the engine down completely.
    Shutdown,
}
