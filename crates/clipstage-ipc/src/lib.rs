//! Typed UI<->engine messages for the recorder.
//!
//! This crate defines all the message types used for communication between
//! the host UI and the capture engine core.

mod commands;
mod events;
mod settings;
mod state;

pub use commands::SessionCommand;
pub use events::SessionEvent;
pub use settings::{
    AudioSourceKind, FrameRate, OverlayCornerSetting, OverlaySettings, OverlayShapeSetting,
    OverlaySizeSetting, QualityPreset, RecordingSettings, ScreenSourceKind,
};
pub use state::{SessionState, SessionWarning};

use crossbeam_channel::{Receiver, Sender};

/// Channel capacity for commands (UI → engine).
pub const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Channel capacity for events (engine → UI).
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Creates a bounded command channel.
pub fn command_channel() -> (Sender<SessionCommand>, Receiver<SessionCommand>) {
    crossbeam_channel::bounded(COMMAND_CHANNEL_CAPACITY)
}

/// Creates a bounded event channel.
pub fn event_channel() -> (Sender<SessionEvent>, Receiver<SessionEvent>) {
    crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY)
}
