//! Recording engine core.
//!
//! Owns the session state machine (`Idle → Recording → {Paused ⇄ Recording}
//! → Idle`), the device acquisition seam and the command loop that drives
//! everything from typed IPC messages.

mod devices;
mod engine;
mod error;
mod session;

pub use devices::{MediaDevices, MicConstraints, ScreenCapture, SyntheticDevices};
pub use engine::Engine;
pub use error::EngineError;
pub use session::RecordingSession;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
