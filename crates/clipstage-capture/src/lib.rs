//! Video frame types and capture sources.
//!
//! This crate defines the BGRA frame type flowing through the pipeline and
//! the `FrameSource` seam behind which screen and camera backends live. A
//! deterministic test-pattern source is provided for tests and headless runs.

mod error;
mod frame;
mod pattern;

pub use error::CaptureError;
pub use frame::{FrameTimestamp, VideoFrame};
pub use pattern::TestPatternSource;

use crossbeam_channel::Receiver;

/// Channel capacity for captured frames.
pub const FRAME_CHANNEL_CAPACITY: usize = 3;

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Trait for video frame sources (screen, camera, synthetic).
pub trait FrameSource: Send {
    /// Start producing frames.
    fn start(&mut self) -> CaptureResult<Receiver<VideoFrame>>;

    /// Stop producing frames and release the device.
    fn stop(&mut self) -> CaptureResult<()>;

    /// Check if the source is actively producing frames.
    fn is_active(&self) -> bool;

    /// Get the source dimensions in pixels.
    fn dimensions(&self) -> (u32, u32);
}
