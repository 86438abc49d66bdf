//! Frame compositing.
//!
//! The compositor owns a BGRA surface. Every tick it draws the primary
//! (screen) frame scaled to fill the surface, then optionally overlays the
//! secondary (webcam) frame with shape clipping, mirroring, border and
//! shadow. The composited frames are emitted on a channel, standing in for
//! a captured canvas stream.

mod config;
mod error;
mod renderer;
mod surface;

pub use config::{CompositorConfig, OverlayCorner, OverlayRect, OverlayShape, OverlaySize};
pub use error::CompositorError;
pub use renderer::{RenderLoop, SurfaceSpec};
pub use surface::Surface;

/// Fixed padding between the overlay and the canvas edge, in pixels.
pub const OVERLAY_PADDING_PX: u32 = 16;

/// Channel capacity for composited frames.
pub const COMPOSITED_CHANNEL_CAPACITY: usize = 3;

/// Result type for compositor operations.
pub type CompositorResult<T> = Result<T, CompositorError>;
