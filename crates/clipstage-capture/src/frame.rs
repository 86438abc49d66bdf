//! Captured frame types.

use bytes::Bytes;
use std::time::Instant;

/// Bytes per BGRA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Timestamp for a captured frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameTimestamp {
    /// Monotonic timestamp when the frame was produced.
    pub capture_time: Instant,

    /// Frame presentation timestamp in 100ns units (for AV sync).
    pub pts_100ns: u64,
}

impl FrameTimestamp {
    /// Create a timestamp for "now", relative to a stream start instant.
    pub fn now(start_time: Instant) -> Self {
        let capture_time = Instant::now();
        let elapsed = capture_time.duration_since(start_time);
        let pts_100ns = elapsed.as_nanos() as u64 / 100;

        Self {
            capture_time,
            pts_100ns,
        }
    }

    /// Get the presentation timestamp in milliseconds.
    pub fn pts_ms(&self) -> u64 {
        self.pts_100ns / 10_000
    }
}

/// A video frame in BGRA8 format.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// BGRA pixel data, row-major, top-down.
    pub data: Bytes,

    /// Frame width in pixels.
    pub width: u32,

    /// Frame height in pixels.
    pub height: u32,

    /// Capture timestamp.
    pub timestamp: FrameTimestamp,

    /// Monotonically increasing sequence number.
    pub sequence: u64,
}

impl VideoFrame {
    /// Create a new frame.
    pub fn new(
        data: Bytes,
        width: u32,
        height: u32,
        timestamp: FrameTimestamp,
        sequence: u64,
    ) -> Self {
        Self {
            data,
            width,
            height,
            timestamp,
            sequence,
        }
    }

    /// Expected BGRA buffer size for the given dimensions.
    pub fn bgra_buffer_size(width: u32, height: u32) -> usize {
        width as usize * height as usize * BYTES_PER_PIXEL
    }

    /// Validate that the frame data matches its declared dimensions.
    pub fn is_valid(&self) -> bool {
        self.data.len() == Self::bgra_buffer_size(self.width, self.height)
    }

    /// Read the BGRA pixel at (x, y). Out-of-bounds reads return black.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 255];
        }
        let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = &self.data[idx..idx + 4];
        [px[0], px[1], px[2], px[3]]
    }
}
