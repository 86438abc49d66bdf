//! Deterministic synthetic frame source.
//!
//! Produces a moving gradient at a fixed resolution and frame rate. Used by
//! tests and headless runs in place of a platform screen/camera backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bytes::Bytes;
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, instrument};

use crate::frame::{FrameTimestamp, VideoFrame};
use crate::{CaptureError, CaptureResult, FrameSource, FRAME_CHANNEL_CAPACITY};

/// Synthetic frame generator implementing [`FrameSource`].
pub struct TestPatternSource {
    width: u32,
    height: u32,
    fps: u32,
    /// Stop after this many frames, simulating a revoked screen share.
    frame_limit: Option<u64>,
    should_stop: Arc<AtomicBool>,
    is_active: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl TestPatternSource {
    /// Create a new pattern source.
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            fps: fps.max(1),
            frame_limit: None,
            should_stop: Arc::new(AtomicBool::new(false)),
            is_active: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Create a source that ends on its own after `frames` frames.
    pub fn with_frame_limit(width: u32, height: u32, fps: u32, frames: u64) -> Self {
        let mut source = Self::new(width, height, fps);
        source.frame_limit = Some(frames);
        source
    }
}

impl FrameSource for TestPatternSource {
    #[instrument(name = "pattern_start", skip(self), fields(width = self.width, height = self.height))]
    fn start(&mut self) -> CaptureResult<Receiver<VideoFrame>> {
        if self.is_active.load(Ordering::SeqCst) {
            return Err(CaptureError::AlreadyStarted);
        }
        if self.width == 0 || self.height == 0 {
            return Err(CaptureError::InvalidRequest(format!(
                "zero-sized source {}x{}",
                self.width, self.height
            )));
        }

        let (sender, receiver): (Sender<VideoFrame>, Receiver<VideoFrame>) =
            crossbeam_channel::bounded(FRAME_CHANNEL_CAPACITY);

        let should_stop = Arc::clone(&self.should_stop);
        should_stop.store(false, Ordering::SeqCst);
        let is_active = Arc::clone(&self.is_active);
        is_active.store(true, Ordering::SeqCst);

        let width = self.width;
        let height = self.height;
        let fps = self.fps;
        let frame_limit = self.frame_limit;

        let handle = thread::spawn(move || {
            generate_loop(
                width,
                height,
                fps,
                frame_limit,
                sender,
                should_stop,
                is_active,
            );
        });

        self.worker = Some(handle);
        debug!("Pattern source started");
        Ok(receiver)
    }

    #[instrument(name = "pattern_stop", skip(self))]
    fn stop(&mut self) -> CaptureResult<()> {
        self.should_stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        self.is_active.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for TestPatternSource {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn generate_loop(
    width: u32,
    height: u32,
    fps: u32,
    frame_limit: Option<u64>,
    sender: Sender<VideoFrame>,
    should_stop: Arc<AtomicBool>,
    is_active: Arc<AtomicBool>,
) {
    let frame_interval = Duration::from_nanos(1_000_000_000 / fps as u64);
    let start_time = Instant::now();
    let mut next_frame_time = start_time;
    let mut sequence = 0u64;

    while !should_stop.load(Ordering::SeqCst) {
        if let Some(limit) = frame_limit {
            if sequence >= limit {
                break;
            }
        }

        let frame = render_pattern(width, height, sequence, start_time);

        match sender.try_send(frame) {
            Ok(()) => {}
            // Consumer is behind; drop the frame rather than block the loop.
            Err(crossbeam_channel::TrySendError::Full(_)) => {}
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => break,
        }

        sequence += 1;
        next_frame_time += frame_interval;

        let now = Instant::now();
        if next_frame_time > now {
            thread::sleep(next_frame_time - now);
        }
    }

    is_active.store(false, Ordering::SeqCst);
    debug!(frames = sequence, "Pattern source exiting");
}

/// Render one gradient frame. The pattern shifts with the sequence number so
/// consecutive frames differ.
fn render_pattern(width: u32, height: u32, sequence: u64, start_time: Instant) -> VideoFrame {
    let mut data = vec![0u8; VideoFrame::bgra_buffer_size(width, height)];
    let shift = (sequence % 256) as u32;

    for y in 0..height {
        let g = ((y * 255) / height.max(1)) as u8;
        for x in 0..width {
            let idx = ((y * width + x) * 4) as usize;
            let t = ((((x + shift) % width) * 255) / width) as u8;
            data[idx] = t; // B
            data[idx + 1] = g; // G
            data[idx + 2] = 255 - t; // R
            data[idx + 3] = 255;
        }
    }

    VideoFrame::new(
        Bytes::from(data),
        width,
        height,
        FrameTimestamp::now(start_time),
        sequence,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_valid_frames() {
        let mut source = TestPatternSource::new(64, 48, 30);
        let rx = source.start().unwrap();
        let frame = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(frame.is_valid());
        assert_eq!((frame.width, frame.height), (64, 48));
        source.stop().unwrap();
        assert!(!source.is_active());
    }

    #[test]
    fn double_start_is_an_error() {
        let mut source = TestPatternSource::new(8, 8, 30);
        let _rx = source.start().unwrap();
        assert!(matches!(source.start(), Err(CaptureError::AlreadyStarted)));
        source.stop().unwrap();
    }

    #[test]
    fn frame_limited_source_disconnects() {
        let mut source = TestPatternSource::with_frame_limit(8, 8, 120, 3);
        let rx = source.start().unwrap();
        let mut seen = 0;
        while rx.recv_timeout(Duration::from_secs(1)).is_ok() {
            seen += 1;
        }
        assert!(seen <= 3);
        // Sender side hung up after the limit.
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        source.stop().unwrap();
    }

    #[test]
    fn zero_size_is_rejected() {
        let mut source = TestPatternSource::new(0, 8, 30);
        assert!(matches!(
            source.start(),
            Err(CaptureError::InvalidRequest(_))
        ));
    }
}
