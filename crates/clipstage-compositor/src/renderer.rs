//! Compositor render loop.
//!
//! A worker thread ticks at the configured frame rate, drains the freshest
//! primary/secondary frames, draws onto the surface and emits the result.
//! The loop never stalls on a not-ready source: it reuses the last frame it
//! saw, or skips the draw entirely until the first primary frame arrives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use parking_lot::RwLock;
use tracing::{debug, info, instrument};

use clipstage_capture::{FrameTimestamp, VideoFrame};

use crate::config::CompositorConfig;
use crate::surface::Surface;
use crate::{CompositorError, CompositorResult, COMPOSITED_CHANNEL_CAPACITY};

/// Output surface dimensions and tick rate.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceSpec {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

/// Cancellable compositing loop.
pub struct RenderLoop {
    spec: SurfaceSpec,
    config: Arc<RwLock<CompositorConfig>>,
    should_stop: Arc<AtomicBool>,
    /// Set by the worker when the primary source hung up on its own.
    source_ended: Arc<AtomicBool>,
    last_composited: Arc<RwLock<Option<VideoFrame>>>,
    worker: Option<JoinHandle<()>>,
}

impl RenderLoop {
    /// Create a render loop reading settings from the shared config.
    pub fn new(spec: SurfaceSpec, config: Arc<RwLock<CompositorConfig>>) -> Self {
        Self {
            spec,
            config,
            should_stop: Arc::new(AtomicBool::new(false)),
            source_ended: Arc::new(AtomicBool::new(false)),
            last_composited: Arc::new(RwLock::new(None)),
            worker: None,
        }
    }

    /// Start compositing. Returns the composited frame stream.
    #[instrument(name = "render_start", skip_all, fields(width = self.spec.width, height = self.spec.height, fps = self.spec.fps))]
    pub fn start(
        &mut self,
        primary_rx: Receiver<VideoFrame>,
        secondary_rx: Option<Receiver<VideoFrame>>,
    ) -> CompositorResult<Receiver<VideoFrame>> {
        if self.worker.is_some() {
            return Err(CompositorError::AlreadyStarted);
        }

        let surface = Surface::new(self.spec.width, self.spec.height)?;

        let (sender, receiver): (Sender<VideoFrame>, Receiver<VideoFrame>) =
            crossbeam_channel::bounded(COMPOSITED_CHANNEL_CAPACITY);

        let should_stop = Arc::clone(&self.should_stop);
        should_stop.store(false, Ordering::SeqCst);
        let source_ended = Arc::clone(&self.source_ended);
        source_ended.store(false, Ordering::SeqCst);
        let config = Arc::clone(&self.config);
        let last_composited = Arc::clone(&self.last_composited);
        let fps = self.spec.fps.max(1);

        let handle = thread::spawn(move || {
            render_loop(
                surface,
                fps,
                primary_rx,
                secondary_rx,
                config,
                sender,
                should_stop,
                source_ended,
                last_composited,
            );
        });

        self.worker = Some(handle);
        info!("Render loop started");
        Ok(receiver)
    }

    /// Cancel the pending reschedule and join the worker.
    #[instrument(name = "render_stop", skip(self))]
    pub fn stop(&mut self) {
        self.should_stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    /// True once the primary source ended on its own (share revoked).
    pub fn source_ended(&self) -> bool {
        self.source_ended.load(Ordering::SeqCst)
    }

    /// Latest composited frame, if any tick has drawn yet.
    pub fn snapshot(&self) -> Option<VideoFrame> {
        self.last_composited.read().clone()
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Drain a channel, keeping only the freshest frame. Returns
/// `Err(Disconnected)` only when the channel is hung up and empty.
fn drain_latest(rx: &Receiver<VideoFrame>) -> Result<Option<VideoFrame>, TryRecvError> {
    let mut latest = None;
    loop {
        match rx.try_recv() {
            Ok(frame) => latest = Some(frame),
            Err(TryRecvError::Empty) => return Ok(latest),
            Err(TryRecvError::Disconnected) => {
                return match latest {
                    Some(frame) => Ok(Some(frame)),
                    None => Err(TryRecvError::Disconnected),
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn render_loop(
    mut surface: Surface,
    fps: u32,
    primary_rx: Receiver<VideoFrame>,
    secondary_rx: Option<Receiver<VideoFrame>>,
    config: Arc<RwLock<CompositorConfig>>,
    sender: Sender<VideoFrame>,
    should_stop: Arc<AtomicBool>,
    source_ended: Arc<AtomicBool>,
    last_composited: Arc<RwLock<Option<VideoFrame>>>,
) {
    debug!("Render loop thread started");

    let tick_interval = Duration::from_nanos(1_000_000_000 / fps as u64);
    let start_time = Instant::now();
    let mut next_tick_time = start_time;
    let mut sequence = 0u64;

    let mut last_primary: Option<VideoFrame> = None;
    let mut last_secondary: Option<VideoFrame> = None;

    while !should_stop.load(Ordering::SeqCst) {
        // One config snapshot per tick; a concurrent settings update can
        // never tear a shape/size/corner combination mid-draw.
        let snapshot = *config.read();

        match drain_latest(&primary_rx) {
            Ok(Some(frame)) => last_primary = Some(frame),
            Ok(None) => {} // Not ready this tick; reuse the last frame.
            Err(_) => {
                info!("Primary source ended, render loop exiting");
                source_ended.store(true, Ordering::SeqCst);
                break;
            }
        }

        if let Some(ref rx) = secondary_rx {
            match drain_latest(rx) {
                Ok(Some(frame)) => last_secondary = Some(frame),
                Ok(None) => {}
                // A dead camera only freezes the overlay.
                Err(_) => {}
            }
        }

        if let Some(ref primary) = last_primary {
            surface.draw_frame_fill(primary);

            if snapshot.overlay_enabled {
                if let (Some(secondary), Some(rect)) = (
                    last_secondary.as_ref(),
                    snapshot.overlay_rect(surface.width(), surface.height()),
                ) {
                    surface.draw_overlay(secondary, &rect, &snapshot);
                }
            }

            let frame = surface.snapshot(FrameTimestamp::now(start_time), sequence);
            *last_composited.write() = Some(frame.clone());

            match sender.try_send(frame) {
                Ok(()) => {}
                // Consumer is behind; skip this frame.
                Err(crossbeam_channel::TrySendError::Full(_)) => {}
                Err(crossbeam_channel::TrySendError::Disconnected(_)) => break,
            }
            sequence += 1;
        }

        next_tick_time += tick_interval;
        let now = Instant::now();
        if next_tick_time > now {
            thread::sleep(next_tick_time - now);
        }
    }

    debug!(frames = sequence, "Render loop thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipstage_capture::{FrameSource, TestPatternSource};

    #[test]
    fn composites_primary_frames() {
        let mut primary = TestPatternSource::new(64, 48, 60);
        let primary_rx = primary.start().unwrap();

        let config = Arc::new(RwLock::new(CompositorConfig::default()));
        let mut render = RenderLoop::new(
            SurfaceSpec {
                width: 64,
                height: 48,
                fps: 60,
            },
            config,
        );

        let out = render.start(primary_rx, None).unwrap();
        let frame = out.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!((frame.width, frame.height), (64, 48));
        assert!(frame.is_valid());
        assert!(render.snapshot().is_some());

        render.stop();
        primary.stop().unwrap();
    }

    #[test]
    fn overlay_is_composited_when_enabled() {
        let mut primary = TestPatternSource::new(200, 200, 60);
        let mut secondary = TestPatternSource::new(32, 32, 60);
        let primary_rx = primary.start().unwrap();
        let secondary_rx = secondary.start().unwrap();

        let config = Arc::new(RwLock::new(CompositorConfig {
            overlay_enabled: true,
            ..Default::default()
        }));
        let mut render = RenderLoop::new(
            SurfaceSpec {
                width: 200,
                height: 200,
                fps: 60,
            },
            config,
        );

        let out = render.start(primary_rx, Some(secondary_rx)).unwrap();
        // Let a few ticks pass so the secondary is picked up.
        let mut frame = None;
        for _ in 0..10 {
            frame = out.recv_timeout(Duration::from_secs(1)).ok();
        }
        assert!(frame.is_some());

        render.stop();
        primary.stop().unwrap();
        secondary.stop().unwrap();
    }

    #[test]
    fn stop_cancels_pending_reschedule() {
        let mut primary = TestPatternSource::new(32, 32, 60);
        let primary_rx = primary.start().unwrap();

        let config = Arc::new(RwLock::new(CompositorConfig::default()));
        let mut render = RenderLoop::new(
            SurfaceSpec {
                width: 32,
                height: 32,
                fps: 60,
            },
            config,
        );
        let out = render.start(primary_rx, None).unwrap();
        let _ = out.recv_timeout(Duration::from_secs(1));

        render.stop();

        // Worker is gone: the channel drains and disconnects.
        while out.try_recv().is_ok() {}
        assert!(out.try_recv().is_err());

        primary.stop().unwrap();
    }

    #[test]
    fn primary_disconnect_marks_source_ended() {
        let mut primary = TestPatternSource::with_frame_limit(32, 32, 240, 2);
        let primary_rx = primary.start().unwrap();

        let config = Arc::new(RwLock::new(CompositorConfig::default()));
        let mut render = RenderLoop::new(
            SurfaceSpec {
                width: 32,
                height: 32,
                fps: 240,
            },
            config,
        );
        let out = render.start(primary_rx, None).unwrap();

        // Drain until the loop notices the hangup.
        let deadline = Instant::now() + Duration::from_secs(2);
        while !render.source_ended() && Instant::now() < deadline {
            let _ = out.recv_timeout(Duration::from_millis(20));
        }
        assert!(render.source_ended());

        render.stop();
        primary.stop().unwrap();
    }
}
