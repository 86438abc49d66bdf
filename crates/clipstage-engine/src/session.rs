//! Recording session manager.
//!
//! Drives the state machine `Idle → Recording → {Paused ⇄ Recording} →
//! Idle`. Startup is phased: screen share, camera, compositor, audio graph,
//! encoder, feeder thread. Optional sources that fail produce warnings and
//! a degraded session; a required-source failure rolls back everything
//! acquired so far.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use clipstage_audio::{AudioGraph, AudioSource, MixedChunk, MIC_DUCK_GAIN};
use clipstage_capture::{FrameSource, VideoFrame};
use clipstage_codec::{create_encoder, encode_bmp, negotiate, EncoderConfig, MediaEncoder};
use clipstage_compositor::{
    CompositorConfig, OverlayCorner, OverlayShape, OverlaySize, RenderLoop, SurfaceSpec,
};
use clipstage_ipc::{
    OverlayCornerSetting, OverlaySettings, OverlayShapeSetting, OverlaySizeSetting,
    RecordingSettings, SessionState, SessionWarning,
};
use clipstage_store::{AssetStore, Recording, Screenshot};

use crate::devices::{MediaDevices, MicConstraints};
use crate::EngineResult;

/// Feeder poll interval while the frame channel is quiet.
const FEEDER_POLL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy)]
enum Phase {
    Idle,
    Recording {
        started_at: Instant,
        paused_total: Duration,
    },
    Paused {
        started_at: Instant,
        paused_total: Duration,
        paused_at: Instant,
    },
}

/// Sources and loops acquired during startup, released in reverse order.
#[derive(Default)]
struct Resources {
    screen_video: Option<Box<dyn FrameSource>>,
    system_audio: Option<Box<dyn AudioSource>>,
    camera: Option<Box<dyn FrameSource>>,
    microphone: Option<Box<dyn AudioSource>>,
    graph: Option<AudioGraph>,
    render: Option<RenderLoop>,
}

/// One recording from start to persisted entity.
pub struct RecordingSession {
    devices: Arc<dyn MediaDevices>,
    store: Arc<dyn AssetStore>,
    overlay_config: Arc<RwLock<CompositorConfig>>,
    phase: Phase,
    resources: Resources,
    encoder: Arc<Mutex<Option<Box<dyn MediaEncoder>>>>,
    paused: Arc<AtomicBool>,
    feeder_stop: Arc<AtomicBool>,
    feeder_ended: Arc<AtomicBool>,
    feeder: Option<JoinHandle<()>>,
    resolution: String,
}

impl RecordingSession {
    pub fn new(devices: Arc<dyn MediaDevices>, store: Arc<dyn AssetStore>) -> Self {
        Self {
            devices,
            store,
            overlay_config: Arc::new(RwLock::new(CompositorConfig::default())),
            phase: Phase::Idle,
            resources: Resources::default(),
            encoder: Arc::new(Mutex::new(None)),
            paused: Arc::new(AtomicBool::new(false)),
            feeder_stop: Arc::new(AtomicBool::new(false)),
            feeder_ended: Arc::new(AtomicBool::new(false)),
            feeder: None,
            resolution: String::new(),
        }
    }

    /// UI-facing state summary.
    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::Recording { .. } => SessionState::Recording,
            Phase::Paused { .. } => SessionState::Paused,
        }
    }

    /// Shared compositor settings, updatable mid-recording.
    pub fn overlay_config(&self) -> Arc<RwLock<CompositorConfig>> {
        Arc::clone(&self.overlay_config)
    }

    /// True once the screen source ended on its own (share revoked).
    pub fn source_ended(&self) -> bool {
        self.feeder_ended.load(Ordering::SeqCst)
            || self
                .resources
                .render
                .as_ref()
                .is_some_and(|r| r.source_ended())
    }

    /// Start recording. Returns warnings for optional sources that failed.
    #[instrument(name = "session_start", skip_all)]
    pub fn start(&mut self, settings: &RecordingSettings) -> EngineResult<Vec<SessionWarning>> {
        if !matches!(self.phase, Phase::Idle) {
            debug!("Already recording, ignoring start");
            return Ok(Vec::new());
        }

        let (width, height) = settings.quality.dimensions();
        let fps = settings.frame_rate.value();
        let mut warnings = Vec::new();

        // Required: the screen share. Failure here aborts with nothing to
        // roll back.
        let mut screen = self.devices.open_screen(
            settings.screen_source,
            settings.audio_source.wants_system(),
        )?;
        let primary_rx = screen.video.start()?;
        self.resources.screen_video = Some(screen.video);

        // Optional: camera for the overlay bubble.
        let mut config = compositor_config(&settings.overlay);
        let secondary_rx = if settings.overlay.enabled {
            match self.devices.open_camera() {
                Ok(mut camera) => match camera.start() {
                    Ok(rx) => {
                        self.resources.camera = Some(camera);
                        Some(rx)
                    }
                    Err(e) => {
                        warn!("Camera start failed: {e}");
                        config.overlay_enabled = false;
                        warnings.push(SessionWarning::CameraUnavailable);
                        None
                    }
                },
                Err(e) => {
                    warn!("Camera unavailable: {e}");
                    config.overlay_enabled = false;
                    warnings.push(SessionWarning::CameraUnavailable);
                    None
                }
            }
        } else {
            None
        };
        *self.overlay_config.write() = config;

        // Compositor.
        let mut render = RenderLoop::new(
            SurfaceSpec { width, height, fps },
            Arc::clone(&self.overlay_config),
        );
        let composited_rx = match render.start(primary_rx, secondary_rx) {
            Ok(rx) => rx,
            Err(e) => {
                self.release_resources();
                return Err(e.into());
            }
        };
        self.resources.render = Some(render);

        // Audio graph per source kind. Optional failures degrade.
        let mixed_rx = match self.build_audio(&mut screen.system_audio, settings, &mut warnings) {
            Ok(rx) => {
                self.resources.system_audio = screen.system_audio.take();
                rx
            }
            Err(e) => {
                self.release_resources();
                return Err(e);
            }
        };

        // Encoder.
        let spec = negotiate();
        let encoder_config = EncoderConfig {
            width,
            height,
            fps,
            bitrate_kbps: settings.video_bitrate_kbps,
            ..Default::default()
        };
        let encoder = match create_encoder(&spec, encoder_config) {
            Ok(encoder) => encoder,
            Err(e) => {
                self.release_resources();
                return Err(e.into());
            }
        };
        *self.encoder.lock() = Some(encoder);

        // Feeder thread.
        self.paused.store(false, Ordering::SeqCst);
        self.feeder_stop.store(false, Ordering::SeqCst);
        self.feeder_ended.store(false, Ordering::SeqCst);
        let encoder = Arc::clone(&self.encoder);
        let paused = Arc::clone(&self.paused);
        let feeder_stop = Arc::clone(&self.feeder_stop);
        let feeder_ended = Arc::clone(&self.feeder_ended);
        self.feeder = Some(thread::spawn(move || {
            feeder_loop(
                composited_rx,
                mixed_rx,
                encoder,
                paused,
                feeder_stop,
                feeder_ended,
            );
        }));

        self.resolution = format!("{width}x{height}");
        self.phase = Phase::Recording {
            started_at: Instant::now(),
            paused_total: Duration::ZERO,
        };
        info!(
            resolution = %self.resolution,
            fps,
            codec = %spec.label(),
            warnings = warnings.len(),
            "Recording started"
        );
        Ok(warnings)
    }

    fn build_audio(
        &mut self,
        system_audio: &mut Option<Box<dyn AudioSource>>,
        settings: &RecordingSettings,
        warnings: &mut Vec<SessionWarning>,
    ) -> EngineResult<Option<Receiver<MixedChunk>>> {
        let mut graph = AudioGraph::new();
        let mut has_system = false;

        if settings.audio_source.wants_system() {
            match system_audio.as_mut() {
                Some(source) => match source.start() {
                    Ok(rx) => {
                        graph.add_system_branch(rx);
                        has_system = true;
                    }
                    Err(e) => {
                        warn!("System audio start failed: {e}");
                        warnings.push(SessionWarning::SystemAudioUnavailable);
                    }
                },
                None => {
                    warn!("Shared surface has no audio track");
                    warnings.push(SessionWarning::SystemAudioUnavailable);
                }
            }
        }

        if settings.audio_source.wants_microphone() {
            match self.devices.open_microphone(&MicConstraints::default()) {
                Ok(mut mic) => match mic.start() {
                    Ok(rx) => {
                        let gain = if has_system { MIC_DUCK_GAIN } else { 1.0 };
                        graph.add_microphone_branch(rx, gain);
                        self.resources.microphone = Some(mic);
                    }
                    Err(e) => {
                        warn!("Microphone start failed: {e}");
                        warnings.push(SessionWarning::MicrophoneUnavailable);
                    }
                },
                Err(e) => {
                    warn!("Microphone unavailable: {e}");
                    warnings.push(SessionWarning::MicrophoneUnavailable);
                }
            }
        }

        if graph.branch_count() == 0 {
            return Ok(None);
        }
        let rx = graph.start()?;
        self.resources.graph = Some(graph);
        Ok(Some(rx))
    }

    /// Pause capture. A no-op unless currently recording.
    #[instrument(name = "session_pause", skip(self))]
    pub fn pause(&mut self) {
        if let Phase::Recording {
            started_at,
            paused_total,
        } = self.phase
        {
            self.paused.store(true, Ordering::SeqCst);
            if let Some(encoder) = self.encoder.lock().as_mut() {
                encoder.pause();
            }
            self.phase = Phase::Paused {
                started_at,
                paused_total,
                paused_at: Instant::now(),
            };
            info!("Recording paused");
        } else {
            debug!("Pause ignored in state {}", self.state().name());
        }
    }

    /// Resume capture. A no-op unless currently paused.
    #[instrument(name = "session_resume", skip(self))]
    pub fn resume(&mut self) {
        if let Phase::Paused {
            started_at,
            paused_total,
            paused_at,
        } = self.phase
        {
            if let Some(encoder) = self.encoder.lock().as_mut() {
                encoder.resume();
            }
            self.paused.store(false, Ordering::SeqCst);
            self.phase = Phase::Recording {
                started_at,
                paused_total: paused_total + paused_at.elapsed(),
            };
            info!("Recording resumed");
        } else {
            debug!("Resume ignored in state {}", self.state().name());
        }
    }

    /// Stop, finalize and persist. Idempotent: stopping while idle returns
    /// `Ok(None)`. Duration excludes paused intervals.
    #[instrument(name = "session_stop", skip(self))]
    pub fn stop(&mut self) -> EngineResult<Option<Recording>> {
        let duration = match self.phase {
            Phase::Idle => return Ok(None),
            Phase::Recording {
                started_at,
                paused_total,
            } => started_at.elapsed().saturating_sub(paused_total),
            Phase::Paused {
                started_at,
                paused_total,
                paused_at,
            } => started_at
                .elapsed()
                .saturating_sub(paused_total + paused_at.elapsed()),
        };

        // Release sources before finalizing so the devices are free even if
        // the encoder fails.
        self.release_resources();
        self.phase = Phase::Idle;

        let Some(encoder) = self.encoder.lock().take() else {
            return Ok(None);
        };
        let payload = encoder.finish()?;

        let recording = Recording::new(payload, duration.as_secs_f64(), self.resolution.clone())?;
        self.store.save_recording(&recording)?;
        info!(
            id = %recording.id,
            duration_secs = recording.duration_secs,
            bytes = recording.byte_size,
            "Recording persisted"
        );
        Ok(Some(recording))
    }

    /// Persist the current composited frame as a still image.
    ///
    /// Returns `Ok(None)` while idle or before the first frame is drawn.
    #[instrument(name = "session_screenshot", skip(self))]
    pub fn screenshot(&mut self) -> EngineResult<Option<Screenshot>> {
        if matches!(self.phase, Phase::Idle) {
            return Ok(None);
        }
        let Some(frame) = self.resources.render.as_ref().and_then(|r| r.snapshot()) else {
            return Ok(None);
        };
        let payload = encode_bmp(&frame)?;
        let screenshot = Screenshot::new(payload);
        self.store.save_screenshot(&screenshot)?;
        info!(id = %screenshot.id, "Screenshot persisted");
        Ok(Some(screenshot))
    }

    /// Stop the feeder and every source, newest acquisition first.
    fn release_resources(&mut self) {
        self.feeder_stop.store(true, Ordering::SeqCst);
        if let Some(render) = self.resources.render.as_mut() {
            render.stop();
        }
        if let Some(handle) = self.feeder.take() {
            let _ = handle.join();
        }
        self.resources.render = None;

        if let Some(mut graph) = self.resources.graph.take() {
            graph.stop();
        }
        if let Some(mut mic) = self.resources.microphone.take() {
            let _ = mic.stop();
        }
        if let Some(mut system) = self.resources.system_audio.take() {
            let _ = system.stop();
        }
        if let Some(mut camera) = self.resources.camera.take() {
            let _ = camera.stop();
        }
        if let Some(mut screen) = self.resources.screen_video.take() {
            let _ = screen.stop();
        }
        debug!("Session resources released");
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.release_resources();
    }
}

/// Map UI overlay settings onto the compositor's config.
fn compositor_config(settings: &OverlaySettings) -> CompositorConfig {
    CompositorConfig {
        overlay_enabled: settings.enabled,
        shape: match settings.shape {
            OverlayShapeSetting::Circle => OverlayShape::Circle,
            OverlayShapeSetting::RoundedRect => OverlayShape::RoundedRect,
            OverlayShapeSetting::Square => OverlayShape::Square,
        },
        size: match settings.size {
            OverlaySizeSetting::Small => OverlaySize::Small,
            OverlaySizeSetting::Medium => OverlaySize::Medium,
            OverlaySizeSetting::Large => OverlaySize::Large,
        },
        corner: match settings.corner {
            OverlayCornerSetting::TopLeft => OverlayCorner::TopLeft,
            OverlayCornerSetting::TopRight => OverlayCorner::TopRight,
            OverlayCornerSetting::BottomLeft => OverlayCorner::BottomLeft,
            OverlayCornerSetting::BottomRight => OverlayCorner::BottomRight,
        },
        mirror: settings.mirror,
        border: settings.border,
        shadow: settings.shadow,
    }
}

/// Pump composited frames and mixed audio into the encoder.
fn feeder_loop(
    composited_rx: Receiver<VideoFrame>,
    mixed_rx: Option<Receiver<MixedChunk>>,
    encoder: Arc<Mutex<Option<Box<dyn MediaEncoder>>>>,
    paused: Arc<AtomicBool>,
    should_stop: Arc<AtomicBool>,
    ended: Arc<AtomicBool>,
) {
    debug!("Feeder thread started");
    let mut frames = 0u64;

    while !should_stop.load(Ordering::SeqCst) {
        match composited_rx.recv_timeout(FEEDER_POLL) {
            Ok(frame) => {
                if !paused.load(Ordering::SeqCst) {
                    if let Some(enc) = encoder.lock().as_mut() {
                        if let Err(e) = enc.push_video(&frame) {
                            warn!("Video mux failed: {e}");
                        } else {
                            frames += 1;
                        }
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                info!("Composited stream ended");
                ended.store(true, Ordering::SeqCst);
                break;
            }
        }

        if let Some(ref rx) = mixed_rx {
            while let Ok(chunk) = rx.try_recv() {
                if !paused.load(Ordering::SeqCst) {
                    if let Some(enc) = encoder.lock().as_mut() {
                        if let Err(e) = enc.push_audio(&chunk) {
                            warn!("Audio mux failed: {e}");
                        }
                    }
                }
            }
        }
    }

    debug!(frames, "Feeder thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipstage_audio::{AudioChunk, AudioError, AudioResult};
    use clipstage_capture::CaptureResult;
    use clipstage_ipc::{AudioSourceKind, ScreenSourceKind};
    use clipstage_store::MemoryStore;

    use crate::devices::{ScreenCapture, SyntheticDevices};

    fn session(devices: SyntheticDevices) -> (RecordingSession, Arc<MemoryStore>) {
        session_with(Arc::new(devices))
    }

    fn session_with(devices: Arc<dyn MediaDevices>) -> (RecordingSession, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let session =
            RecordingSession::new(devices, Arc::clone(&store) as Arc<dyn AssetStore>);
        (session, store)
    }

    /// An audio source whose backend refuses to start after the device
    /// grant succeeded.
    struct RefusingAudioSource;

    impl AudioSource for RefusingAudioSource {
        fn start(&mut self) -> AudioResult<Receiver<AudioChunk>> {
            Err(AudioError::DeviceNotFound("backend refused to start".into()))
        }

        fn stop(&mut self) -> AudioResult<()> {
            Ok(())
        }

        fn is_active(&self) -> bool {
            false
        }
    }

    /// Grants everything but swaps in refusing audio backends.
    struct RefusedAudioDevices {
        inner: SyntheticDevices,
        refuse_microphone: bool,
        refuse_system: bool,
    }

    impl MediaDevices for RefusedAudioDevices {
        fn open_screen(
            &self,
            kind: ScreenSourceKind,
            with_audio: bool,
        ) -> CaptureResult<ScreenCapture> {
            let mut capture = self.inner.open_screen(kind, with_audio)?;
            if self.refuse_system && capture.system_audio.is_some() {
                capture.system_audio = Some(Box::new(RefusingAudioSource));
            }
            Ok(capture)
        }

        fn open_camera(&self) -> CaptureResult<Box<dyn FrameSource>> {
            self.inner.open_camera()
        }

        fn open_microphone(
            &self,
            constraints: &MicConstraints,
        ) -> CaptureResult<Box<dyn AudioSource>> {
            if self.refuse_microphone {
                Ok(Box::new(RefusingAudioSource))
            } else {
                self.inner.open_microphone(constraints)
            }
        }
    }

    fn fast_settings() -> RecordingSettings {
        RecordingSettings {
            quality: clipstage_ipc::QualityPreset::Hd720,
            ..Default::default()
        }
    }

    #[test]
    fn full_run_persists_a_recording() {
        let (mut session, store) = session(SyntheticDevices::all_granted());

        let warnings = session.start(&fast_settings()).unwrap();
        assert!(warnings.is_empty());
        assert!(session.state().is_recording());

        thread::sleep(Duration::from_millis(300));
        let recording = session.stop().unwrap().expect("recording persisted");
        assert!(session.state().is_idle());
        assert!(recording.duration_secs > 0.0);
        assert!(recording.byte_size > 0);
        assert_eq!(recording.resolution, "1280x720");
        assert_eq!(store.load_recordings().unwrap().len(), 1);
    }

    #[test]
    fn pause_excludes_time_from_duration() {
        let (mut session, _store) = session(SyntheticDevices::all_granted());
        session.start(&fast_settings()).unwrap();

        thread::sleep(Duration::from_millis(250));
        session.pause();
        assert!(session.state().is_paused());
        thread::sleep(Duration::from_millis(400));
        session.resume();
        assert!(session.state().is_recording());
        thread::sleep(Duration::from_millis(250));

        let wall = Duration::from_millis(900);
        let recording = session.stop().unwrap().unwrap();
        // Roughly 0.5s of active recording out of 0.9s wall time. Scheduler
        // jitter gets wide margins.
        assert!(recording.duration_secs >= 0.4);
        assert!(recording.duration_secs < wall.as_secs_f64() - 0.2);
    }

    #[test]
    fn stop_is_idempotent() {
        let (mut session, _store) = session(SyntheticDevices::all_granted());
        session.start(&fast_settings()).unwrap();
        thread::sleep(Duration::from_millis(200));

        assert!(session.stop().unwrap().is_some());
        assert!(session.stop().unwrap().is_none());
        assert!(session.stop().unwrap().is_none());
    }

    #[test]
    fn denied_screen_fails_hard() {
        let (mut session, store) = session(SyntheticDevices {
            grant_screen: false,
            ..SyntheticDevices::all_granted()
        });
        assert!(session.start(&fast_settings()).is_err());
        assert!(session.state().is_idle());
        assert!(store.load_recordings().unwrap().is_empty());
    }

    #[test]
    fn denied_microphone_degrades_with_warning() {
        let (mut session, _store) = session(SyntheticDevices {
            grant_microphone: false,
            ..SyntheticDevices::all_granted()
        });
        let settings = RecordingSettings {
            audio_source: AudioSourceKind::Both,
            ..fast_settings()
        };

        let warnings = session.start(&settings).unwrap();
        assert_eq!(warnings, vec![SessionWarning::MicrophoneUnavailable]);
        assert!(session.state().is_recording());

        thread::sleep(Duration::from_millis(250));
        assert!(session.stop().unwrap().is_some());
    }

    #[test]
    fn missing_system_audio_degrades_with_warning() {
        let (mut session, _store) = session(SyntheticDevices {
            share_system_audio: false,
            ..SyntheticDevices::all_granted()
        });
        let settings = RecordingSettings {
            audio_source: AudioSourceKind::Both,
            ..fast_settings()
        };

        let warnings = session.start(&settings).unwrap();
        assert_eq!(warnings, vec![SessionWarning::SystemAudioUnavailable]);
        thread::sleep(Duration::from_millis(250));
        assert!(session.stop().unwrap().is_some());
    }

    #[test]
    fn microphone_start_failure_degrades_with_warning() {
        let (mut session, _store) = session_with(Arc::new(RefusedAudioDevices {
            inner: SyntheticDevices::all_granted(),
            refuse_microphone: true,
            refuse_system: false,
        }));
        let settings = RecordingSettings {
            audio_source: AudioSourceKind::Microphone,
            ..fast_settings()
        };

        let warnings = session.start(&settings).unwrap();
        assert_eq!(warnings, vec![SessionWarning::MicrophoneUnavailable]);
        assert!(session.state().is_recording());

        thread::sleep(Duration::from_millis(250));
        assert!(session.stop().unwrap().is_some());
    }

    #[test]
    fn system_audio_start_failure_degrades_with_warning() {
        let (mut session, _store) = session_with(Arc::new(RefusedAudioDevices {
            inner: SyntheticDevices::all_granted(),
            refuse_microphone: false,
            refuse_system: true,
        }));
        let settings = RecordingSettings {
            audio_source: AudioSourceKind::Both,
            ..fast_settings()
        };

        let warnings = session.start(&settings).unwrap();
        assert_eq!(warnings, vec![SessionWarning::SystemAudioUnavailable]);
        assert!(session.state().is_recording());

        thread::sleep(Duration::from_millis(250));
        assert!(session.stop().unwrap().is_some());
    }

    #[test]
    fn denied_camera_records_without_overlay() {
        let (mut session, _store) = session(SyntheticDevices {
            grant_camera: false,
            ..SyntheticDevices::all_granted()
        });
        let mut settings = fast_settings();
        settings.overlay.enabled = true;

        let warnings = session.start(&settings).unwrap();
        assert_eq!(warnings, vec![SessionWarning::CameraUnavailable]);
        assert!(!session.overlay_config().read().overlay_enabled);

        thread::sleep(Duration::from_millis(250));
        assert!(session.stop().unwrap().is_some());
    }

    #[test]
    fn revoked_share_reports_source_ended() {
        let (mut session, _store) = session(SyntheticDevices {
            screen_frame_limit: Some(3),
            fps: 60,
            ..SyntheticDevices::all_granted()
        });
        session.start(&fast_settings()).unwrap();

        let deadline = Instant::now() + Duration::from_secs(3);
        while !session.source_ended() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(20));
        }
        assert!(session.source_ended());

        // A graceful stop still yields whatever was captured.
        assert!(session.stop().unwrap().is_some());
    }

    #[test]
    fn screenshot_requires_active_session() {
        let (mut session, store) = session(SyntheticDevices::all_granted());
        assert!(session.screenshot().unwrap().is_none());

        session.start(&fast_settings()).unwrap();
        // Wait for the first composited frame.
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut shot = None;
        while shot.is_none() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(30));
            shot = session.screenshot().unwrap();
        }
        assert!(shot.is_some());
        assert_eq!(store.load_screenshots().unwrap().len(), 1);

        session.stop().unwrap();
    }
}
