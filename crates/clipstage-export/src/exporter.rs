//! Deterministic export loop.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use clipstage_audio::AudioChunk;
use clipstage_capture::FrameTimestamp;
use clipstage_codec::{create_encoder, decode_bmp, negotiate, EncoderConfig};
use clipstage_compositor::Surface;
use clipstage_ipc::QualityPreset;
use clipstage_store::{AssetStore, Recording};

use crate::asset::{LoadedAsset, PlayerGuard, PlayerState, METADATA_DEADLINE};
use crate::filters::VisualFilterState;
use crate::overlay::ExportOverlay;
use crate::trim::TrimWindow;
use crate::{ExportError, ExportResult};

/// Rough output size prediction in bytes, documented as an estimate only.
/// Assumes the target video bitrate plus a 128 kbps audio track.
pub fn estimate_size_bytes(video_kbps: u32, trim_secs: f64, speed: f64) -> u64 {
    if !trim_secs.is_finite() || !speed.is_finite() || trim_secs <= 0.0 || speed <= 0.0 {
        return 0;
    }
    ((video_kbps as f64 + 128.0) * 1000.0 * (trim_secs / speed) / 8.0) as u64
}

/// Everything the export loop needs besides the source asset.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Window over the source timeline.
    pub trim: TrimWindow,

    /// Playback speed factor; 2.0 halves the output duration.
    pub speed: f64,

    /// Output frame rate.
    pub fps: u32,

    /// Resolution preset; `None` keeps the source dimensions.
    pub preset: Option<QualityPreset>,

    /// Per-frame visual adjustments.
    pub filters: VisualFilterState,

    /// Overlays burned in during export.
    pub overlays: Vec<ExportOverlay>,

    /// Target video bitrate in kbps.
    pub video_bitrate_kbps: u32,
}

impl ExportSettings {
    /// Defaults: full clip, normal speed, source fps and resolution.
    pub fn for_asset(asset: &LoadedAsset) -> Self {
        Self {
            trim: TrimWindow::new(asset.duration_secs()),
            speed: 1.0,
            fps: asset.fps().max(1),
            preset: None,
            filters: VisualFilterState::default(),
            overlays: Vec::new(),
            video_bitrate_kbps: 6000,
        }
    }
}

/// Monotone, clamped progress reporting.
struct Progress<F: FnMut(f64)> {
    last: f64,
    sink: F,
}

impl<F: FnMut(f64)> Progress<F> {
    fn new(sink: F) -> Self {
        Self { last: 0.0, sink }
    }

    fn report(&mut self, percent: f64) {
        let percent = percent.clamp(0.0, 100.0).max(self.last);
        self.last = percent;
        (self.sink)(percent);
    }
}

/// Re-encodes stored recordings into new ones.
pub struct Exporter {
    store: Arc<dyn AssetStore>,
    player: Arc<Mutex<PlayerState>>,
}

impl Exporter {
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self {
            store,
            player: Arc::new(Mutex::new(PlayerState::default())),
        }
    }

    /// Preview player state shared with the UI.
    pub fn player(&self) -> Arc<Mutex<PlayerState>> {
        Arc::clone(&self.player)
    }

    /// Export `recording` through `settings` and persist the result.
    ///
    /// `progress` receives percentages in `[0, 100]`, monotonically
    /// non-decreasing, ending at 100 on success.
    #[instrument(name = "export", skip_all, fields(id = %recording.id))]
    pub fn export(
        &self,
        recording: &Recording,
        settings: &ExportSettings,
        progress: impl FnMut(f64),
    ) -> ExportResult<Recording> {
        if !settings.speed.is_finite() || settings.speed <= 0.0 {
            return Err(ExportError::InvalidInterval(format!(
                "speed {} is not a finite positive number",
                settings.speed
            )));
        }
        if !settings.trim.is_valid() {
            return Err(ExportError::InvalidInterval(format!(
                "trim [{}, {}] over a {}s clip",
                settings.trim.start_secs(),
                settings.trim.end_secs(),
                settings.trim.duration_secs()
            )));
        }
        let fps = settings.fps.max(1);

        let asset = LoadedAsset::load(recording, METADATA_DEADLINE)?;
        let _guard = PlayerGuard::engage(Arc::clone(&self.player), settings.speed);

        // Annotations deferred on the recording are baked in alongside the
        // caller's overlays, visible from the moment they were placed until
        // the end of the clip. The exported entity carries none.
        let mut overlays = settings.overlays.clone();
        for annotation in &recording.annotations {
            match decode_bmp(&annotation.raster) {
                Ok(raster) => overlays.push(ExportOverlay::new(
                    raster,
                    annotation.x,
                    annotation.y,
                    annotation.time_secs,
                    asset.duration_secs(),
                )),
                Err(e) => {
                    warn!(id = %annotation.id, "Skipping undecodable annotation: {e}");
                }
            }
        }

        let (width, height) = target_dimensions(asset.width(), asset.height(), settings.preset);
        let sample_rate = if asset.sample_rate() > 0 {
            asset.sample_rate()
        } else {
            clipstage_audio::SAMPLE_RATE
        };
        let channels = asset.channels().max(1);

        let spec = negotiate();
        let mut encoder = create_encoder(
            &spec,
            EncoderConfig {
                width,
                height,
                fps,
                sample_rate,
                channels,
                bitrate_kbps: settings.video_bitrate_kbps,
            },
        )?;
        let mut surface = Surface::new(width, height)?;
        let mut progress = Progress::new(progress);

        let out_duration = settings.trim.len_secs() / settings.speed;
        let frame_total = ((out_duration * fps as f64).ceil() as u64).max(1);
        debug!(
            frames = frame_total,
            width, height, fps, "Export loop starting"
        );

        // Video: step output frames, advancing source time by speed / fps.
        for i in 0..frame_total {
            let source_t = settings.trim.start_secs() + i as f64 * settings.speed / fps as f64;

            if let Some(frame) = asset.frame_at(source_t) {
                surface.draw_frame_fill(&frame);
                settings.filters.apply(surface.data_mut(), width, height);
                for overlay in &overlays {
                    if overlay.active_at(source_t) {
                        overlay.draw(surface.data_mut(), width, height);
                    }
                }

                let timestamp = FrameTimestamp {
                    capture_time: std::time::Instant::now(),
                    pts_100ns: i * 10_000_000 / fps as u64,
                };
                encoder.push_video(&surface.snapshot(timestamp, i))?;
            }

            progress.report((i + 1) as f64 * 100.0 / frame_total as f64);
        }

        // Audio: slice the trim window, re-time by the speed factor, push
        // in 10ms chunks.
        let source_audio =
            asset.audio_slice(settings.trim.start_secs(), settings.trim.end_secs());
        if !source_audio.is_empty() {
            let resampled = resample_linear(source_audio, channels as usize, settings.speed);
            let chunk_len = (sample_rate as usize / 100) * channels as usize;
            for (seq, chunk) in resampled.chunks(chunk_len.max(1)).enumerate() {
                let pts_100ns = seq as u64 * 100_000;
                encoder.push_audio(&AudioChunk::from_samples(chunk, pts_100ns, seq as u64))?;
            }
        }

        let payload = encoder.finish()?;

        let exported = Recording::new(payload, out_duration, format!("{width}x{height}"))?;
        self.store.save_recording(&exported)?;
        progress.report(100.0);
        info!(
            id = %exported.id,
            duration_secs = exported.duration_secs,
            bytes = exported.byte_size,
            "Export persisted"
        );
        Ok(exported)
    }
}

/// Fit the source into the preset box preserving aspect ratio, rounded down
/// to even dimensions. `None` keeps the source size.
fn target_dimensions(src_w: u32, src_h: u32, preset: Option<QualityPreset>) -> (u32, u32) {
    let Some(preset) = preset else {
        return (src_w, src_h);
    };
    let (box_w, box_h) = preset.dimensions();
    let scale = f64::min(box_w as f64 / src_w as f64, box_h as f64 / src_h as f64);
    let width = (((src_w as f64 * scale) as u32) & !1).max(2);
    let height = (((src_h as f64 * scale) as u32) & !1).max(2);
    (width, height)
}

/// Linear-interpolation resampler; `speed` > 1 shortens the output.
fn resample_linear(input: &[f32], channels: usize, speed: f64) -> Vec<f32> {
    let in_frames = input.len() / channels;
    if in_frames == 0 {
        return Vec::new();
    }
    let out_frames = ((in_frames as f64 / speed) as usize).max(1);
    let mut out = Vec::with_capacity(out_frames * channels);

    for j in 0..out_frames {
        let pos = j as f64 * speed;
        let i0 = (pos as usize).min(in_frames - 1);
        let i1 = (i0 + 1).min(in_frames - 1);
        let frac = (pos - i0 as f64) as f32;
        for c in 0..channels {
            let a = input[i0 * channels + c];
            let b = input[i1 * channels + c];
            out.push(a + (b - a) * frac);
        }
    }
    out
}
