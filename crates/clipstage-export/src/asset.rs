//! Loading a stored recording for editing.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, instrument};

use clipstage_capture::VideoFrame;
use clipstage_codec::AviReader;
use clipstage_store::Recording;

use crate::{ExportError, ExportResult};

/// How long metadata parsing may take before the load fails.
pub const METADATA_DEADLINE: Duration = Duration::from_secs(5);

/// Preview player state the exporter temporarily overrides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub muted: bool,
    pub rate: f64,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            muted: false,
            rate: 1.0,
        }
    }
}

/// Mutes and re-rates the preview player for the duration of an export and
/// restores the previous state on drop, so every exit path (success, error,
/// panic unwind) puts the player back.
pub struct PlayerGuard {
    player: Arc<Mutex<PlayerState>>,
    saved: PlayerState,
}

impl PlayerGuard {
    pub fn engage(player: Arc<Mutex<PlayerState>>, rate: f64) -> Self {
        let saved = {
            let mut state = player.lock();
            let saved = *state;
            state.muted = true;
            state.rate = rate;
            saved
        };
        Self { player, saved }
    }
}

impl Drop for PlayerGuard {
    fn drop(&mut self) {
        *self.player.lock() = self.saved;
    }
}

/// A parsed recording ready for frame-accurate access.
pub struct LoadedAsset {
    reader: AviReader,
}

impl LoadedAsset {
    /// Parse the recording's payload, bounded by `deadline`.
    ///
    /// Parsing runs on its own thread; if the deadline passes the load
    /// fails and the worker finishes into the void.
    #[instrument(name = "asset_load", skip_all, fields(id = %recording.id, bytes = recording.payload.len()))]
    pub fn load(recording: &Recording, deadline: Duration) -> ExportResult<Self> {
        let payload = recording.payload.clone();
        let (tx, rx) = crossbeam_channel::bounded(1);
        thread::spawn(move || {
            let _ = tx.send(AviReader::parse(&payload));
        });

        match rx.recv_timeout(deadline) {
            Ok(Ok(reader)) => {
                debug!(
                    frames = reader.frame_count(),
                    duration_secs = reader.duration_secs(),
                    "Asset loaded"
                );
                Ok(Self { reader })
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(ExportError::MetadataTimeout(deadline)),
        }
    }

    pub fn width(&self) -> u32 {
        self.reader.width
    }

    pub fn height(&self) -> u32 {
        self.reader.height
    }

    pub fn fps(&self) -> u32 {
        self.reader.fps
    }

    pub fn sample_rate(&self) -> u32 {
        self.reader.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.reader.channels
    }

    pub fn frame_count(&self) -> usize {
        self.reader.frame_count()
    }

    pub fn duration_secs(&self) -> f64 {
        self.reader.duration_secs()
    }

    /// The frame covering time `t`, clamped to the clip bounds.
    pub fn frame_at(&self, t: f64) -> Option<VideoFrame> {
        let count = self.reader.frame_count();
        if count == 0 {
            return None;
        }
        let index = ((t.max(0.0) * self.reader.fps as f64) as usize).min(count - 1);
        self.reader.frame(index)
    }

    /// Interleaved samples covering `[start, end)` seconds, clamped.
    pub fn audio_slice(&self, start_secs: f64, end_secs: f64) -> &[f32] {
        let audio = self.reader.audio();
        if audio.is_empty() || self.reader.sample_rate == 0 {
            return &[];
        }
        let channels = self.reader.channels.max(1) as usize;
        let per_sec = self.reader.sample_rate as f64;
        let total_frames = audio.len() / channels;

        let start = ((start_secs.max(0.0) * per_sec) as usize).min(total_frames);
        let end = ((end_secs.max(0.0) * per_sec) as usize).clamp(start, total_frames);
        &audio[start * channels..end * channels]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use clipstage_audio::AudioChunk;
    use clipstage_capture::FrameTimestamp;
    use clipstage_codec::{AviEncoder, EncoderConfig, MediaEncoder};
    use std::time::Instant;

    fn sample_recording(frames: usize, fps: u32) -> Recording {
        let mut enc = AviEncoder::new(EncoderConfig {
            width: 8,
            height: 6,
            fps,
            ..Default::default()
        })
        .unwrap();
        for i in 0..frames {
            let data = vec![i as u8; 8 * 6 * 4];
            enc.push_video(&VideoFrame::new(
                Bytes::from(data),
                8,
                6,
                FrameTimestamp::now(Instant::now()),
                i as u64,
            ))
            .unwrap();
        }
        enc.push_audio(&AudioChunk::from_samples(&vec![0.1f32; 960], 0, 0))
            .unwrap();
        let payload = Box::new(enc).finish().unwrap();
        Recording::new(payload, frames as f64 / fps as f64, "8x6".into()).unwrap()
    }

    #[test]
    fn load_exposes_stream_metadata() {
        let asset = LoadedAsset::load(&sample_recording(10, 10), METADATA_DEADLINE).unwrap();
        assert_eq!((asset.width(), asset.height()), (8, 6));
        assert_eq!(asset.fps(), 10);
        assert_eq!(asset.frame_count(), 10);
        assert!((asset.duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn frame_at_clamps_to_clip() {
        let asset = LoadedAsset::load(&sample_recording(5, 10), METADATA_DEADLINE).unwrap();
        // Frame 3 covers [0.3, 0.4).
        assert_eq!(asset.frame_at(0.35).unwrap().pixel(0, 0)[0], 3);
        // Past the end pins to the last frame.
        assert_eq!(asset.frame_at(99.0).unwrap().pixel(0, 0)[0], 4);
        assert_eq!(asset.frame_at(-1.0).unwrap().pixel(0, 0)[0], 0);
    }

    #[test]
    fn audio_slice_is_clamped() {
        let asset = LoadedAsset::load(&sample_recording(5, 10), METADATA_DEADLINE).unwrap();
        // 960 samples = 480 stereo frames = 10ms at 48kHz.
        assert_eq!(asset.audio_slice(0.0, 0.01).len(), 960);
        assert_eq!(asset.audio_slice(0.0, 99.0).len(), 960);
        assert!(asset.audio_slice(5.0, 6.0).is_empty());
    }

    #[test]
    fn malformed_payload_fails_to_load() {
        let rec = Recording::new(Bytes::from_static(b"junk"), 1.0, "8x6".into()).unwrap();
        assert!(matches!(
            LoadedAsset::load(&rec, METADATA_DEADLINE),
            Err(ExportError::Codec(_))
        ));
    }

    #[test]
    fn guard_restores_player_state_on_drop() {
        let player = Arc::new(Mutex::new(PlayerState {
            muted: false,
            rate: 1.0,
        }));
        {
            let _guard = PlayerGuard::engage(Arc::clone(&player), 4.0);
            assert!(player.lock().muted);
            assert_eq!(player.lock().rate, 4.0);
        }
        assert_eq!(*player.lock(), PlayerState::default());
    }
}
