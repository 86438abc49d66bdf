//! Media encoding and container handling.
//!
//! Codec selection is a pure ranked-preference query: hardware-accelerated
//! combinations come first in the list, and a built-in raw-video/PCM AVI
//! writer is the guaranteed fallback, so negotiation always succeeds. The
//! encoder trait models a recorder that can suspend data production
//! (pause/resume) and finalizes into a single container payload.

mod avi;
mod bmp;
mod demux;
mod error;

pub use avi::AviEncoder;
pub use bmp::{decode_bmp, encode_bmp};
pub use demux::AviReader;
pub use error::CodecError;

use bytes::Bytes;
use tracing::{debug, info};

use clipstage_audio::AudioChunk;
use clipstage_capture::VideoFrame;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// A container/codec combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecSpec {
    pub container: &'static str,
    pub video: &'static str,
    pub audio: &'static str,
}

impl CodecSpec {
    /// MIME-style label for diagnostics and resolution metadata.
    pub fn label(&self) -> String {
        format!(
            "{};codecs={},{}",
            match self.container {
                "avi" => "video/x-msvideo",
                "mp4" => "video/mp4",
                "webm" => "video/webm",
                other => other,
            },
            self.video,
            self.audio
        )
    }
}

/// The generic default every build supports.
pub const FALLBACK_CODEC: CodecSpec = CodecSpec {
    container: "avi",
    video: "rawvideo",
    audio: "pcm_s16le",
};

/// Ordered codec preference list, best first.
pub fn preferred_codecs() -> Vec<CodecSpec> {
    vec![
        CodecSpec {
            container: "mp4",
            video: "h264",
            audio: "aac",
        },
        CodecSpec {
            container: "webm",
            video: "vp9",
            audio: "opus",
        },
        FALLBACK_CODEC,
    ]
}

/// Probe whether a combination has an encoder in this build.
pub fn is_supported(spec: &CodecSpec) -> bool {
    *spec == FALLBACK_CODEC
}

/// Pick the first supported combination, falling back to the generic
/// default. Pure; independent of device availability.
pub fn negotiate() -> CodecSpec {
    let chosen = preferred_codecs()
        .into_iter()
        .find(is_supported)
        .unwrap_or(FALLBACK_CODEC);
    debug!(codec = %chosen.label(), "Negotiated codec");
    chosen
}

/// Encoder configuration.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Frame width in pixels.
    pub width: u32,

    /// Frame height in pixels.
    pub height: u32,

    /// Frames per second.
    pub fps: u32,

    /// Audio sample rate in Hz.
    pub sample_rate: u32,

    /// Audio channel count.
    pub channels: u16,

    /// Target video bitrate in kbps. Advisory for the raw writer; used for
    /// size estimation.
    pub bitrate_kbps: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 30,
            sample_rate: clipstage_audio::SAMPLE_RATE,
            channels: clipstage_audio::CHANNELS,
            bitrate_kbps: 6000,
        }
    }
}

/// Trait for audio+video recorders producing a single container payload.
pub trait MediaEncoder: Send {
    /// Mux one video frame.
    fn push_video(&mut self, frame: &VideoFrame) -> CodecResult<()>;

    /// Mux one audio chunk.
    fn push_audio(&mut self, chunk: &AudioChunk) -> CodecResult<()>;

    /// Suspend data production without finalizing. Pushes while paused are
    /// discarded.
    fn pause(&mut self);

    /// Resume data production.
    fn resume(&mut self);

    /// Finalize and return the complete container payload.
    fn finish(self: Box<Self>) -> CodecResult<Bytes>;

    /// Encoder name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Create an encoder for a negotiated codec combination.
pub fn create_encoder(spec: &CodecSpec, config: EncoderConfig) -> CodecResult<Box<dyn MediaEncoder>> {
    if *spec == FALLBACK_CODEC {
        info!(codec = %spec.label(), "Using built-in AVI encoder");
        return Ok(Box::new(AviEncoder::new(config)?));
    }
    Err(CodecError::Unsupported(spec.label()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negotiation_falls_back_to_builtin() {
        let spec = negotiate();
        assert_eq!(spec, FALLBACK_CODEC);
        assert!(is_supported(&spec));
    }

    #[test]
    fn preference_list_is_ordered_and_ends_with_fallback() {
        let list = preferred_codecs();
        assert!(list.len() >= 2);
        assert_eq!(*list.last().unwrap(), FALLBACK_CODEC);
        // The preferred entries are hardware codecs this build lacks.
        assert!(!is_supported(&list[0]));
    }

    #[test]
    fn create_encoder_rejects_unsupported() {
        let spec = preferred_codecs()[0];
        assert!(matches!(
            create_encoder(&spec, EncoderConfig::default()),
            Err(CodecError::Unsupported(_))
        ));
    }

    #[test]
    fn label_is_mime_like() {
        assert_eq!(
            FALLBACK_CODEC.label(),
            "video/x-msvideo;codecs=rawvideo,pcm_s16le"
        );
    }
}
