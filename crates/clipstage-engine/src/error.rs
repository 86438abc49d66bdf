//! Error types for the engine.

use thiserror::Error;

use clipstage_audio::AudioError;
use clipstage_capture::CaptureError;
use clipstage_codec::CodecError;
use clipstage_compositor::CompositorError;
use clipstage_store::StoreError;

/// Errors that can occur while driving a recording session.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Required capture source failed.
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Audio pipeline failure.
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Compositor failure.
    #[error("Compositor error: {0}")]
    Compositor(#[from] CompositorError),

    /// Encoder failure.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Persistence failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
