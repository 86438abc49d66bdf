//! Error types for export operations.

use thiserror::Error;

use clipstage_codec::CodecError;
use clipstage_compositor::CompositorError;
use clipstage_store::StoreError;

/// Errors that can occur while loading or exporting an asset.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Trim interval or speed fails validation.
    #[error("Invalid export interval: {0}")]
    InvalidInterval(String),

    /// Asset metadata did not parse within the deadline.
    #[error("Asset metadata not ready within {0:?}")]
    MetadataTimeout(std::time::Duration),

    /// Encode or decode failure, including an empty finalized output.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Output surface could not be created.
    #[error("Compositor error: {0}")]
    Compositor(#[from] CompositorError),

    /// Persistence failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
