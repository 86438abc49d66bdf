//! Error types for asset persistence.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while saving or loading assets.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No entity with the requested id exists.
    #[error("Asset not found: {0}")]
    NotFound(Uuid),

    /// Filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata sidecar could not be read or written.
    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    /// The entity fails its own invariants.
    #[error("Invalid entity: {0}")]
    InvalidEntity(String),
}
