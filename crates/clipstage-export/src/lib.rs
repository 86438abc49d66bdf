//! Editing and export.
//!
//! A stored recording is re-encoded deterministically: the exporter steps
//! through output frame indices, maps each to a source time through the trim
//! window and speed factor, and draws through the filter chain onto its own
//! surface. No realtime playback is involved, so export speed is bounded by
//! CPU, not by the clip's duration.

mod asset;
mod error;
mod exporter;
mod filters;
mod overlay;
mod trim;

pub use asset::{LoadedAsset, PlayerGuard, PlayerState, METADATA_DEADLINE};
pub use error::ExportError;
pub use exporter::{estimate_size_bytes, ExportSettings, Exporter};
pub use filters::VisualFilterState;
pub use overlay::ExportOverlay;
pub use trim::{TrimWindow, MIN_TRIM_GAP_SECS};

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
