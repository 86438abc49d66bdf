//! Asset persistence for recordings and screenshots.
//!
//! Entities carry their binary payload plus metadata; the filesystem store
//! keeps the payload in its own file with a JSON sidecar so listings never
//! read video data. An in-memory store backs tests and headless runs.

mod entity;
mod error;
mod fs;
mod memory;

pub use entity::{CanvasAnnotation, Recording, Screenshot};
pub use error::StoreError;
pub use fs::FsStore;
pub use memory::MemoryStore;

use uuid::Uuid;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence backend for recorded assets.
///
/// `load_*` listings are sorted by creation time, newest first.
pub trait AssetStore: Send + Sync {
    fn save_recording(&self, recording: &Recording) -> StoreResult<()>;
    fn load_recordings(&self) -> StoreResult<Vec<Recording>>;
    fn load_recording(&self, id: Uuid) -> StoreResult<Recording>;
    fn delete_recording(&self, id: Uuid) -> StoreResult<()>;

    fn save_screenshot(&self, screenshot: &Screenshot) -> StoreResult<()>;
    fn load_screenshots(&self) -> StoreResult<Vec<Screenshot>>;
    fn delete_screenshot(&self, id: Uuid) -> StoreResult<()>;
}
