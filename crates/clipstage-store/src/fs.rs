//! Filesystem-backed asset store.
//!
//! Layout under the root directory:
//!
//! ```text
//! recordings/<id>.bin   raw container payload
//! recordings/<id>.json  metadata sidecar
//! screenshots/<id>.bin
//! screenshots/<id>.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::{AssetStore, CanvasAnnotation, Recording, Screenshot, StoreError, StoreResult};

#[derive(Serialize, Deserialize)]
struct RecordingMeta {
    id: Uuid,
    duration_secs: f64,
    created_at: DateTime<Utc>,
    resolution: String,
    byte_size: u64,
    annotations: Vec<CanvasAnnotation>,
}

#[derive(Serialize, Deserialize)]
struct ScreenshotMeta {
    id: Uuid,
    created_at: DateTime<Utc>,
}

/// Store persisting each entity as a payload file plus a JSON sidecar.
pub struct FsStore {
    recordings_dir: PathBuf,
    screenshots_dir: PathBuf,
}

impl FsStore {
    /// Open (and create if needed) a store rooted at `root`.
    #[instrument(name = "fs_store_open", skip_all, fields(root = %root.as_ref().display()))]
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref();
        let recordings_dir = root.join("recordings");
        let screenshots_dir = root.join("screenshots");
        fs::create_dir_all(&recordings_dir)?;
        fs::create_dir_all(&screenshots_dir)?;
        debug!("Asset store opened");
        Ok(Self {
            recordings_dir,
            screenshots_dir,
        })
    }

    /// Open the store at the platform default location.
    pub fn open_default() -> StoreResult<Self> {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::open(base.join("clipstage"))
    }

    fn payload_path(dir: &Path, id: Uuid) -> PathBuf {
        dir.join(format!("{id}.bin"))
    }

    fn meta_path(dir: &Path, id: Uuid) -> PathBuf {
        dir.join(format!("{id}.json"))
    }

    fn read_recording(&self, id: Uuid) -> StoreResult<Recording> {
        let meta_path = Self::meta_path(&self.recordings_dir, id);
        if !meta_path.exists() {
            return Err(StoreError::NotFound(id));
        }
        let meta: RecordingMeta = serde_json::from_slice(&fs::read(meta_path)?)?;
        let payload = fs::read(Self::payload_path(&self.recordings_dir, id))?;
        Ok(Recording {
            id: meta.id,
            payload: Bytes::from(payload),
            duration_secs: meta.duration_secs,
            created_at: meta.created_at,
            resolution: meta.resolution,
            byte_size: meta.byte_size,
            annotations: meta.annotations,
        })
    }

    fn sidecar_ids(dir: &Path) -> StoreResult<Vec<Uuid>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            match stem.parse::<Uuid>() {
                Ok(id) => ids.push(id),
                Err(_) => warn!(path = %path.display(), "Skipping foreign file in store"),
            }
        }
        Ok(ids)
    }

    fn remove_entity(dir: &Path, id: Uuid) -> StoreResult<()> {
        let meta_path = Self::meta_path(dir, id);
        if !meta_path.exists() {
            return Err(StoreError::NotFound(id));
        }
        fs::remove_file(meta_path)?;
        let payload_path = Self::payload_path(dir, id);
        if payload_path.exists() {
            fs::remove_file(payload_path)?;
        }
        Ok(())
    }
}

impl AssetStore for FsStore {
    #[instrument(name = "save_recording", skip_all, fields(id = %recording.id, bytes = recording.payload.len()))]
    fn save_recording(&self, recording: &Recording) -> StoreResult<()> {
        let meta = RecordingMeta {
            id: recording.id,
            duration_secs: recording.duration_secs,
            created_at: recording.created_at,
            resolution: recording.resolution.clone(),
            byte_size: recording.byte_size,
            annotations: recording.annotations.clone(),
        };
        fs::write(
            Self::payload_path(&self.recordings_dir, recording.id),
            &recording.payload,
        )?;
        fs::write(
            Self::meta_path(&self.recordings_dir, recording.id),
            serde_json::to_vec_pretty(&meta)?,
        )?;
        debug!("Recording saved");
        Ok(())
    }

    fn load_recordings(&self) -> StoreResult<Vec<Recording>> {
        let mut all = Vec::new();
        for id in Self::sidecar_ids(&self.recordings_dir)? {
            all.push(self.read_recording(id)?);
        }
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    fn load_recording(&self, id: Uuid) -> StoreResult<Recording> {
        self.read_recording(id)
    }

    fn delete_recording(&self, id: Uuid) -> StoreResult<()> {
        Self::remove_entity(&self.recordings_dir, id)
    }

    #[instrument(name = "save_screenshot", skip_all, fields(id = %screenshot.id))]
    fn save_screenshot(&self, screenshot: &Screenshot) -> StoreResult<()> {
        let meta = ScreenshotMeta {
            id: screenshot.id,
            created_at: screenshot.created_at,
        };
        fs::write(
            Self::payload_path(&self.screenshots_dir, screenshot.id),
            &screenshot.payload,
        )?;
        fs::write(
            Self::meta_path(&self.screenshots_dir, screenshot.id),
            serde_json::to_vec_pretty(&meta)?,
        )?;
        Ok(())
    }

    fn load_screenshots(&self) -> StoreResult<Vec<Screenshot>> {
        let mut all = Vec::new();
        for id in Self::sidecar_ids(&self.screenshots_dir)? {
            let meta_path = Self::meta_path(&self.screenshots_dir, id);
            let meta: ScreenshotMeta = serde_json::from_slice(&fs::read(meta_path)?)?;
            let payload = fs::read(Self::payload_path(&self.screenshots_dir, id))?;
            all.push(Screenshot {
                id: meta.id,
                payload: Bytes::from(payload),
                created_at: meta.created_at,
            });
        }
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    fn delete_screenshot(&self, id: Uuid) -> StoreResult<()> {
        Self::remove_entity(&self.screenshots_dir, id)
    }
}
