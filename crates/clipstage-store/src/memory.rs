//! In-memory asset store.

use std::collections::HashMap;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::{AssetStore, Recording, Screenshot, StoreError, StoreResult};

/// Non-persistent store for tests and headless runs.
#[derive(Default)]
pub struct MemoryStore {
    recordings: Mutex<HashMap<Uuid, Recording>>,
    screenshots: Mutex<HashMap<Uuid, Screenshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssetStore for MemoryStore {
    fn save_recording(&self, recording: &Recording) -> StoreResult<()> {
        self.recordings
            .lock()
            .insert(recording.id, recording.clone());
        Ok(())
    }

    fn load_recordings(&self) -> StoreResult<Vec<Recording>> {
        let mut all: Vec<Recording> = self.recordings.lock().values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    fn load_recording(&self, id: Uuid) -> StoreResult<Recording> {
        self.recordings
            .lock()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn delete_recording(&self, id: Uuid) -> StoreResult<()> {
        self.recordings
            .lock()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    fn save_screenshot(&self, screenshot: &Screenshot) -> StoreResult<()> {
        self.screenshots
            .lock()
            .insert(screenshot.id, screenshot.clone());
        Ok(())
    }

    fn load_screenshots(&self) -> StoreResult<Vec<Screenshot>> {
        let mut all: Vec<Screenshot> = self.screenshots.lock().values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    fn delete_screenshot(&self, id: Uuid) -> StoreResult<()> {
        self.screenshots
            .lock()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
