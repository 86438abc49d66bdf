//! Persisted entity types.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{StoreError, StoreResult};

/// A raster annotation placed on the editing canvas.
///
/// Text and drawings are rasterized upstream; the store only sees pixels,
/// a normalized position and the moment it was added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasAnnotation {
    pub id: Uuid,

    /// Encoded raster image (BMP).
    pub raster: Vec<u8>,

    /// Normalized horizontal position of the top-left corner, 0..=1.
    pub x: f32,

    /// Normalized vertical position of the top-left corner, 0..=1.
    pub y: f32,

    /// Playback time the annotation was added at, in seconds.
    pub time_secs: f64,
}

/// A finished recording.
#[derive(Debug, Clone)]
pub struct Recording {
    pub id: Uuid,

    /// Complete container payload.
    pub payload: Bytes,

    /// Duration in seconds. Finite and non-negative.
    pub duration_secs: f64,

    pub created_at: DateTime<Utc>,

    /// Resolution label such as `1920x1080`.
    pub resolution: String,

    /// Payload size in bytes.
    pub byte_size: u64,

    /// Annotations deferred until the recording is opened in the editor.
    pub annotations: Vec<CanvasAnnotation>,
}

impl Recording {
    /// Build a recording entity around a finished payload.
    pub fn new(payload: Bytes, duration_secs: f64, resolution: String) -> StoreResult<Self> {
        if !duration_secs.is_finite() || duration_secs < 0.0 {
            return Err(StoreError::InvalidEntity(format!(
                "duration {duration_secs} is not a finite non-negative number"
            )));
        }
        let byte_size = payload.len() as u64;
        Ok(Self {
            id: Uuid::new_v4(),
            payload,
            duration_secs,
            created_at: Utc::now(),
            resolution,
            byte_size,
            annotations: Vec::new(),
        })
    }
}

/// A captured still image.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub id: Uuid,

    /// Encoded raster image (BMP).
    pub payload: Bytes,

    pub created_at: DateTime<Utc>,
}

impl Screenshot {
    pub fn new(payload: Bytes) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_records_payload_size() {
        let rec = Recording::new(Bytes::from(vec![0u8; 1234]), 5.0, "640x480".into()).unwrap();
        assert_eq!(rec.byte_size, 1234);
        assert!(rec.annotations.is_empty());
    }

    #[test]
    fn non_finite_duration_is_rejected() {
        assert!(Recording::new(Bytes::new(), f64::NAN, "640x480".into()).is_err());
        assert!(Recording::new(Bytes::new(), -1.0, "640x480".into()).is_err());
    }
}
