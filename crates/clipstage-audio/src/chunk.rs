//! Audio chunk type.

use bytes::Bytes;

/// A chunk of interleaved stereo f32 audio.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Raw sample bytes (little-endian f32, interleaved stereo).
    pub data: Bytes,

    /// Presentation timestamp in 100ns units.
    pub pts_100ns: u64,

    /// Sequence number.
    pub sequence: u64,
}

impl AudioChunk {
    /// Build a chunk from f32 samples.
    pub fn from_samples(samples: &[f32], pts_100ns: u64, sequence: u64) -> Self {
        let mut data = Vec::with_capacity(samples.len() * 4);
        for sample in samples {
            data.extend_from_slice(&sample.to_le_bytes());
        }
        Self {
            data: Bytes::from(data),
            pts_100ns,
            sequence,
        }
    }

    /// Decode the sample bytes back into f32 samples.
    pub fn to_samples(&self) -> Vec<f32> {
        self.data
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    /// Number of f32 samples in this chunk (all channels).
    pub fn sample_count(&self) -> usize {
        self.data.len() / 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_round_trip() {
        let samples = vec![0.0f32, 0.5, -0.5, 1.0];
        let chunk = AudioChunk::from_samples(&samples, 0, 0);
        assert_eq!(chunk.sample_count(), 4);
        assert_eq!(chunk.to_samples(), samples);
    }
}
