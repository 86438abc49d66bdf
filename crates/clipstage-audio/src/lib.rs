//! Audio graph construction and mixing.
//!
//! Audio flows as 10ms interleaved stereo f32 chunks. The graph owns one
//! branch per active source (microphone, system audio), runs each branch
//! through its processing chain, and sums everything into a single mix
//! destination on a dedicated thread.

mod chunk;
mod dsp;
mod error;
mod graph;
mod source;

pub use chunk::AudioChunk;
pub use dsp::{AudioNode, BiquadFilter, Compressor, Gain};
pub use error::AudioError;
pub use graph::{AudioGraph, MixedChunk, MIC_DUCK_GAIN};
pub use source::{AudioSource, ToneSource};

/// Channel capacity for audio chunks.
pub const AUDIO_CHANNEL_CAPACITY: usize = 8;

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Audio sample rate in Hz.
pub const SAMPLE_RATE: u32 = 48_000;

/// Number of audio channels.
pub const CHANNELS: u16 = 2;

/// Sample frames per audio chunk (10ms at 48kHz).
pub const SAMPLES_PER_CHUNK: usize = 480;

/// Microphone high-pass cutoff in Hz (removes rumble).
pub const MIC_HIGHPASS_HZ: f32 = 80.0;

/// Microphone low-pass cutoff in Hz (removes hiss).
pub const MIC_LOWPASS_HZ: f32 = 12_000.0;
