//! Audio sources.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, instrument};

use crate::chunk::AudioChunk;
use crate::{AudioError, AudioResult, AUDIO_CHANNEL_CAPACITY, SAMPLES_PER_CHUNK, SAMPLE_RATE};

/// Trait for audio sources (microphone, system loopback, synthetic).
pub trait AudioSource: Send {
    /// Start producing 10ms chunks.
    fn start(&mut self) -> AudioResult<Receiver<AudioChunk>>;

    /// Stop producing and release the device.
    fn stop(&mut self) -> AudioResult<()>;

    /// Check if the source is active.
    fn is_active(&self) -> bool;
}

/// Synthetic sine-wave source implementing [`AudioSource`].
///
/// Stands in for a real device in tests and headless runs.
pub struct ToneSource {
    freq: f32,
    amplitude: f32,
    should_stop: Arc<AtomicBool>,
    is_active: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ToneSource {
    /// Create a tone source at the given frequency and amplitude.
    pub fn new(freq: f32, amplitude: f32) -> Self {
        Self {
            freq,
            amplitude: amplitude.clamp(0.0, 1.0),
            should_stop: Arc::new(AtomicBool::new(false)),
            is_active: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

impl AudioSource for ToneSource {
    #[instrument(name = "tone_start", skip(self), fields(freq = self.freq))]
    fn start(&mut self) -> AudioResult<Receiver<AudioChunk>> {
        if self.is_active.load(Ordering::SeqCst) {
            return Err(AudioError::AlreadyStarted);
        }

        let (sender, receiver): (Sender<AudioChunk>, Receiver<AudioChunk>) =
            crossbeam_channel::bounded(AUDIO_CHANNEL_CAPACITY);

        let should_stop = Arc::clone(&self.should_stop);
        should_stop.store(false, Ordering::SeqCst);
        let is_active = Arc::clone(&self.is_active);
        is_active.store(true, Ordering::SeqCst);

        let freq = self.freq;
        let amplitude = self.amplitude;

        let handle = thread::spawn(move || {
            tone_loop(freq, amplitude, sender, should_stop);
            is_active.store(false, Ordering::SeqCst);
        });

        self.worker = Some(handle);
        debug!("Tone source started");
        Ok(receiver)
    }

    fn stop(&mut self) -> AudioResult<()> {
        self.should_stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        self.is_active.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}

impl Drop for ToneSource {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn tone_loop(
    freq: f32,
    amplitude: f32,
    sender: Sender<AudioChunk>,
    should_stop: Arc<AtomicBool>,
) {
    let chunk_duration = Duration::from_millis(10);
    let start_time = Instant::now();
    let mut next_chunk_time = start_time;
    let mut sequence = 0u64;
    let mut phase = 0.0f32;
    let phase_step = 2.0 * std::f32::consts::PI * freq / SAMPLE_RATE as f32;

    let mut samples = vec![0.0f32; SAMPLES_PER_CHUNK * 2];

    while !should_stop.load(Ordering::SeqCst) {
        for frame in 0..SAMPLES_PER_CHUNK {
            let v = amplitude * phase.sin();
            samples[frame * 2] = v;
            samples[frame * 2 + 1] = v;
            phase += phase_step;
            if phase > 2.0 * std::f32::consts::PI {
                phase -= 2.0 * std::f32::consts::PI;
            }
        }

        let elapsed = next_chunk_time.duration_since(start_time);
        let chunk = AudioChunk::from_samples(&samples, elapsed.as_nanos() as u64 / 100, sequence);

        match sender.try_send(chunk) {
            Ok(()) => {}
            Err(crossbeam_channel::TrySendError::Full(_)) => {}
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => break,
        }

        sequence += 1;
        next_chunk_time += chunk_duration;

        let now = Instant::now();
        if next_chunk_time > now {
            thread::sleep(next_chunk_time - now);
        }
    }

    debug!(chunks = sequence, "Tone source exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_produces_nonsilent_chunks() {
        let mut source = ToneSource::new(440.0, 0.5);
        let rx = source.start().unwrap();
        let chunk = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        let samples = chunk.to_samples();
        assert_eq!(samples.len(), SAMPLES_PER_CHUNK * 2);
        assert!(samples.iter().any(|s| s.abs() > 0.1));
        source.stop().unwrap();
    }
}
