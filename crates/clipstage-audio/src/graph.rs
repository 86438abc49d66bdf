//! Audio routing graph.
//!
//! Each branch pulls chunks from one source, runs its processing chain, and
//! is summed into the shared mix destination by a 10ms mixer thread. Branches
//! are additive: a graph with both a microphone and a system branch feeds two
//! independent chains into the same destination.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, trace, warn};

use crate::chunk::AudioChunk;
use crate::dsp::{AudioNode, BiquadFilter, Compressor, Gain};
use crate::{
    AudioResult, AUDIO_CHANNEL_CAPACITY, MIC_HIGHPASS_HZ, MIC_LOWPASS_HZ, SAMPLES_PER_CHUNK,
};

/// Microphone branch gain when mixed alongside system audio.
///
/// A fixed heuristic, not a measured loudness balance.
pub const MIC_DUCK_GAIN: f32 = 0.8;

/// Output of the mix destination.
pub type MixedChunk = AudioChunk;

struct Branch {
    label: &'static str,
    receiver: Receiver<AudioChunk>,
    chain: Vec<Box<dyn AudioNode>>,
    volume: Arc<RwLock<f32>>,
    muted: Arc<AtomicBool>,
}

/// Handle for adjusting a branch after the graph has started.
#[derive(Clone)]
pub struct BranchControl {
    volume: Arc<RwLock<f32>>,
    muted: Arc<AtomicBool>,
}

impl BranchControl {
    /// Set the branch volume (0.0 - 1.0).
    pub fn set_volume(&self, volume: f32) {
        *self.volume.write() = volume.clamp(0.0, 1.0);
    }

    /// Mute or unmute the branch.
    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
    }
}

/// Audio graph mixing zero or more branches into one destination.
pub struct AudioGraph {
    branches: Vec<Branch>,
    mix_thread: Option<JoinHandle<()>>,
    should_stop: Arc<AtomicBool>,
}

impl AudioGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            branches: Vec::new(),
            mix_thread: None,
            should_stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of branches feeding the destination.
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Add the system-audio branch: unity gain straight into the mix.
    pub fn add_system_branch(&mut self, receiver: Receiver<AudioChunk>) -> BranchControl {
        self.add_branch("system", receiver, vec![Box::new(Gain::new(1.0))])
    }

    /// Add the microphone branch: high-pass, low-pass, compressor, gain.
    ///
    /// `gain` should be [`MIC_DUCK_GAIN`] when a system branch is also
    /// active, 1.0 otherwise.
    pub fn add_microphone_branch(
        &mut self,
        receiver: Receiver<AudioChunk>,
        gain: f32,
    ) -> BranchControl {
        let chain: Vec<Box<dyn AudioNode>> = vec![
            Box::new(BiquadFilter::high_pass(MIC_HIGHPASS_HZ, 0.707)),
            Box::new(BiquadFilter::low_pass(MIC_LOWPASS_HZ, 0.707)),
            Box::new(Compressor::speech()),
            Box::new(Gain::new(gain)),
        ];
        self.add_branch("microphone", receiver, chain)
    }

    fn add_branch(
        &mut self,
        label: &'static str,
        receiver: Receiver<AudioChunk>,
        chain: Vec<Box<dyn AudioNode>>,
    ) -> BranchControl {
        let volume = Arc::new(RwLock::new(1.0));
        let muted = Arc::new(AtomicBool::new(false));
        let control = BranchControl {
            volume: Arc::clone(&volume),
            muted: Arc::clone(&muted),
        };
        debug!(label, nodes = chain.len(), "Adding audio branch");
        self.branches.push(Branch {
            label,
            receiver,
            chain,
            volume,
            muted,
        });
        control
    }

    /// Start the mix thread. Returns the destination output.
    #[instrument(name = "graph_start", skip(self), fields(branches = self.branches.len()))]
    pub fn start(&mut self) -> AudioResult<Receiver<MixedChunk>> {
        info!("Starting audio graph");

        let (sender, receiver): (Sender<MixedChunk>, Receiver<MixedChunk>) =
            crossbeam_channel::bounded(AUDIO_CHANNEL_CAPACITY);

        let should_stop = Arc::clone(&self.should_stop);
        should_stop.store(false, Ordering::SeqCst);

        let branches = std::mem::take(&mut self.branches);

        let handle = thread::spawn(move || {
            mix_loop(branches, sender, should_stop);
        });

        self.mix_thread = Some(handle);
        Ok(receiver)
    }

    /// Stop the mix thread.
    #[instrument(name = "graph_stop", skip(self))]
    pub fn stop(&mut self) {
        self.should_stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.mix_thread.take() {
            let _ = handle.join();
        }
    }
}

impl Default for AudioGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AudioGraph {
    fn drop(&mut self) {
        self.stop();
    }
}

fn mix_loop(mut branches: Vec<Branch>, sender: Sender<MixedChunk>, should_stop: Arc<AtomicBool>) {
    debug!("Mix thread started");

    let samples_per_chunk = SAMPLES_PER_CHUNK * 2;
    let mut mix_buffer = vec![0.0f32; samples_per_chunk];
    let mut branch_buffer = vec![0.0f32; samples_per_chunk];
    let mut sequence = 0u64;

    let chunk_duration = Duration::from_millis(10);
    let start_time = Instant::now();
    let mut next_chunk_time = start_time;

    while !should_stop.load(Ordering::SeqCst) {
        mix_buffer.fill(0.0);

        for branch in branches.iter_mut() {
            if branch.muted.load(Ordering::SeqCst) {
                continue;
            }

            match branch.receiver.try_recv() {
                Ok(chunk) => {
                    let samples = chunk.to_samples();
                    branch_buffer.fill(0.0);
                    let n = samples.len().min(branch_buffer.len());
                    branch_buffer[..n].copy_from_slice(&samples[..n]);

                    for node in branch.chain.iter_mut() {
                        node.process(&mut branch_buffer);
                    }

                    let volume = *branch.volume.read();
                    for (mix, &sample) in mix_buffer.iter_mut().zip(branch_buffer.iter()) {
                        *mix += sample * volume;
                    }
                }
                Err(crossbeam_channel::TryRecvError::Empty) => {
                    // Source not ready this tick; contributes silence.
                }
                Err(crossbeam_channel::TryRecvError::Disconnected) => {
                    warn!(label = branch.label, "Audio branch disconnected");
                }
            }
        }

        for sample in mix_buffer.iter_mut() {
            *sample = soft_clip(*sample);
        }

        let elapsed = next_chunk_time.duration_since(start_time);
        let output =
            AudioChunk::from_samples(&mix_buffer, elapsed.as_nanos() as u64 / 100, sequence);

        match sender.try_send(output) {
            Ok(()) => {}
            Err(crossbeam_channel::TrySendError::Full(_)) => {
                trace!("Mix destination full, dropping chunk");
            }
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => break,
        }

        sequence += 1;
        next_chunk_time += chunk_duration;

        let now = Instant::now();
        if next_chunk_time > now {
            thread::sleep(next_chunk_time - now);
        }
    }

    debug!("Mix thread exiting");
}

/// Soft clipping to avoid harsh digital clipping when branches sum above 1.0.
fn soft_clip(sample: f32) -> f32 {
    if sample > 1.0 {
        1.0 - (-sample + 1.0).exp() * 0.5
    } else if sample < -1.0 {
        -1.0 + (sample + 1.0).exp() * 0.5
    } else {
        sample
    }
}
