//! Processing nodes for the audio graph.
//!
//! Biquad filters use the RBJ cookbook coefficients. The compressor is a
//! simple envelope follower with attack/release smoothing in the dB domain.
//! All nodes process interleaved stereo buffers in place.

use crate::{CHANNELS, SAMPLE_RATE};

const MIN_DB: f32 = -96.0;
const MIN_LOG_INPUT: f32 = 1e-10;

fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-25 {
        0.0
    } else {
        x
    }
}

fn validate_float(x: f32) -> f32 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// A node in an audio branch's processing chain.
pub trait AudioNode: Send {
    /// Process an interleaved stereo buffer in place.
    fn process(&mut self, samples: &mut [f32]);

    /// Node name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Biquad IIR filter. One independent state per channel.
pub struct BiquadFilter {
    kind: &'static str,
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    // Per-channel delay lines.
    x1: [f32; 2],
    x2: [f32; 2],
    y1: [f32; 2],
    y2: [f32; 2],
}

impl BiquadFilter {
    /// High-pass filter at the given cutoff.
    pub fn high_pass(freq: f32, q: f32) -> Self {
        let w0 = 2.0 * std::f32::consts::PI * freq / SAMPLE_RATE as f32;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let b0 = (1.0 + cos_w0) / 2.0;
        let b1 = -(1.0 + cos_w0);
        let b2 = (1.0 + cos_w0) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        Self::normalized("highpass", b0, b1, b2, a0, a1, a2)
    }

    /// Low-pass filter at the given cutoff.
    pub fn low_pass(freq: f32, q: f32) -> Self {
        let w0 = 2.0 * std::f32::consts::PI * freq / SAMPLE_RATE as f32;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let b0 = (1.0 - cos_w0) / 2.0;
        let b1 = 1.0 - cos_w0;
        let b2 = (1.0 - cos_w0) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        Self::normalized("lowpass", b0, b1, b2, a0, a1, a2)
    }

    fn normalized(
        kind: &'static str,
        b0: f32,
        b1: f32,
        b2: f32,
        a0: f32,
        a1: f32,
        a2: f32,
    ) -> Self {
        Self {
            kind,
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
            x1: [0.0; 2],
            x2: [0.0; 2],
            y1: [0.0; 2],
            y2: [0.0; 2],
        }
    }

    fn process_one(&mut self, ch: usize, input: f32) -> f32 {
        let input = validate_float(input);
        let output = self.b0 * input + self.b1 * self.x1[ch] + self.b2 * self.x2[ch]
            - self.a1 * self.y1[ch]
            - self.a2 * self.y2[ch];

        self.x2[ch] = flush_denormal(self.x1[ch]);
        self.x1[ch] = input;
        self.y2[ch] = flush_denormal(self.y1[ch]);
        self.y1[ch] = validate_float(output);

        self.y1[ch]
    }

    /// Reset filter state.
    pub fn reset(&mut self) {
        self.x1 = [0.0; 2];
        self.x2 = [0.0; 2];
        self.y1 = [0.0; 2];
        self.y2 = [0.0; 2];
    }
}

impl AudioNode for BiquadFilter {
    fn process(&mut self, samples: &mut [f32]) {
        let channels = CHANNELS as usize;
        for (i, sample) in samples.iter_mut().enumerate() {
            let ch = i % channels;
            *sample = self.process_one(ch, *sample);
        }
    }

    fn name(&self) -> &'static str {
        self.kind
    }
}

/// Dynamics compressor with fast attack/release.
pub struct Compressor {
    threshold_db: f32,
    ratio: f32,
    attack_coeff: f32,
    release_coeff: f32,
    envelope_db: f32,
}

impl Compressor {
    /// Compressor tuned for speech: -24dB threshold, 4:1 ratio, fast
    /// attack/release.
    pub fn speech() -> Self {
        Self::new(-24.0, 4.0, 3.0, 50.0)
    }

    /// Create a compressor with explicit parameters.
    pub fn new(threshold_db: f32, ratio: f32, attack_ms: f32, release_ms: f32) -> Self {
        let coeff = |ms: f32| (-1.0 / (ms * 0.001 * SAMPLE_RATE as f32)).exp();
        Self {
            threshold_db,
            ratio: ratio.max(1.0),
            attack_coeff: coeff(attack_ms),
            release_coeff: coeff(release_ms),
            envelope_db: MIN_DB,
        }
    }

    /// Reset envelope state.
    pub fn reset(&mut self) {
        self.envelope_db = MIN_DB;
    }
}

impl AudioNode for Compressor {
    fn process(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            let input = validate_float(*sample);
            let level = input.abs();

            let level_db = if level > MIN_LOG_INPUT {
                (20.0 * level.log10()).clamp(MIN_DB, 40.0)
            } else {
                MIN_DB
            };

            let coeff = if level_db > self.envelope_db {
                self.attack_coeff
            } else {
                self.release_coeff
            };
            self.envelope_db =
                validate_float(level_db + (self.envelope_db - level_db) * coeff);

            let reduction_db = if self.envelope_db > self.threshold_db {
                let over = self.envelope_db - self.threshold_db;
                (over - over / self.ratio).clamp(0.0, 60.0)
            } else {
                0.0
            };

            let gain = 10.0f32.powf(-reduction_db / 20.0).clamp(0.001, 2.0);
            *sample = validate_float(input * gain);
        }
    }

    fn name(&self) -> &'static str {
        "compressor"
    }
}

/// Constant gain node.
pub struct Gain {
    value: f32,
}

impl Gain {
    /// Create a gain node clamped to [0, 1].
    pub fn new(value: f32) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
        }
    }
}

impl AudioNode for Gain {
    fn process(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample *= self.value;
        }
    }

    fn name(&self) -> &'static str {
        "gain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, frames: usize, amplitude: f32) -> Vec<f32> {
        let mut out = Vec::with_capacity(frames * 2);
        for i in 0..frames {
            let t = i as f32 / SAMPLE_RATE as f32;
            let v = amplitude * (2.0 * std::f32::consts::PI * freq * t).sin();
            out.push(v);
            out.push(v);
        }
        out
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn high_pass_removes_dc() {
        let mut filter = BiquadFilter::high_pass(80.0, 0.707);
        let mut buf = vec![1.0f32; 4800 * 2];
        filter.process(&mut buf);
        // After settling, DC should be almost entirely gone.
        let tail = &buf[buf.len() - 960..];
        assert!(rms(tail) < 0.05, "residual DC rms {}", rms(tail));
    }

    #[test]
    fn low_pass_attenuates_hiss() {
        let mut filter = BiquadFilter::low_pass(12_000.0, 0.707);
        let mut high = sine(20_000.0, 4800, 0.8);
        let before = rms(&high);
        filter.process(&mut high);
        let after = rms(&high[960..]);
        assert!(after < before * 0.5, "before={} after={}", before, after);
    }

    #[test]
    fn low_pass_passes_speech_band() {
        let mut filter = BiquadFilter::low_pass(12_000.0, 0.707);
        let mut mid = sine(440.0, 4800, 0.8);
        let before = rms(&mid);
        filter.process(&mut mid);
        let after = rms(&mid[960..]);
        assert!(after > before * 0.8, "before={} after={}", before, after);
    }

    #[test]
    fn compressor_reduces_loud_signal() {
        let mut comp = Compressor::speech();
        let mut loud = sine(440.0, 9600, 0.9);
        let before = rms(&loud);
        comp.process(&mut loud);
        let after = rms(&loud[9600..]);
        assert!(after < before, "before={} after={}", before, after);
    }

    #[test]
    fn compressor_leaves_quiet_signal_alone() {
        let mut comp = Compressor::speech();
        let mut quiet = sine(440.0, 9600, 0.01);
        let before = rms(&quiet);
        comp.process(&mut quiet);
        let after = rms(&quiet[9600..]);
        assert!((after - before).abs() < before * 0.2);
    }

    #[test]
    fn gain_scales_and_clamps() {
        let mut gain = Gain::new(0.5);
        let mut buf = vec![1.0f32, -1.0];
        gain.process(&mut buf);
        assert_eq!(buf, vec![0.5, -0.5]);

        let clamped = Gain::new(2.0);
        assert_eq!(clamped.value, 1.0);
    }

    #[test]
    fn non_finite_input_is_flushed() {
        let mut filter = BiquadFilter::high_pass(80.0, 0.707);
        let mut buf = vec![f32::NAN, f32::INFINITY, 0.5, 0.5];
        filter.process(&mut buf);
        assert!(buf.iter().all(|s| s.is_finite()));
    }
}
