//! Trim window over a clip's timeline.

/// Minimum separation between trim handles, in seconds.
pub const MIN_TRIM_GAP_SECS: f64 = 0.5;

/// A `[start, end]` window over a clip, `0 <= start < end <= duration`.
///
/// Mutations clamp instead of failing, so dragging a handle past the other
/// pins it at the minimum gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimWindow {
    start_secs: f64,
    end_secs: f64,
    duration_secs: f64,
}

impl TrimWindow {
    /// Full-clip window.
    pub fn new(duration_secs: f64) -> Self {
        let duration_secs = if duration_secs.is_finite() {
            duration_secs.max(0.0)
        } else {
            0.0
        };
        Self {
            start_secs: 0.0,
            end_secs: duration_secs,
            duration_secs,
        }
    }

    pub fn start_secs(&self) -> f64 {
        self.start_secs
    }

    pub fn end_secs(&self) -> f64 {
        self.end_secs
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Window length in seconds.
    pub fn len_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }

    /// Move the start handle. Clamped to `[0, end - gap]`.
    pub fn set_start(&mut self, secs: f64) {
        if !secs.is_finite() {
            return;
        }
        let max_start = (self.end_secs - MIN_TRIM_GAP_SECS).max(0.0);
        self.start_secs = secs.clamp(0.0, max_start);
    }

    /// Move the end handle. Clamped to `[start + gap, duration]`.
    pub fn set_end(&mut self, secs: f64) {
        if !secs.is_finite() {
            return;
        }
        let min_end = (self.start_secs + MIN_TRIM_GAP_SECS).min(self.duration_secs);
        self.end_secs = secs.clamp(min_end, self.duration_secs);
    }

    /// Check the invariant holds; short clips may legitimately be under the
    /// minimum gap.
    pub fn is_valid(&self) -> bool {
        self.start_secs.is_finite()
            && self.end_secs.is_finite()
            && self.start_secs >= 0.0
            && self.start_secs < self.end_secs
            && self.end_secs <= self.duration_secs
    }
}
