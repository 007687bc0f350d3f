//! Per-segment RMS energy profile
//!
//! The profile is the only artifact the boundary and gradient stages
//! consume; once built it is immutable.

/// RMS energy per fixed-length segment of one track
///
/// Segment values are linear RMS amplitudes in [0, 1] for full-scale
/// input. An empty profile (zero-length input) and an all-zero profile
/// (silence) are both valid; downstream stages treat them as "no usable
/// signal" rather than errors.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyProfile {
    segments: Vec<f32>,
    segment_seconds: f64,
    sample_rate: u32,
}

impl EnergyProfile {
    pub(crate) fn new(segments: Vec<f32>, segment_seconds: f64, sample_rate: u32) -> Self {
        Self {
            segments,
            segment_seconds,
            sample_rate,
        }
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// RMS energy of one segment
    pub fn get(&self, index: usize) -> Option<f32> {
        self.segments.get(index).copied()
    }

    /// All segment energies in track order
    pub fn segments(&self) -> &[f32] {
        &self.segments
    }

    /// Length of one segment in seconds
    pub fn segment_seconds(&self) -> f64 {
        self.segment_seconds
    }

    /// Sample rate the profile was built from
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Profiled duration in seconds (segment count × segment length)
    ///
    /// The final segment may represent less audio than `segment_seconds`
    /// when the track did not end on a boundary, so this is an upper
    /// bound within one segment of the true length.
    pub fn duration_seconds(&self) -> f64 {
        self.segments.len() as f64 * self.segment_seconds
    }

    /// Maximum segment energy across the whole track
    pub fn peak(&self) -> f32 {
        self.segments.iter().copied().fold(0.0, f32::max)
    }

    /// Mean energy over the middle 50% of segments
    ///
    /// Skips the first and last quarter so intros and outros do not
    /// drag the figure down. Used for diagnostics and logging alongside
    /// the peak-relative thresholds.
    pub fn middle_baseline(&self) -> f32 {
        if self.segments.is_empty() {
            return 0.0;
        }
        let start = self.segments.len() / 4;
        let end = (self.segments.len() * 3) / 4;
        let middle = &self.segments[start..end.max(start + 1).min(self.segments.len())];
        let sum: f32 = middle.iter().sum();
        sum / middle.len() as f32
    }
}
