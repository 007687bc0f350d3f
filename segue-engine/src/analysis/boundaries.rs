//! Intro and outro boundary detection
//!
//! Boundaries are found by scanning the energy profile for sustained
//! runs relative to the track's peak energy. Thresholds are
//! peak-relative so quiet masters and loud masters detect the same
//! structure.

use crate::analysis::profile::EnergyProfile;
use tracing::{debug, warn};

/// Fraction of peak energy a segment must reach to count as "in the body"
const INTRO_PEAK_RATIO: f32 = 0.7;

/// Fraction of peak energy below which a segment counts as "winding down"
const OUTRO_PEAK_RATIO: f32 = 0.5;

/// Segments a run must sustain before a boundary is accepted (~2s at
/// the default segment length)
const MIN_RUN_SEGMENTS: usize = 4;

/// Detected boundary pair, normalized to [0, 1] of profile length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackBoundaries {
    pub intro_end: f64,
    pub outro_start: f64,
}

/// Find where the intro ends
///
/// Forward scan: the intro ends at the start of the earliest run of at
/// least [`MIN_RUN_SEGMENTS`] consecutive segments at or above
/// `peak × 0.7`. Tracks with no qualifying run (including silence and
/// empty profiles) report `0.0`.
pub fn detect_intro_end(profile: &EnergyProfile) -> f64 {
    let peak = profile.peak();
    if profile.is_empty() || peak <= 0.0 {
        return 0.0;
    }
    let threshold = peak * INTRO_PEAK_RATIO;

    let mut run = 0usize;
    for (i, &energy) in profile.segments().iter().enumerate() {
        if energy >= threshold {
            run += 1;
            if run >= MIN_RUN_SEGMENTS {
                let run_start = i + 1 - MIN_RUN_SEGMENTS;
                return run_start as f64 / profile.len() as f64;
            }
        } else {
            run = 0;
        }
    }
    0.0
}

/// Find where the outro begins
///
/// Backward scan: the outro begins at the earliest index of the latest
/// maximal run of at least [`MIN_RUN_SEGMENTS`] consecutive segments
/// below `peak × 0.5`. Tracks that never wind down (including flat
/// profiles, silence and empty profiles) report `1.0`.
pub fn detect_outro_start(profile: &EnergyProfile) -> f64 {
    let peak = profile.peak();
    if profile.is_empty() || peak <= 0.0 {
        return 1.0;
    }
    let threshold = peak * OUTRO_PEAK_RATIO;
    let segments = profile.segments();

    let mut i = segments.len();
    while i > 0 {
        i -= 1;
        if segments[i] < threshold {
            // Extend this run to its earliest index
            let mut run_start = i;
            while run_start > 0 && segments[run_start - 1] < threshold {
                run_start -= 1;
            }
            let run_len = i - run_start + 1;
            if run_len >= MIN_RUN_SEGMENTS {
                return run_start as f64 / segments.len() as f64;
            }
            // Run too short; continue scanning before it
            i = run_start;
        }
    }
    1.0
}

/// Detect both boundaries and reconcile them
///
/// When detection inverts (outro before the intro's end, which happens
/// on oddly structured material like long quiet middles), the outro is
/// pushed to the very end so the track still plays out fully instead of
/// being rejected.
pub fn detect_boundaries(profile: &EnergyProfile) -> TrackBoundaries {
    let intro_end = detect_intro_end(profile);
    let mut outro_start = detect_outro_start(profile);

    debug!(
        "Boundary detection: {} segments, peak {:.4}, baseline {:.4}, intro_end {:.3}, outro_start {:.3}",
        profile.len(),
        profile.peak(),
        profile.middle_baseline(),
        intro_end,
        outro_start
    );

    if outro_start < intro_end {
        warn!(
            "Detected outro ({:.3}) precedes intro end ({:.3}); deferring outro to track end",
            outro_start, intro_end
        );
        outro_start = 1.0;
    }

    TrackBoundaries {
        intro_end: intro_end.clamp(0.0, 1.0),
        outro_start: outro_start.clamp(0.0, 1.0),
    }
}
