//! Energy gradient classification
//!
//! The slope of the energy curve just after the intro decides how the
//! transition into this track should feel: a sharp rise wants a tight
//! cut, a slow build wants a long blend.

use crate::analysis::profile::EnergyProfile;
use segue_common::types::TransitionType;

/// Segments to look ahead of the intro end when measuring the slope
const GRADIENT_WINDOW_SEGMENTS: usize = 4;

/// Gradient at or above this is a hard transition
const HARD_THRESHOLD: f64 = 0.30;

/// Gradient at or above this (but below hard) is a medium transition
const MEDIUM_THRESHOLD: f64 = 0.10;

/// Measure the normalized energy slope after the intro
///
/// The delta between the intro-end segment and a segment
/// [`GRADIENT_WINDOW_SEGMENTS`] later is normalized by peak energy and
/// by the actual span in segments, yielding a rate per segment in
/// [0, 1]. An intro ending at or past the last usable segment, an empty
/// profile, or a silent profile all measure `0.0`; falling energy
/// clamps to `0.0` rather than going negative.
pub fn energy_gradient(profile: &EnergyProfile, intro_end: f64) -> f64 {
    let n = profile.len();
    if n == 0 {
        return 0.0;
    }
    let peak = profile.peak();
    if peak <= 0.0 {
        return 0.0;
    }

    let last = n - 1;
    let intro_index = ((intro_end * n as f64).round() as usize).min(last);
    if intro_index >= last {
        return 0.0;
    }
    let window_index = (intro_index + GRADIENT_WINDOW_SEGMENTS).min(last);
    let span = (window_index - intro_index) as f64;

    let at_intro = f64::from(profile.get(intro_index).unwrap_or(0.0));
    let at_window = f64::from(profile.get(window_index).unwrap_or(0.0));
    let delta = at_window - at_intro;

    (delta / f64::from(peak) / span).clamp(0.0, 1.0)
}

/// Map a gradient to the transition character
pub fn classify_gradient(gradient: f64) -> TransitionType {
    if gradient >= HARD_THRESHOLD {
        TransitionType::Hard
    } else if gradient >= MEDIUM_THRESHOLD {
        TransitionType::Medium
    } else {
        TransitionType::Soft
    }
}
