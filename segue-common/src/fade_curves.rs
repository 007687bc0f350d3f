//! Fade curve implementations for crossfading
//!
//! Provides the four curve shapes used by the crossfade executor, with
//! precise mathematical formulas for deterministic volume ramps.

use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// Fade curve types for crossfading
///
/// Each curve type provides a different perceptual quality:
/// - Linear: Constant rate of change (precise, predictable)
/// - Exponential: Slow start, fast finish
/// - SCurve: Smooth acceleration and deceleration (gentle, musical)
/// - EqualPower: Constant perceived loudness during crossfade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    /// Linear: v(t) = t
    /// Constant rate of change, used for hard cuts and the fallback ramp
    Linear,

    /// Exponential: v(t) = t²
    /// Slow start, fast finish
    Exponential,

    /// S-Curve (smoothstep): v(t) = 3t² - 2t³
    /// Smooth acceleration and deceleration, zero slope at both ends
    SCurve,

    /// Equal-Power: v(t) = sin(t × π/2)
    /// Maintains constant perceived loudness during crossfade
    EqualPower,
}

impl FadeCurve {
    /// Evaluate the curve at a normalized position
    ///
    /// - `position`: 0.0 (start of ramp) to 1.0 (end of ramp), clamped
    /// - Returns: curved progress (0.0 to 1.0)
    ///
    /// The executor derives the outgoing/incoming volume pair from this
    /// value; equal-power ramps additionally use the complementary
    /// cosine so the two sides sum to constant power.
    pub fn apply(&self, position: f32) -> f32 {
        let t = position.clamp(0.0, 1.0);

        match self {
            FadeCurve::Linear => t,
            FadeCurve::Exponential => t * t,
            FadeCurve::SCurve => {
                // Smoothstep: y = 3t² - 2t³
                t * t * (3.0 - 2.0 * t)
            }
            FadeCurve::EqualPower => (t * FRAC_PI_2).sin(),
        }
    }

    /// Parse curve from string (config files and CLI flags)
    ///
    /// Accepted values:
    /// - 'linear'
    /// - 'exponential'
    /// - 'smoothstep', 'scurve', 's-curve', 's_curve' (aliases for SCurve)
    /// - 'equal_power', 'equalpower' (aliases)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Some(FadeCurve::Linear),
            "exponential" => Some(FadeCurve::Exponential),
            "smoothstep" | "scurve" | "s-curve" | "s_curve" => Some(FadeCurve::SCurve),
            "equal_power" | "equalpower" => Some(FadeCurve::EqualPower),
            _ => None,
        }
    }

    /// Canonical string representation (lowercase, underscored)
    pub fn as_str(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "linear",
            FadeCurve::Exponential => "exponential",
            FadeCurve::SCurve => "s_curve",
            FadeCurve::EqualPower => "equal_power",
        }
    }

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "Linear",
            FadeCurve::Exponential => "Exponential",
            FadeCurve::SCurve => "S-Curve",
            FadeCurve::EqualPower => "Equal Power",
        }
    }

    /// Get all available fade curve variants
    ///
    /// Useful for UI dropdowns and validation
    pub fn all_variants() -> &'static [FadeCurve] {
        &[
            FadeCurve::Linear,
            FadeCurve::Exponential,
            FadeCurve::SCurve,
            FadeCurve::EqualPower,
        ]
    }
}

impl Default for FadeCurve {
    /// Default fade curve is Linear (the fallback ramp shape)
    fn default() -> Self {
        FadeCurve::Linear
    }
}

impl std::fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
