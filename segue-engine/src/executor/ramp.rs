//! Volume ramp evaluation
//!
//! Maps ramp progress to the outgoing/incoming volume pair for each
//! curve shape. Equal-power ramps use the complementary sine/cosine
//! pair on raw progress so the summed acoustic power stays constant;
//! every other curve fades the two sides complementarily in amplitude.

use segue_common::fade_curves::FadeCurve;
use std::f32::consts::FRAC_PI_2;

/// Target volume set-points for both decks at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumePair {
    pub outgoing: f32,
    pub incoming: f32,
}

/// Evaluate the volume pair at normalized ramp progress
pub fn volume_pair(curve: FadeCurve, progress: f64) -> VolumePair {
    let t = progress.clamp(0.0, 1.0) as f32;
    match curve {
        FadeCurve::EqualPower => VolumePair {
            outgoing: (t * FRAC_PI_2).cos(),
            incoming: (t * FRAC_PI_2).sin(),
        },
        _ => {
            let curved = curve.apply(t);
            VolumePair {
                outgoing: 1.0 - curved,
                incoming: curved,
            }
        }
    }
}
