//! Crossfade plan calculation
//!
//! A pure function of the two analyses and the engine settings. The
//! same inputs always produce the same plan, so a plan can be computed
//! ahead of time, logged, and re-derived for inspection.

use segue_common::config::EngineConfig;
use segue_common::fade_curves::FadeCurve;
use segue_common::types::{TrackAnalysis, TrackInfo, TransitionType};
use serde::Serialize;
use tracing::debug;

/// Assumed tempo when the incoming track has no usable BPM
pub const FALLBACK_BPM: f64 = 128.0;

/// Tempo-sync request attached to a plan when both BPMs are usable
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BeatSync {
    /// Playback-rate multiplier for the incoming deck
    /// (outgoing BPM over the incoming file's BPM)
    pub rate_ratio: f64,
    pub outgoing_bpm: f64,
    pub incoming_bpm: f64,
}

/// A complete crossfade plan ready for arming
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossfadeConfig {
    /// Ramp length in seconds, already clamped to the configured bounds
    pub duration_seconds: f64,
    /// Volume ramp shape
    pub curve: FadeCurve,
    /// Normalized outgoing-deck position that triggers the ramp
    pub start_position: f64,
    /// Normalized incoming-deck position to start playback from, placed
    /// so the ramp lands on the incoming track's intro end
    pub fade_in_start: f64,
    /// Transition character the plan was built for
    pub transition_type: TransitionType,
    /// Crossfade length in beats before conversion to seconds
    pub beats: f64,
    /// Tempo-sync request, absent when sync is off or BPMs are unusable
    pub sync: Option<BeatSync>,
    /// Why the intelligent path was not taken, set on degraded plans only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl CrossfadeConfig {
    /// True when this is the degraded fixed ramp rather than a computed plan
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Turns analyses into crossfade plans
#[derive(Debug, Clone)]
pub struct CrossfadeCalculator {
    min_crossfade_seconds: f64,
    max_crossfade_seconds: f64,
    fallback_crossfade_seconds: f64,
    require_beat_sync: bool,
}

impl CrossfadeCalculator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            min_crossfade_seconds: config.min_crossfade_seconds,
            max_crossfade_seconds: config.max_crossfade_seconds,
            fallback_crossfade_seconds: config.fallback_crossfade_seconds,
            require_beat_sync: config.require_beat_sync,
        }
    }

    /// Compute the intelligent crossfade plan for one transition
    ///
    /// The incoming track's transition character picks the beats range;
    /// its energy gradient interpolates within it (steeper build, fewer
    /// beats, tighter crossfade). Beats convert to seconds at the
    /// incoming tempo and clamp to the configured duration bounds.
    pub fn calculate(
        &self,
        outgoing: &TrackInfo,
        outgoing_analysis: &TrackAnalysis,
        incoming: &TrackInfo,
        incoming_analysis: &TrackAnalysis,
    ) -> CrossfadeConfig {
        let transition_type = incoming_analysis.transition_type;
        let (min_beats, max_beats) = transition_type.beats_range();
        let gradient = incoming_analysis.energy_gradient.clamp(0.0, 1.0);
        let beats = max_beats - gradient * (max_beats - min_beats);

        let bpm = incoming.usable_bpm().unwrap_or(FALLBACK_BPM);
        let duration_seconds = (beats / bpm * 60.0)
            .clamp(self.min_crossfade_seconds, self.max_crossfade_seconds);

        let start_position = outgoing_analysis.outro_start.clamp(0.0, 1.0);
        let fade_in_start = if incoming.duration_seconds > 0.0 {
            let intro_end_seconds = incoming_analysis.intro_end * incoming.duration_seconds;
            (intro_end_seconds - duration_seconds).max(0.0) / incoming.duration_seconds
        } else {
            0.0
        };

        let sync = if self.require_beat_sync {
            match (outgoing.usable_bpm(), incoming.usable_bpm()) {
                (Some(out_bpm), Some(in_bpm)) => Some(BeatSync {
                    rate_ratio: out_bpm / in_bpm,
                    outgoing_bpm: out_bpm,
                    incoming_bpm: in_bpm,
                }),
                _ => None,
            }
        } else {
            None
        };

        let plan = CrossfadeConfig {
            duration_seconds,
            curve: transition_type.curve(),
            start_position,
            fade_in_start,
            transition_type,
            beats,
            sync,
            fallback_reason: None,
        };

        debug!(
            "Crossfade plan '{}' -> '{}': {} over {:.1} beats = {:.2}s on {}, start {:.3}, fade-in from {:.3}",
            outgoing.display_title(),
            incoming.display_title(),
            plan.transition_type,
            plan.beats,
            plan.duration_seconds,
            plan.curve,
            plan.start_position,
            plan.fade_in_start
        );

        plan
    }

    /// The fixed plan used when the intelligent path is unavailable
    ///
    /// A plain linear ramp of the configured fallback length, starting
    /// at the given outgoing position (the default outro ratio when no
    /// analysis exists). Carries no gradient information and requests
    /// no tempo sync; the reason travels with the plan so the executor
    /// can report why it was degraded.
    pub fn fixed_plan(&self, start_position: f64, reason: String) -> CrossfadeConfig {
        debug!(
            "Fixed {:.1}s linear plan at position {:.3}: {}",
            self.fallback_crossfade_seconds,
            start_position.clamp(0.0, 1.0),
            reason
        );
        CrossfadeConfig {
            duration_seconds: self.fallback_crossfade_seconds,
            curve: FadeCurve::Linear,
            start_position: start_position.clamp(0.0, 1.0),
            fade_in_start: 0.0,
            transition_type: TransitionType::Soft,
            beats: 0.0,
            sync: None,
            fallback_reason: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segue_common::types::CueSource;
    use uuid::Uuid;

    const EPSILON: f64 = 1e-9;

    fn track(duration: f64, bpm: Option<f64>) -> TrackInfo {
        let mut t = TrackInfo::new(Uuid::new_v4(), duration);
        t.bpm = bpm;
        t
    }

    fn analysis(
        track: &TrackInfo,
        intro_end: f64,
        outro_start: f64,
        gradient: f64,
        transition_type: TransitionType,
    ) -> TrackAnalysis {
        TrackAnalysis {
            track_id: track.id,
            intro_end,
            outro_start,
            energy_gradient: gradient,
            transition_type,
            intro_source: CueSource::Detected,
            outro_source: CueSource::Detected,
            segment_count: 400,
            analyzed_at: chrono::Utc::now(),
        }
    }

    fn default_calculator() -> CrossfadeCalculator {
        CrossfadeCalculator::new(&EngineConfig::default())
    }

    #[test]
    fn test_soft_zero_gradient_uses_max_beats() {
        let calc = default_calculator();
        let outgoing = track(300.0, Some(120.0));
        let incoming = track(300.0, Some(120.0));
        let out_a = analysis(&outgoing, 0.1, 0.9, 0.0, TransitionType::Soft);
        let in_a = analysis(&incoming, 0.1, 0.9, 0.0, TransitionType::Soft);

        let plan = calc.calculate(&outgoing, &out_a, &incoming, &in_a);
        assert!((plan.beats - 64.0).abs() < EPSILON);
        // 64 beats at 120 BPM is 32s, clamped to the 30s default maximum
        assert!((plan.duration_seconds - 30.0).abs() < EPSILON);
        assert_eq!(plan.curve, FadeCurve::EqualPower);
    }

    #[test]
    fn test_hard_full_gradient_uses_min_beats() {
        let calc = default_calculator();
        let outgoing = track(300.0, Some(120.0));
        let incoming = track(300.0, Some(120.0));
        let out_a = analysis(&outgoing, 0.1, 0.9, 1.0, TransitionType::Hard);
        let in_a = analysis(&incoming, 0.1, 0.9, 1.0, TransitionType::Hard);

        let plan = calc.calculate(&outgoing, &out_a, &incoming, &in_a);
        assert!((plan.beats - 2.0).abs() < EPSILON);
        // 2 beats at 120 BPM is 1s, exactly the default minimum
        assert!((plan.duration_seconds - 1.0).abs() < EPSILON);
        assert_eq!(plan.curve, FadeCurve::Linear);
    }

    #[test]
    fn test_medium_interpolates_beats() {
        let calc = default_calculator();
        let outgoing = track(300.0, Some(128.0));
        let incoming = track(300.0, Some(128.0));
        let out_a = analysis(&outgoing, 0.1, 0.9, 0.5, TransitionType::Medium);
        let in_a = analysis(&incoming, 0.1, 0.9, 0.5, TransitionType::Medium);

        let plan = calc.calculate(&outgoing, &out_a, &incoming, &in_a);
        // 16 - 0.5 * (16 - 8) = 12 beats
        assert!((plan.beats - 12.0).abs() < EPSILON);
        assert!((plan.duration_seconds - 12.0 / 128.0 * 60.0).abs() < EPSILON);
        assert_eq!(plan.curve, FadeCurve::SCurve);
    }

    #[test]
    fn test_duration_always_within_clamp() {
        let calc = default_calculator();
        for bpm in [20.0, 60.0, 120.0, 200.0, 999.0] {
            for gradient in [0.0, 0.25, 0.5, 1.0] {
                for tt in [
                    TransitionType::Hard,
                    TransitionType::Medium,
                    TransitionType::Soft,
                ] {
                    let outgoing = track(300.0, Some(bpm));
                    let incoming = track(300.0, Some(bpm));
                    let out_a = analysis(&outgoing, 0.1, 0.9, gradient, tt);
                    let in_a = analysis(&incoming, 0.1, 0.9, gradient, tt);
                    let plan = calc.calculate(&outgoing, &out_a, &incoming, &in_a);
                    assert!(
                        (1.0..=30.0).contains(&plan.duration_seconds),
                        "{} s out of bounds for bpm {} gradient {} {:?}",
                        plan.duration_seconds,
                        bpm,
                        gradient,
                        tt
                    );
                }
            }
        }
    }

    #[test]
    fn test_missing_bpm_substitutes_default_tempo() {
        let calc = default_calculator();
        let outgoing = track(300.0, None);
        let incoming = track(300.0, None);
        let out_a = analysis(&outgoing, 0.1, 0.9, 0.0, TransitionType::Medium);
        let in_a = analysis(&incoming, 0.1, 0.9, 0.0, TransitionType::Medium);

        let plan = calc.calculate(&outgoing, &out_a, &incoming, &in_a);
        // 16 beats at the 128 BPM substitute
        assert!((plan.duration_seconds - 16.0 / FALLBACK_BPM * 60.0).abs() < EPSILON);
        assert!(plan.sync.is_none());
    }

    #[test]
    fn test_start_position_is_outgoing_outro() {
        let calc = default_calculator();
        let outgoing = track(300.0, Some(120.0));
        let incoming = track(300.0, Some(120.0));
        let out_a = analysis(&outgoing, 0.1, 0.83, 0.0, TransitionType::Soft);
        let in_a = analysis(&incoming, 0.1, 0.95, 0.0, TransitionType::Soft);

        let plan = calc.calculate(&outgoing, &out_a, &incoming, &in_a);
        assert!((plan.start_position - 0.83).abs() < EPSILON);
    }

    #[test]
    fn test_fade_in_start_backs_off_duration() {
        let calc = default_calculator();
        let outgoing = track(300.0, Some(120.0));
        let incoming = track(200.0, Some(120.0));
        // Intro ends at 20% of 200s = 40s; a 30s ramp starts at 10s = 0.05
        let out_a = analysis(&outgoing, 0.1, 0.9, 0.0, TransitionType::Soft);
        let in_a = analysis(&incoming, 0.2, 0.9, 0.0, TransitionType::Soft);

        let plan = calc.calculate(&outgoing, &out_a, &incoming, &in_a);
        assert!((plan.duration_seconds - 30.0).abs() < EPSILON);
        assert!((plan.fade_in_start - 10.0 / 200.0).abs() < EPSILON);
    }

    #[test]
    fn test_fade_in_start_floors_at_zero() {
        let calc = default_calculator();
        let outgoing = track(300.0, Some(120.0));
        let incoming = track(200.0, Some(120.0));
        // Intro ends at 4% of 200s = 8s, shorter than the ramp
        let out_a = analysis(&outgoing, 0.1, 0.9, 0.0, TransitionType::Soft);
        let in_a = analysis(&incoming, 0.04, 0.9, 0.0, TransitionType::Soft);

        let plan = calc.calculate(&outgoing, &out_a, &incoming, &in_a);
        assert_eq!(plan.fade_in_start, 0.0);
    }

    #[test]
    fn test_zero_length_incoming_track() {
        let calc = default_calculator();
        let outgoing = track(300.0, Some(120.0));
        let incoming = track(0.0, Some(120.0));
        let out_a = analysis(&outgoing, 0.1, 0.9, 0.0, TransitionType::Soft);
        let in_a = analysis(&incoming, 0.15, 0.85, 0.0, TransitionType::Soft);

        let plan = calc.calculate(&outgoing, &out_a, &incoming, &in_a);
        assert_eq!(plan.fade_in_start, 0.0);
    }

    #[test]
    fn test_sync_rate_ratio_uses_file_bpms() {
        let calc = default_calculator();
        let outgoing = track(300.0, Some(126.0));
        let incoming = track(300.0, Some(120.0));
        let out_a = analysis(&outgoing, 0.1, 0.9, 0.0, TransitionType::Medium);
        let in_a = analysis(&incoming, 0.1, 0.9, 0.0, TransitionType::Medium);

        let plan = calc.calculate(&outgoing, &out_a, &incoming, &in_a);
        let sync = plan.sync.unwrap();
        assert!((sync.rate_ratio - 126.0 / 120.0).abs() < EPSILON);
        assert_eq!(sync.outgoing_bpm, 126.0);
        assert_eq!(sync.incoming_bpm, 120.0);
    }

    #[test]
    fn test_sync_disabled_by_config() {
        let config = EngineConfig {
            require_beat_sync: false,
            ..EngineConfig::default()
        };
        let calc = CrossfadeCalculator::new(&config);
        let outgoing = track(300.0, Some(126.0));
        let incoming = track(300.0, Some(120.0));
        let out_a = analysis(&outgoing, 0.1, 0.9, 0.0, TransitionType::Medium);
        let in_a = analysis(&incoming, 0.1, 0.9, 0.0, TransitionType::Medium);

        let plan = calc.calculate(&outgoing, &out_a, &incoming, &in_a);
        assert!(plan.sync.is_none());
    }

    #[test]
    fn test_calculator_is_deterministic() {
        let calc = default_calculator();
        let outgoing = track(287.0, Some(124.3));
        let incoming = track(199.5, Some(127.9));
        let out_a = analysis(&outgoing, 0.12, 0.87, 0.21, TransitionType::Medium);
        let in_a = analysis(&incoming, 0.09, 0.91, 0.17, TransitionType::Medium);

        let first = calc.calculate(&outgoing, &out_a, &incoming, &in_a);
        let second = calc.calculate(&outgoing, &out_a, &incoming, &in_a);
        assert_eq!(first, second);
    }

    #[test]
    fn test_fixed_plan_shape() {
        let calc = default_calculator();
        let plan = calc.fixed_plan(0.85, "missing BPM".to_string());
        assert_eq!(plan.duration_seconds, 3.0);
        assert_eq!(plan.curve, FadeCurve::Linear);
        assert_eq!(plan.start_position, 0.85);
        assert_eq!(plan.fade_in_start, 0.0);
        assert!(plan.sync.is_none());
        assert!(plan.is_fallback());
        assert_eq!(plan.fallback_reason.as_deref(), Some("missing BPM"));
    }

    #[test]
    fn test_computed_plan_is_not_fallback() {
        let calc = default_calculator();
        let outgoing = track(300.0, Some(120.0));
        let incoming = track(300.0, Some(120.0));
        let out_a = analysis(&outgoing, 0.1, 0.9, 0.2, TransitionType::Medium);
        let in_a = analysis(&incoming, 0.1, 0.9, 0.2, TransitionType::Medium);
        assert!(!calc.calculate(&outgoing, &out_a, &incoming, &in_a).is_fallback());
    }
}
