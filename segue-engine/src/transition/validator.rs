//! Tempo and key compatibility checks
//!
//! The beat check gates the intelligent crossfade path; the key check
//! is advisory unless the caller opted into strict key matching. Both
//! degrade safely on missing metadata: no BPM fails the beat check (the
//! engine cannot sync what it cannot measure), while no key passes the
//! key check (missing data should not block a transition).

use crate::error::{Error, Result};
use segue_common::config::EngineConfig;
use segue_common::types::TrackInfo;
use serde::Serialize;
use tracing::debug;

/// Ratios below this are treated as half-time and doubled
const HALF_TIME_RATIO: f64 = 0.75;

/// Ratios above this are treated as double-time and halved
const DOUBLE_TIME_RATIO: f64 = 1.5;

/// Outcome of validating one outgoing/incoming pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    /// BPMs are present and within tolerance after normalization
    pub beat_match_possible: bool,
    /// Keys are identical, relative, or neighbors on the wheel
    /// (true when either key is unknown)
    pub key_compatible: bool,
    /// Whether the intelligent path may be used for this pair
    pub can_use_intelligent_crossfade: bool,
    /// Human-readable explanation when a check failed
    pub reason: Option<String>,
}

/// Pairwise transition validator
#[derive(Debug, Clone)]
pub struct TransitionValidator {
    max_bpm_difference_percent: f64,
    require_key_match: bool,
}

/// Fold half-time and double-time readings onto the base tempo
///
/// A 160 BPM drum & bass track against an 80 BPM hip-hop track is a
/// factor-two disagreement in notation, not in feel; one doubling or
/// halving is forgiven before measuring deviation.
pub fn normalized_bpm_ratio(outgoing_bpm: f64, incoming_bpm: f64) -> f64 {
    let ratio = incoming_bpm / outgoing_bpm;
    if ratio < HALF_TIME_RATIO {
        ratio * 2.0
    } else if ratio > DOUBLE_TIME_RATIO {
        ratio / 2.0
    } else {
        ratio
    }
}

impl TransitionValidator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_bpm_difference_percent: config.max_bpm_difference_percent,
            require_key_match: config.require_key_match,
        }
    }

    /// Check whether the pair supports an intelligent crossfade
    pub fn validate(&self, outgoing: &TrackInfo, incoming: &TrackInfo) -> ValidationResult {
        let mut reasons: Vec<String> = Vec::new();

        let beat_match_possible = match (outgoing.usable_bpm(), incoming.usable_bpm()) {
            (Some(out_bpm), Some(in_bpm)) => {
                let ratio = normalized_bpm_ratio(out_bpm, in_bpm);
                let deviation = (ratio - 1.0).abs() * 100.0;
                if deviation > self.max_bpm_difference_percent {
                    reasons.push(format!(
                        "BPM difference too large: {:.1}% apart (limit {:.1}%)",
                        deviation, self.max_bpm_difference_percent
                    ));
                    false
                } else {
                    true
                }
            }
            _ => {
                reasons.push("missing BPM".to_string());
                false
            }
        };

        let key_compatible = match (&outgoing.key, &incoming.key) {
            (Some(out_key), Some(in_key)) => {
                let compatible = out_key.is_compatible_with(in_key);
                if !compatible && self.require_key_match {
                    reasons.push(format!("incompatible keys: {} vs {}", out_key, in_key));
                }
                compatible
            }
            // Unknown key never blocks a transition
            _ => true,
        };

        let can_use_intelligent_crossfade =
            beat_match_possible && (key_compatible || !self.require_key_match);

        let result = ValidationResult {
            beat_match_possible,
            key_compatible,
            can_use_intelligent_crossfade,
            reason: if reasons.is_empty() {
                None
            } else {
                Some(reasons.join("; "))
            },
        };

        debug!(
            "Validated '{}' -> '{}': beat {}, key {}, intelligent {}{}",
            outgoing.display_title(),
            incoming.display_title(),
            result.beat_match_possible,
            result.key_compatible,
            result.can_use_intelligent_crossfade,
            result
                .reason
                .as_deref()
                .map(|r| format!(" ({})", r))
                .unwrap_or_default()
        );

        result
    }

    /// Strict form of [`validate`](Self::validate) for callers that want
    /// a typed error instead of a degradable verdict
    pub fn check(&self, outgoing: &TrackInfo, incoming: &TrackInfo) -> Result<()> {
        let out_bpm = outgoing
            .usable_bpm()
            .ok_or(Error::InvalidBpm(outgoing.bpm.unwrap_or(0.0)))?;
        let in_bpm = incoming
            .usable_bpm()
            .ok_or(Error::InvalidBpm(incoming.bpm.unwrap_or(0.0)))?;

        let deviation = (normalized_bpm_ratio(out_bpm, in_bpm) - 1.0).abs() * 100.0;
        if deviation > self.max_bpm_difference_percent {
            return Err(Error::IncompatibleTempo {
                deviation,
                max: self.max_bpm_difference_percent,
            });
        }
        Ok(())
    }
}
