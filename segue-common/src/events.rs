//! Event types for the segue event system

use crate::fade_curves::FadeCurve;
use crate::types::{DeckPair, TrackAnalysis, TransitionType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Engine event types
///
/// Broadcast to every subscriber; consumers that only care about a
/// subset match on the variants they want and drop the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineEvent {
    /// Analysis accepted and queued for the background worker
    AnalysisStarted {
        track_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Analysis finished and entered the cache
    AnalysisCompleted {
        track_id: Uuid,
        analysis: TrackAnalysis,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Analysis failed; the track falls back to default boundaries
    AnalysisFailed {
        track_id: Uuid,
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A crossfade plan was armed and is waiting for its trigger position
    CrossfadeArmed {
        deck_pair: DeckPair,
        start_position: f64,
        duration_seconds: f64,
        curve: FadeCurve,
        transition_type: TransitionType,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The outgoing deck reached the trigger position; ramp is running
    CrossfadeStarted {
        deck_pair: DeckPair,
        duration_seconds: f64,
        curve: FadeCurve,
        beat_synced: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Periodic ramp progress (throttled, not every tick)
    CrossfadeProgress {
        deck_pair: DeckPair,
        progress: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Ramp ran to completion; outgoing deck was stopped
    CrossfadeCompleted {
        deck_pair: DeckPair,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A running or armed crossfade was cancelled by the caller
    CrossfadeCancelled {
        deck_pair: DeckPair,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The intelligent plan was abandoned for the fixed linear ramp
    FallbackEngaged {
        deck_pair: DeckPair,
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl EngineEvent {
    /// Event name for logging and filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::AnalysisStarted { .. } => "AnalysisStarted",
            EngineEvent::AnalysisCompleted { .. } => "AnalysisCompleted",
            EngineEvent::AnalysisFailed { .. } => "AnalysisFailed",
            EngineEvent::CrossfadeArmed { .. } => "CrossfadeArmed",
            EngineEvent::CrossfadeStarted { .. } => "CrossfadeStarted",
            EngineEvent::CrossfadeProgress { .. } => "CrossfadeProgress",
            EngineEvent::CrossfadeCompleted { .. } => "CrossfadeCompleted",
            EngineEvent::CrossfadeCancelled { .. } => "CrossfadeCancelled",
            EngineEvent::FallbackEngaged { .. } => "FallbackEngaged",
        }
    }
}
