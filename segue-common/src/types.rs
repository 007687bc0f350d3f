//! Core domain types shared across the engine
//!
//! Track metadata is supplied by the caller (the engine never reads tags
//! or estimates tempo itself); analysis results are produced by the
//! engine and cached per track.

use crate::fade_curves::FadeCurve;
use crate::key::CamelotKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one of the two playback decks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeckId {
    A,
    B,
}

impl std::fmt::Display for DeckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeckId::A => write!(f, "A"),
            DeckId::B => write!(f, "B"),
        }
    }
}

/// An ordered outgoing/incoming deck pairing for one transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeckPair {
    /// Deck currently playing, to be faded out
    pub outgoing: DeckId,
    /// Deck holding the next track, to be faded in
    pub incoming: DeckId,
}

impl DeckPair {
    pub fn new(outgoing: DeckId, incoming: DeckId) -> Self {
        Self { outgoing, incoming }
    }

    /// True when the two pairings use any deck in common
    pub fn shares_deck_with(&self, other: &DeckPair) -> bool {
        self.outgoing == other.outgoing
            || self.outgoing == other.incoming
            || self.incoming == other.outgoing
            || self.incoming == other.incoming
    }
}

impl std::fmt::Display for DeckPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.outgoing, self.incoming)
    }
}

/// Manual cue positions set by the user, normalized to [0, 1]
///
/// Manual cues always win over detected boundaries. The engine reads
/// them when assembling an analysis result and never writes them back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CuePoints {
    /// Where the intro ends, if the user marked it
    pub intro_end: Option<f64>,
    /// Where the outro begins, if the user marked it
    pub outro_start: Option<f64>,
}

impl CuePoints {
    pub fn is_empty(&self) -> bool {
        self.intro_end.is_none() && self.outro_start.is_none()
    }
}

/// Where a boundary value in a [`TrackAnalysis`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueSource {
    /// User-set cue point, takes precedence over detection
    Manual,
    /// Energy-profile boundary detection
    Detected,
    /// Fallback ratio used when no analysis was available
    Default,
}

/// Caller-supplied metadata for one track
///
/// `bpm` and `key` come from the caller's own analysis or tag data;
/// `None` (or a non-positive BPM) means unknown and degrades the
/// matching checks rather than failing them outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Stable identity, used as the analysis cache key
    pub id: Uuid,
    /// Display title for logs and events
    pub title: Option<String>,
    /// Total playable length in seconds
    pub duration_seconds: f64,
    /// Tempo in beats per minute, if known
    pub bpm: Option<f64>,
    /// Musical key on the 24-position wheel, if known
    pub key: Option<CamelotKey>,
    /// Manual cue overrides
    #[serde(default)]
    pub cues: CuePoints,
}

impl TrackInfo {
    pub fn new(id: Uuid, duration_seconds: f64) -> Self {
        Self {
            id,
            title: None,
            duration_seconds,
            bpm: None,
            key: None,
            cues: CuePoints::default(),
        }
    }

    /// BPM usable for tempo math (present and positive)
    pub fn usable_bpm(&self) -> Option<f64> {
        self.bpm.filter(|b| *b > 0.0)
    }

    /// Title for logging, falling back to the id
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(t) => t.clone(),
            None => self.id.to_string(),
        }
    }
}

/// Transition character derived from the energy gradient after the intro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionType {
    /// Abrupt energy jump; tight cut over a couple of beats
    Hard,
    /// Moderate build; medium-length blend
    Medium,
    /// Gradual build; long smooth blend
    Soft,
}

impl TransitionType {
    /// Crossfade length range in beats for this transition character
    ///
    /// The calculator interpolates within the range: a steeper gradient
    /// moves toward the minimum. Matches are exhaustive so adding a
    /// variant forces every table to be revisited.
    pub fn beats_range(&self) -> (f64, f64) {
        match self {
            TransitionType::Hard => (2.0, 4.0),
            TransitionType::Medium => (8.0, 16.0),
            TransitionType::Soft => (32.0, 64.0),
        }
    }

    /// Curve shape used for this transition character
    pub fn curve(&self) -> FadeCurve {
        match self {
            TransitionType::Hard => FadeCurve::Linear,
            TransitionType::Medium => FadeCurve::SCurve,
            TransitionType::Soft => FadeCurve::EqualPower,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TransitionType::Hard => "Hard",
            TransitionType::Medium => "Medium",
            TransitionType::Soft => "Soft",
        }
    }
}

impl std::fmt::Display for TransitionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Result of analyzing one track's energy profile
///
/// Positions are normalized to [0, 1] of track length so they survive
/// sample-rate and duration changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackAnalysis {
    /// Track this analysis belongs to
    pub track_id: Uuid,
    /// Normalized position where the intro ends
    pub intro_end: f64,
    /// Normalized position where the outro begins
    pub outro_start: f64,
    /// Normalized energy slope right after the intro, in [0, 1]
    pub energy_gradient: f64,
    /// Transition character classified from the gradient
    pub transition_type: TransitionType,
    /// Provenance of `intro_end`
    pub intro_source: CueSource,
    /// Provenance of `outro_start`
    pub outro_source: CueSource,
    /// Number of energy segments the profile held
    pub segment_count: usize,
    /// When the analysis completed
    pub analyzed_at: DateTime<Utc>,
}

impl TrackAnalysis {
    /// Placeholder analysis from the configured default ratios, used
    /// when no profile is available for a track
    pub fn from_default_ratios(track_id: Uuid, intro_ratio: f64, outro_ratio: f64) -> Self {
        Self {
            track_id,
            intro_end: intro_ratio.clamp(0.0, 1.0),
            outro_start: outro_ratio.clamp(0.0, 1.0),
            energy_gradient: 0.0,
            transition_type: TransitionType::Soft,
            intro_source: CueSource::Default,
            outro_source: CueSource::Default,
            segment_count: 0,
            analyzed_at: Utc::now(),
        }
    }
}
