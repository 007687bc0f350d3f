//! # Segue Common Library
//!
//! Shared code for the segue crossfade engine including:
//! - Track and deck identity types
//! - Musical key representation (Camelot wheel)
//! - Event types (EngineEvent enum)
//! - Configuration loading
//! - Fade curve definitions and calculations

pub mod config;
pub mod error;
pub mod events;
pub mod fade_curves;
pub mod key;
pub mod types;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use fade_curves::FadeCurve;
pub use key::{CamelotKey, KeyMode};
pub use types::{CuePoints, CueSource, DeckId, DeckPair, TrackAnalysis, TrackInfo, TransitionType};
