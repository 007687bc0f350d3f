//! # Segue Crossfade Engine (segue-engine)
//!
//! Intelligent auto-crossfade engine for dual-deck playback.
//!
//! **Purpose:** Profile track energy, detect intro/outro boundaries,
//! classify how a transition should feel, validate tempo and key
//! compatibility, and drive the resulting volume ramp between two decks.
//!
//! **Architecture:** Pure analysis/planning functions wrapped by an async
//! facade; the executor emits volume and rate set-points consumed by the
//! caller's real-time audio layer.

pub mod analysis;
pub mod cache;
pub mod engine;
pub mod error;
pub mod executor;
pub mod transition;

pub use cache::AnalysisCache;
pub use engine::SegueEngine;
pub use error::{Error, Result};
