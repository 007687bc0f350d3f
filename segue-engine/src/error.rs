//! Error types for segue-engine
//!
//! Defines engine-specific error types using thiserror for clear error
//! propagation. Failures that reach the executor never halt playback;
//! they degrade to the fixed linear fallback ramp with the error text
//! as the recorded reason.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for segue-engine
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// No cached analysis exists for the track
    #[error("No analysis available for track {0}")]
    AnalysisUnavailable(Uuid),

    /// Analysis could not be computed from the supplied samples
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Track metadata carried a BPM the engine cannot use
    #[error("Invalid BPM: {0}")]
    InvalidBpm(f64),

    /// Tempo deviation exceeds the configured tolerance
    #[error("Tempo deviation {deviation:.1}% exceeds maximum {max:.1}%")]
    IncompatibleTempo { deviation: f64, max: f64 },

    /// Operation not valid in the executor's current state
    #[error("Invalid state for {operation}: executor is {state}")]
    InvalidState { operation: String, state: String },

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<segue_common::Error> for Error {
    fn from(err: segue_common::Error) -> Self {
        match err {
            segue_common::Error::Config(msg) => Error::Config(msg),
            segue_common::Error::Io(e) => Error::Io(e),
            other => Error::Internal(other.to_string()),
        }
    }
}

/// Convenience Result type using segue-engine Error
pub type Result<T> = std::result::Result<T, Error>;
