//! Track energy analysis
//!
//! The pipeline runs in three stages: [`profiler`] reduces decoded
//! samples to a per-segment RMS profile, [`boundaries`] finds where the
//! intro ends and the outro begins, and [`gradient`] classifies how
//! abruptly the track builds after its intro. [`worker`] runs the whole
//! pipeline off the caller's thread and fills the analysis cache.

pub mod boundaries;
pub mod gradient;
pub mod profile;
pub mod profiler;
pub mod worker;

pub use boundaries::{detect_boundaries, detect_intro_end, detect_outro_start, TrackBoundaries};
pub use gradient::{classify_gradient, energy_gradient};
pub use profile::EnergyProfile;
pub use profiler::EnergyProfiler;
pub use worker::{AnalysisHandle, AnalysisRequest, AnalysisWorker, SampleSource};
