//! Background analysis worker
//!
//! Analysis is CPU work over a whole track's samples, so it runs off
//! the caller's task: requests queue on an mpsc channel and a single
//! worker processes them one at a time in arrival order. Results land
//! in the shared cache and are announced on the event bus.

use crate::analysis::boundaries::detect_boundaries;
use crate::analysis::gradient::{classify_gradient, energy_gradient};
use crate::analysis::profiler::EnergyProfiler;
use crate::cache::AnalysisCache;
use crate::error::{Error, Result};
use segue_common::events::EngineEvent;
use segue_common::types::{CueSource, TrackAnalysis, TrackInfo};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info};

/// Queue depth before `request` applies backpressure
const REQUEST_QUEUE_DEPTH: usize = 32;

/// Decoded-sample seam between the caller's decoder and the profiler
///
/// The engine never decodes audio itself; callers wrap whatever decode
/// pipeline they have in this trait. Blocks are interleaved `f32`
/// samples and may be any length, including lengths that split frames.
pub trait SampleSource: Send {
    fn sample_rate(&self) -> u32;
    fn channels(&self) -> usize;
    /// Next block of samples, or `None` at end of stream
    fn next_block(&mut self) -> Result<Option<Vec<f32>>>;
}

/// One queued analysis job
pub struct AnalysisRequest {
    pub track: TrackInfo,
    pub source: Box<dyn SampleSource>,
    pub reply: oneshot::Sender<Result<Arc<TrackAnalysis>>>,
}

/// Run the full analysis pipeline over one sample stream
///
/// Profile, boundary detection, gradient classification, then manual
/// cue application: a user-set cue replaces the detected value for that
/// boundary and is marked [`CueSource::Manual`]. Detection never writes
/// back to the track's cues.
pub fn analyze_stream(
    track: &TrackInfo,
    mut source: Box<dyn SampleSource>,
    segment_seconds: f64,
) -> Result<TrackAnalysis> {
    let mut profiler = EnergyProfiler::new(source.sample_rate(), source.channels(), segment_seconds)?;
    while let Some(block) = source.next_block()? {
        profiler.push_block(&block);
    }
    let profile = profiler.finish();

    let bounds = detect_boundaries(&profile);
    let (intro_end, intro_source) = match track.cues.intro_end {
        Some(cue) => (cue.clamp(0.0, 1.0), CueSource::Manual),
        None => (bounds.intro_end, CueSource::Detected),
    };
    let (outro_start, outro_source) = match track.cues.outro_start {
        Some(cue) => (cue.clamp(0.0, 1.0), CueSource::Manual),
        None => (bounds.outro_start, CueSource::Detected),
    };

    let gradient = energy_gradient(&profile, intro_end);
    let transition_type = classify_gradient(gradient);

    debug!(
        "Analyzed '{}': intro_end {:.3} ({:?}), outro_start {:.3} ({:?}), gradient {:.4} -> {}",
        track.display_title(),
        intro_end,
        intro_source,
        outro_start,
        outro_source,
        gradient,
        transition_type
    );

    Ok(TrackAnalysis {
        track_id: track.id,
        intro_end,
        outro_start,
        energy_gradient: gradient,
        transition_type,
        intro_source,
        outro_source,
        segment_count: profile.len(),
        analyzed_at: chrono::Utc::now(),
    })
}

/// Cloneable submission handle for the worker
#[derive(Clone)]
pub struct AnalysisHandle {
    tx: mpsc::Sender<AnalysisRequest>,
}

impl AnalysisHandle {
    /// Queue a track for analysis and wait for the result
    pub async fn request(
        &self,
        track: TrackInfo,
        source: Box<dyn SampleSource>,
    ) -> Result<Arc<TrackAnalysis>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(AnalysisRequest {
                track,
                source,
                reply: reply_tx,
            })
            .await
            .map_err(|_| Error::Internal("analysis worker is gone".into()))?;
        reply_rx
            .await
            .map_err(|_| Error::Internal("analysis worker dropped the request".into()))?
    }
}

/// Single-lane analysis worker
pub struct AnalysisWorker;

impl AnalysisWorker {
    /// Spawn the worker task
    ///
    /// The task exits when every [`AnalysisHandle`] has been dropped.
    pub fn spawn(
        cache: AnalysisCache,
        event_tx: broadcast::Sender<EngineEvent>,
        segment_seconds: f64,
    ) -> AnalysisHandle {
        let (tx, mut rx) = mpsc::channel::<AnalysisRequest>(REQUEST_QUEUE_DEPTH);

        tokio::spawn(async move {
            info!("Analysis worker started");
            while let Some(request) = rx.recv().await {
                Self::process(&cache, &event_tx, segment_seconds, request).await;
            }
            info!("Analysis worker stopped");
        });

        AnalysisHandle { tx }
    }

    async fn process(
        cache: &AnalysisCache,
        event_tx: &broadcast::Sender<EngineEvent>,
        segment_seconds: f64,
        request: AnalysisRequest,
    ) {
        let AnalysisRequest {
            track,
            source,
            reply,
        } = request;
        let track_id = track.id;
        let title = track.display_title();

        let _ = event_tx.send(EngineEvent::AnalysisStarted {
            track_id,
            timestamp: chrono::Utc::now(),
        });

        // The pipeline is pure CPU; keep it off the async threads
        let worker_track = track.clone();
        let result = tokio::task::spawn_blocking(move || {
            analyze_stream(&worker_track, source, segment_seconds)
        })
        .await
        .unwrap_or_else(|e| Err(Error::Analysis(format!("analysis task panicked: {}", e))));

        match result {
            Ok(analysis) => {
                let entry = cache.insert(analysis).await;
                info!(
                    "Analysis complete for '{}': intro {:.3}, outro {:.3}, {} transition",
                    title, entry.intro_end, entry.outro_start, entry.transition_type
                );
                let _ = event_tx.send(EngineEvent::AnalysisCompleted {
                    track_id,
                    analysis: (*entry).clone(),
                    timestamp: chrono::Utc::now(),
                });
                let _ = reply.send(Ok(entry));
            }
            Err(e) => {
                error!("Analysis failed for '{}': {}", title, e);
                let _ = event_tx.send(EngineEvent::AnalysisFailed {
                    track_id,
                    reason: e.to_string(),
                    timestamp: chrono::Utc::now(),
                });
                let _ = reply.send(Err(e));
            }
        }
    }
}
