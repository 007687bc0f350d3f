//! Engine facade
//!
//! `SegueEngine` wires the analysis worker, cache, validator,
//! calculator, and per-pair executors behind one handle. It owns the
//! event bus and the timer tasks that drive running ramps; callers
//! bring their own decoding (via [`SampleSource`]) and their own audio
//! chain (via [`DeckControl`]).
//!
//! The engine is cheap to clone; clones share the cache, the worker,
//! and the executor slots.

use crate::analysis::{AnalysisHandle, AnalysisWorker, SampleSource};
use crate::cache::AnalysisCache;
use crate::error::{Error, Result};
use crate::executor::{CrossfadeExecutor, DeckControl, ExecutorState};
use crate::transition::{
    CrossfadeCalculator, CrossfadeConfig, TransitionValidator, ValidationResult,
};
use segue_common::config::EngineConfig;
use segue_common::events::EngineEvent;
use segue_common::types::{DeckPair, TrackAnalysis, TrackInfo};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

/// Broadcast capacity; slow subscribers miss old events past this depth
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Facade over the whole crossfade engine
///
/// Must be created inside a Tokio runtime: construction spawns the
/// analysis worker, and arming spawns the per-pair tick task.
#[derive(Clone)]
pub struct SegueEngine {
    config: EngineConfig,
    cache: AnalysisCache,
    analysis: AnalysisHandle,
    validator: TransitionValidator,
    calculator: CrossfadeCalculator,
    decks: Arc<dyn DeckControl>,
    executors: Arc<Mutex<HashMap<DeckPair, Arc<Mutex<CrossfadeExecutor>>>>>,
    event_tx: broadcast::Sender<EngineEvent>,
}

impl SegueEngine {
    pub fn new(config: EngineConfig, decks: Arc<dyn DeckControl>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let cache = AnalysisCache::default();
        let analysis = AnalysisWorker::spawn(cache.clone(), event_tx.clone(), config.segment_seconds);
        let validator = TransitionValidator::new(&config);
        let calculator = CrossfadeCalculator::new(&config);

        info!(
            "Segue engine ready (intelligent crossfade {}, beat sync {})",
            if config.enable_intelligent_crossfade {
                "enabled"
            } else {
                "disabled"
            },
            if config.require_beat_sync { "on" } else { "off" }
        );

        Self {
            config,
            cache,
            analysis,
            validator,
            calculator,
            decks,
            executors: Arc::new(Mutex::new(HashMap::new())),
            event_tx,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Subscribe to the engine event bus
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Analyze a track's samples, or return the cached result.
    ///
    /// Queues on the single analysis lane; the returned future resolves
    /// when this track's analysis lands in the cache.
    pub async fn request_analysis(
        &self,
        track: TrackInfo,
        source: Box<dyn SampleSource>,
    ) -> Result<Arc<TrackAnalysis>> {
        if let Some(cached) = self.cache.get(track.id).await {
            debug!("Analysis cache hit for '{}'", track.display_title());
            return Ok(cached);
        }
        self.analysis.request(track, source).await
    }

    /// Fetch a cached analysis without queueing any work
    pub async fn analysis_for(&self, track_id: Uuid) -> Result<Arc<TrackAnalysis>> {
        self.cache
            .get(track_id)
            .await
            .ok_or(Error::AnalysisUnavailable(track_id))
    }

    /// Drop a cached analysis, e.g. after the track's cues changed.
    ///
    /// Returns whether an entry existed.
    pub async fn invalidate_analysis(&self, track_id: Uuid) -> bool {
        self.cache.remove(track_id).await
    }

    /// Check whether a pair supports the intelligent crossfade path
    pub fn validate(&self, outgoing: &TrackInfo, incoming: &TrackInfo) -> ValidationResult {
        self.validator.validate(outgoing, incoming)
    }

    /// Build the crossfade plan for a transition.
    ///
    /// Always yields a usable plan. Tracks without a cached analysis
    /// get the configured default boundaries; when the intelligent path
    /// is disabled or validation rules it out, the result is the fixed
    /// linear plan with the reason attached.
    pub async fn compute_crossfade(
        &self,
        outgoing: &TrackInfo,
        incoming: &TrackInfo,
    ) -> CrossfadeConfig {
        let outgoing_analysis = self.analysis_or_default(outgoing).await;

        if !self.config.enable_intelligent_crossfade {
            return self.calculator.fixed_plan(
                outgoing_analysis.outro_start,
                "intelligent crossfade disabled".to_string(),
            );
        }

        let validation = self.validator.validate(outgoing, incoming);
        if !validation.can_use_intelligent_crossfade {
            let reason = validation
                .reason
                .unwrap_or_else(|| "transition validation failed".to_string());
            return self
                .calculator
                .fixed_plan(outgoing_analysis.outro_start, reason);
        }

        let incoming_analysis = self.analysis_or_default(incoming).await;
        self.calculator
            .calculate(outgoing, &outgoing_analysis, incoming, &incoming_analysis)
    }

    /// Arm a plan on a deck pair.
    ///
    /// Fails fast when the pair, or any pair sharing one of its decks,
    /// already has a transition armed or running.
    pub async fn arm(&self, pair: DeckPair, plan: CrossfadeConfig) -> Result<()> {
        let mut executors = self.executors.lock().await;

        for (other, slot) in executors.iter() {
            if *other != pair && other.shares_deck_with(&pair) && slot.lock().await.is_active() {
                return Err(Error::InvalidState {
                    operation: "arm".to_string(),
                    state: format!("busy with {}", other),
                });
            }
        }

        let slot = executors
            .entry(pair)
            .or_insert_with(|| {
                let executor = Arc::new(Mutex::new(CrossfadeExecutor::new(
                    pair,
                    self.decks.clone(),
                    self.event_tx.clone(),
                    self.config.fallback_duration(),
                )));
                Self::spawn_ticker(&executor, self.config.tick_interval());
                executor
            })
            .clone();

        let result = slot.lock().await.arm(plan);
        result
    }

    /// Cancel whatever is armed or running on a pair
    pub async fn cancel(&self, pair: DeckPair) {
        if let Some(slot) = self.find_slot(pair).await {
            slot.lock().await.cancel();
        } else {
            debug!("Cancel for {} with no executor slot", pair);
        }
    }

    /// Feed an outgoing-deck position report for a pair.
    ///
    /// Positions are normalized to [0, 1]; an armed plan fires when the
    /// position reaches its start. Reports for idle pairs are dropped.
    pub async fn on_position_update(&self, pair: DeckPair, position: f64) {
        if let Some(slot) = self.find_slot(pair).await {
            slot.lock().await.on_position_update(position, Instant::now());
        }
    }

    /// Report a runtime failure on a pair's transition.
    ///
    /// An armed or running intelligent crossfade degrades to the fixed
    /// linear ramp rather than halting playback.
    pub async fn report_runtime_error(&self, pair: DeckPair, reason: String) {
        if let Some(slot) = self.find_slot(pair).await {
            slot.lock().await.fail_over(reason, Instant::now());
        }
    }

    /// Current executor state for a pair (`Idle` when never armed)
    pub async fn executor_state(&self, pair: DeckPair) -> ExecutorState {
        match self.find_slot(pair).await {
            Some(slot) => slot.lock().await.state(),
            None => ExecutorState::Idle,
        }
    }

    async fn find_slot(&self, pair: DeckPair) -> Option<Arc<Mutex<CrossfadeExecutor>>> {
        self.executors.lock().await.get(&pair).cloned()
    }

    async fn analysis_or_default(&self, track: &TrackInfo) -> TrackAnalysis {
        match self.cache.get(track.id).await {
            Some(analysis) => (*analysis).clone(),
            None => {
                debug!(
                    "No analysis for '{}', using default boundaries",
                    track.display_title()
                );
                TrackAnalysis::from_default_ratios(
                    track.id,
                    self.config.default_intro_ratio,
                    self.config.default_outro_ratio,
                )
            }
        }
    }

    /// Tick task for one executor slot.
    ///
    /// Runs for the life of the slot and exits when the engine (and
    /// every clone) is gone. Ticks outside a running ramp are no-ops.
    fn spawn_ticker(executor: &Arc<Mutex<CrossfadeExecutor>>, interval: Duration) {
        let weak = Arc::downgrade(executor);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match weak.upgrade() {
                    Some(slot) => slot.lock().await.tick(Instant::now()),
                    None => break,
                }
            }
        });
    }
}
