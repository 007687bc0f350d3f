//! Crossfade runtime
//!
//! One `CrossfadeExecutor` owns the lifecycle of a single deck pair's
//! transition: armed with a plan, triggered by outgoing-deck position,
//! ramped on a timer tick, and finished by stopping the outgoing deck.
//!
//! The executor is deliberately clock-free. `tick` and the trigger
//! path take the current `Instant` from the caller, so the engine's
//! timer task and the tests drive the same code.

pub mod deck;
pub mod ramp;

pub use deck::{DeckControl, NullDeck};
pub use ramp::{volume_pair, VolumePair};

use crate::error::{Error, Result};
use crate::transition::CrossfadeConfig;
use segue_common::events::EngineEvent;
use segue_common::fade_curves::FadeCurve;
use segue_common::types::DeckPair;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Minimum spacing between progress events while a ramp runs
const PROGRESS_EVENT_INTERVAL: Duration = Duration::from_millis(200);

/// Externally visible executor lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    /// No transition armed for this pair
    Idle,
    /// Plan accepted, waiting for the outgoing deck to reach the trigger
    Armed,
    /// Intelligent ramp in progress
    Running,
    /// Fixed linear ramp in progress after the intelligent path was abandoned
    Fallback,
    /// Ramp finished; the pair can be armed again
    Done,
}

impl ExecutorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutorState::Idle => "idle",
            ExecutorState::Armed => "armed",
            ExecutorState::Running => "running",
            ExecutorState::Fallback => "fallback",
            ExecutorState::Done => "done",
        }
    }
}

impl fmt::Display for ExecutorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trigger predicate for an armed plan.
///
/// Level-triggered on purpose: a position report at or past the start
/// point fires even when the exact crossing was never observed, so a
/// coarse or jittery position feed cannot skip the transition.
pub fn should_start(plan: &CrossfadeConfig, position: f64) -> bool {
    position >= plan.start_position
}

/// Ramp bookkeeping while a crossfade is in progress
struct ActiveRamp {
    duration: Duration,
    curve: FadeCurve,
    started_at: Instant,
    sync_engaged: bool,
    is_fallback: bool,
    last_progress_emit: Instant,
}

enum Phase {
    Idle,
    Armed { plan: CrossfadeConfig },
    Running(ActiveRamp),
    Done,
}

/// State machine driving one deck pair's crossfade
pub struct CrossfadeExecutor {
    pair: DeckPair,
    decks: Arc<dyn DeckControl>,
    event_tx: broadcast::Sender<EngineEvent>,
    fallback_duration: Duration,
    phase: Phase,
}

impl CrossfadeExecutor {
    pub fn new(
        pair: DeckPair,
        decks: Arc<dyn DeckControl>,
        event_tx: broadcast::Sender<EngineEvent>,
        fallback_duration: Duration,
    ) -> Self {
        Self {
            pair,
            decks,
            event_tx,
            fallback_duration,
            phase: Phase::Idle,
        }
    }

    pub fn pair(&self) -> DeckPair {
        self.pair
    }

    pub fn state(&self) -> ExecutorState {
        match &self.phase {
            Phase::Idle => ExecutorState::Idle,
            Phase::Armed { .. } => ExecutorState::Armed,
            Phase::Running(ramp) if ramp.is_fallback => ExecutorState::Fallback,
            Phase::Running(_) => ExecutorState::Running,
            Phase::Done => ExecutorState::Done,
        }
    }

    /// True while a transition is armed or ramping
    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Armed { .. } | Phase::Running(_))
    }

    /// Arm a crossfade plan.
    ///
    /// Fails fast when this pair already has a transition armed or
    /// running; the caller must cancel first. A plan carrying a
    /// fallback reason arms the degraded fixed ramp and announces why.
    pub fn arm(&mut self, plan: CrossfadeConfig) -> Result<()> {
        self.ensure_armable("arm")?;
        match &plan.fallback_reason {
            Some(reason) => {
                warn!(
                    "Deck {}: intelligent crossfade unavailable ({}), armed fixed {:.1}s linear ramp",
                    self.pair, reason, plan.duration_seconds
                );
                self.emit(EngineEvent::FallbackEngaged {
                    deck_pair: self.pair,
                    reason: reason.clone(),
                    timestamp: chrono::Utc::now(),
                });
            }
            None => {
                info!(
                    "Deck {}: armed {} crossfade, {:.2}s {} ramp at position {:.3}",
                    self.pair,
                    plan.transition_type,
                    plan.duration_seconds,
                    plan.curve,
                    plan.start_position
                );
            }
        }
        self.emit_armed(&plan);
        self.phase = Phase::Armed { plan };
        Ok(())
    }

    /// Feed an outgoing-deck position report; starts the ramp when the
    /// armed plan's trigger is reached. Ignored in every other state.
    pub fn on_position_update(&mut self, position: f64, now: Instant) {
        let fire = matches!(&self.phase, Phase::Armed { plan } if should_start(plan, position));
        if !fire {
            return;
        }
        if let Phase::Armed { plan } = std::mem::replace(&mut self.phase, Phase::Idle) {
            self.begin_ramp(plan, now);
        }
    }

    /// Advance the ramp. No-op unless a ramp is running.
    pub fn tick(&mut self, now: Instant) {
        let (progress, curve, emit_progress) = match &mut self.phase {
            Phase::Running(ramp) => {
                let elapsed = now.saturating_duration_since(ramp.started_at);
                let progress = if ramp.duration.is_zero() {
                    1.0
                } else {
                    (elapsed.as_secs_f64() / ramp.duration.as_secs_f64()).min(1.0)
                };
                let emit = progress < 1.0
                    && now.saturating_duration_since(ramp.last_progress_emit)
                        >= PROGRESS_EVENT_INTERVAL;
                if emit {
                    ramp.last_progress_emit = now;
                }
                (progress, ramp.curve, emit)
            }
            _ => return,
        };

        self.decks.set_volumes(self.pair, volume_pair(curve, progress));

        if progress >= 1.0 {
            self.finish();
        } else if emit_progress {
            self.emit(EngineEvent::CrossfadeProgress {
                deck_pair: self.pair,
                progress,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    /// Cancel whatever is armed or running and return to idle.
    ///
    /// Volumes stay wherever the last tick left them; the caller
    /// decides what the decks should do next.
    pub fn cancel(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Armed { .. } => {
                info!("Deck {}: armed crossfade cancelled", self.pair);
                self.emit_cancelled();
            }
            Phase::Running(ramp) => {
                if ramp.sync_engaged {
                    self.release_sync();
                }
                info!("Deck {}: running crossfade cancelled", self.pair);
                self.emit_cancelled();
            }
            _ => {
                debug!("Deck {}: cancel with no crossfade active", self.pair);
            }
        }
    }

    /// Abandon the intelligent path after a runtime error.
    ///
    /// A running ramp restarts as the fixed linear fallback; an armed
    /// plan is rewritten so the fallback ramp runs when it triggers.
    /// Ignored when nothing is active.
    pub fn fail_over(&mut self, reason: String, now: Instant) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Armed { mut plan } => {
                warn!(
                    "Deck {}: {} while armed, downgrading to fixed ramp",
                    self.pair, reason
                );
                plan.duration_seconds = self.fallback_duration.as_secs_f64();
                plan.curve = FadeCurve::Linear;
                plan.sync = None;
                self.emit(EngineEvent::FallbackEngaged {
                    deck_pair: self.pair,
                    reason: reason.clone(),
                    timestamp: chrono::Utc::now(),
                });
                plan.fallback_reason = Some(reason);
                self.phase = Phase::Armed { plan };
            }
            Phase::Running(ramp) => {
                if ramp.sync_engaged {
                    self.release_sync();
                }
                warn!(
                    "Deck {}: {} mid-ramp, switching to fixed {:.1}s linear ramp",
                    self.pair,
                    reason,
                    self.fallback_duration.as_secs_f64()
                );
                self.emit(EngineEvent::FallbackEngaged {
                    deck_pair: self.pair,
                    reason,
                    timestamp: chrono::Utc::now(),
                });
                self.phase = Phase::Running(ActiveRamp {
                    duration: self.fallback_duration,
                    curve: FadeCurve::Linear,
                    started_at: now,
                    sync_engaged: false,
                    is_fallback: true,
                    last_progress_emit: now,
                });
            }
            other => {
                self.phase = other;
                debug!("Deck {}: fail_over ignored, nothing active", self.pair);
            }
        }
    }

    fn begin_ramp(&mut self, plan: CrossfadeConfig, now: Instant) {
        let is_fallback = plan.is_fallback();
        self.decks.start_deck(self.pair.incoming, plan.fade_in_start);

        let sync_engaged = match (&plan.sync, is_fallback) {
            (Some(sync), false) => {
                self.decks.set_rate_ratio(self.pair.incoming, sync.rate_ratio);
                self.decks.set_phase_lock(self.pair, true);
                debug!(
                    "Deck {}: beat sync engaged, rate ratio {:.4} ({:.1} -> {:.1} BPM)",
                    self.pair, sync.rate_ratio, sync.incoming_bpm, sync.outgoing_bpm
                );
                true
            }
            _ => false,
        };

        self.decks
            .set_volumes(self.pair, volume_pair(plan.curve, 0.0));

        info!(
            "Deck {}: crossfade started, {:.2}s {} ramp{}",
            self.pair,
            plan.duration_seconds,
            plan.curve,
            if sync_engaged { " (beat-synced)" } else { "" }
        );
        self.emit(EngineEvent::CrossfadeStarted {
            deck_pair: self.pair,
            duration_seconds: plan.duration_seconds,
            curve: plan.curve,
            beat_synced: sync_engaged,
            timestamp: chrono::Utc::now(),
        });

        self.phase = Phase::Running(ActiveRamp {
            duration: Duration::from_secs_f64(plan.duration_seconds.max(0.0)),
            curve: plan.curve,
            started_at: now,
            sync_engaged,
            is_fallback,
            last_progress_emit: now,
        });
    }

    fn finish(&mut self) {
        if let Phase::Running(ramp) = std::mem::replace(&mut self.phase, Phase::Done) {
            if ramp.sync_engaged {
                self.release_sync();
            }
            self.decks.stop_deck(self.pair.outgoing);
            info!("Deck {}: crossfade complete, outgoing deck stopped", self.pair);
            self.emit(EngineEvent::CrossfadeCompleted {
                deck_pair: self.pair,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    fn release_sync(&self) {
        self.decks.set_rate_ratio(self.pair.incoming, 1.0);
        self.decks.set_phase_lock(self.pair, false);
    }

    fn ensure_armable(&self, operation: &str) -> Result<()> {
        match self.phase {
            Phase::Idle | Phase::Done => Ok(()),
            _ => Err(Error::InvalidState {
                operation: operation.to_string(),
                state: self.state().to_string(),
            }),
        }
    }

    fn emit_armed(&self, plan: &CrossfadeConfig) {
        self.emit(EngineEvent::CrossfadeArmed {
            deck_pair: self.pair,
            start_position: plan.start_position,
            duration_seconds: plan.duration_seconds,
            curve: plan.curve,
            transition_type: plan.transition_type,
            timestamp: chrono::Utc::now(),
        });
    }

    fn emit_cancelled(&self) {
        self.emit(EngineEvent::CrossfadeCancelled {
            deck_pair: self.pair,
            timestamp: chrono::Utc::now(),
        });
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }
}
