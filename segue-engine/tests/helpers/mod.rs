//! Shared helpers for segue-engine integration tests
//!
//! Provides synthetic sample sources with known energy structure, track
//! metadata builders, and a deck control double that records every
//! set-point the executor issues.

#![allow(dead_code)]

use segue_common::types::{DeckId, TrackInfo};
use segue_engine::analysis::SampleSource;
use segue_engine::executor::{DeckControl, VolumePair};
use segue_engine::Result;
use std::sync::Mutex;
use uuid::Uuid;

/// Low rate keeps synthetic tracks small while the default 0.5s
/// segment length still yields plenty of segments
pub const TEST_SAMPLE_RATE: u32 = 1000;

const BLOCK_SAMPLES: usize = 4096;

/// Plays a piecewise-constant amplitude envelope as mono samples.
///
/// Constant-valued segments make the expected RMS equal to the
/// amplitude, so boundary positions can be computed by hand.
pub struct EnvelopeSource {
    samples: Vec<f32>,
    position: usize,
}

impl EnvelopeSource {
    /// Build from (seconds, amplitude) steps
    pub fn new(steps: &[(f64, f32)]) -> Self {
        let mut samples = Vec::new();
        for &(seconds, amplitude) in steps {
            let count = (seconds * f64::from(TEST_SAMPLE_RATE)).round() as usize;
            samples.extend(std::iter::repeat(amplitude).take(count));
        }
        Self {
            samples,
            position: 0,
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / f64::from(TEST_SAMPLE_RATE)
    }
}

impl SampleSource for EnvelopeSource {
    fn sample_rate(&self) -> u32 {
        TEST_SAMPLE_RATE
    }

    fn channels(&self) -> usize {
        1
    }

    fn next_block(&mut self) -> Result<Option<Vec<f32>>> {
        if self.position >= self.samples.len() {
            return Ok(None);
        }
        let end = (self.position + BLOCK_SAMPLES).min(self.samples.len());
        let block = self.samples[self.position..end].to_vec();
        self.position = end;
        Ok(Some(block))
    }
}

/// The reference shaped track: 57s total, quiet intro, a short lift,
/// loud body, quiet tail.
///
/// At the default 0.5s segment length this is 114 segments
/// (10 at 0.1, 4 at 0.4, 80 at 1.0, 20 at 0.2), so detection finds
/// intro_end = 14/114 and outro_start = 94/114.
pub fn shaped_steps() -> Vec<(f64, f32)> {
    vec![(5.0, 0.1), (2.0, 0.4), (40.0, 1.0), (10.0, 0.2)]
}

pub const SHAPED_DURATION_SECONDS: f64 = 57.0;
pub const SHAPED_INTRO_END: f64 = 14.0 / 114.0;
pub const SHAPED_OUTRO_START: f64 = 94.0 / 114.0;

/// Track metadata matching the shaped reference source
pub fn shaped_track(bpm: Option<f64>) -> TrackInfo {
    let mut track = TrackInfo::new(Uuid::new_v4(), SHAPED_DURATION_SECONDS);
    track.bpm = bpm;
    track
}

/// One recorded executor set-point
#[derive(Debug, Clone, PartialEq)]
pub enum DeckCommand {
    Volumes { outgoing: f32, incoming: f32 },
    Start { deck: DeckId, position: f64 },
    Stop { deck: DeckId },
    Rate { deck: DeckId, ratio: f64 },
    PhaseLock { enabled: bool },
}

/// Deck control double recording every command in order
#[derive(Default)]
pub struct RecordingDeck {
    commands: Mutex<Vec<DeckCommand>>,
}

impl RecordingDeck {
    pub fn commands(&self) -> Vec<DeckCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn volume_commands(&self) -> Vec<(f32, f32)> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                DeckCommand::Volumes { outgoing, incoming } => Some((outgoing, incoming)),
                _ => None,
            })
            .collect()
    }

    pub fn stopped_decks(&self) -> Vec<DeckId> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                DeckCommand::Stop { deck } => Some(deck),
                _ => None,
            })
            .collect()
    }
}

impl DeckControl for RecordingDeck {
    fn set_volumes(&self, _pair: segue_common::types::DeckPair, volumes: VolumePair) {
        self.commands.lock().unwrap().push(DeckCommand::Volumes {
            outgoing: volumes.outgoing,
            incoming: volumes.incoming,
        });
    }

    fn start_deck(&self, deck: DeckId, position: f64) {
        self.commands
            .lock()
            .unwrap()
            .push(DeckCommand::Start { deck, position });
    }

    fn stop_deck(&self, deck: DeckId) {
        self.commands.lock().unwrap().push(DeckCommand::Stop { deck });
    }

    fn set_rate_ratio(&self, deck: DeckId, ratio: f64) {
        self.commands
            .lock()
            .unwrap()
            .push(DeckCommand::Rate { deck, ratio });
    }

    fn set_phase_lock(&self, _pair: segue_common::types::DeckPair, enabled: bool) {
        self.commands
            .lock()
            .unwrap()
            .push(DeckCommand::PhaseLock { enabled });
    }
}
