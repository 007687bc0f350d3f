//! Deck control seam
//!
//! The executor never touches audio hardware. It emits set-points
//! through this trait and the embedding player applies them to its
//! own output chain. Implementations must tolerate being called from
//! the runtime tick task.

use super::ramp::VolumePair;
use segue_common::types::{DeckId, DeckPair};
use tracing::trace;

/// Receiver for executor set-points
pub trait DeckControl: Send + Sync {
    /// Apply the target volumes for both decks of a pair
    fn set_volumes(&self, pair: DeckPair, volumes: VolumePair);

    /// Begin playback on a deck at a normalized track position
    fn start_deck(&self, deck: DeckId, position: f64);

    /// Stop and release a deck
    fn stop_deck(&self, deck: DeckId);

    /// Request a playback-rate ratio on a deck (1.0 restores native rate)
    fn set_rate_ratio(&self, deck: DeckId, ratio: f64);

    /// Toggle continuous phase alignment between the decks of a pair
    fn set_phase_lock(&self, pair: DeckPair, enabled: bool);
}

/// Deck control that discards every set-point.
///
/// Useful when planning transitions without an audio chain attached,
/// and as a stand-in for benchmarks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDeck;

impl DeckControl for NullDeck {
    fn set_volumes(&self, pair: DeckPair, volumes: VolumePair) {
        trace!(
            "deck {}: volumes out={:.3} in={:.3}",
            pair,
            volumes.outgoing,
            volumes.incoming
        );
    }

    fn start_deck(&self, deck: DeckId, position: f64) {
        trace!("deck {}: start at {:.3}", deck, position);
    }

    fn stop_deck(&self, deck: DeckId) {
        trace!("deck {}: stop", deck);
    }

    fn set_rate_ratio(&self, deck: DeckId, ratio: f64) {
        trace!("deck {}: rate ratio {:.4}", deck, ratio);
    }

    fn set_phase_lock(&self, pair: DeckPair, enabled: bool) {
        trace!("deck {}: phase lock {}", pair, enabled);
    }
}
