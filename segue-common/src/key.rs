//! Musical key representation on the 24-position harmonic wheel
//!
//! Keys are stored as a numeric slot (1-12) plus a mode letter, the
//! notation DJ software commonly displays as "8A" (minor) or "8B"
//! (major). Compatibility follows the standard mixing rules: same
//! position, relative major/minor swap, or one step around the wheel
//! in the same mode.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Mode half of a wheel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    /// Minor keys (the "A" ring)
    Minor,
    /// Major keys (the "B" ring)
    Major,
}

impl KeyMode {
    /// Notation letter for this mode
    pub fn letter(&self) -> char {
        match self {
            KeyMode::Minor => 'A',
            KeyMode::Major => 'B',
        }
    }
}

/// One of the 24 wheel positions (12 slots × 2 modes)
///
/// Tracks with no key metadata, or key text that fails to parse, carry
/// no `CamelotKey` at all; the validator treats that as "unknown" and
/// reports the pair as compatible rather than blocking a transition on
/// missing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CamelotKey {
    /// Wheel slot, 1 through 12
    pub slot: u8,
    /// Minor ("A") or major ("B") ring
    pub mode: KeyMode,
}

impl CamelotKey {
    /// Build a key, validating the slot range
    pub fn new(slot: u8, mode: KeyMode) -> Result<Self> {
        if !(1..=12).contains(&slot) {
            return Err(Error::InvalidKey(format!("slot {} out of range 1-12", slot)));
        }
        Ok(Self { slot, mode })
    }

    /// Parse wheel notation like "8A" or "12b"
    ///
    /// Returns an error for anything that is not a 1-12 slot followed by
    /// an A/B mode letter. Callers that want the "unknown key" behavior
    /// map the error to `None`.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.len() < 2 {
            return Err(Error::InvalidKey(trimmed.to_string()));
        }
        let (digits, letter) = trimmed.split_at(trimmed.len() - 1);
        let mode = match letter.chars().next() {
            Some('a') | Some('A') => KeyMode::Minor,
            Some('b') | Some('B') => KeyMode::Major,
            _ => return Err(Error::InvalidKey(trimmed.to_string())),
        };
        let slot: u8 = digits
            .parse()
            .map_err(|_| Error::InvalidKey(trimmed.to_string()))?;
        Self::new(slot, mode)
    }

    /// Whether two keys mix harmonically
    ///
    /// Compatible combinations:
    /// - identical position
    /// - same slot, other mode (relative major/minor)
    /// - adjacent slot (±1, wrapping 12↔1), same mode
    pub fn is_compatible_with(&self, other: &CamelotKey) -> bool {
        if self.slot == other.slot {
            // Identical or relative major/minor swap
            return true;
        }
        if self.mode != other.mode {
            return false;
        }
        self.slot_distance(other) == 1
    }

    /// Steps between two slots around the 12-position ring
    fn slot_distance(&self, other: &CamelotKey) -> u8 {
        let a = i16::from(self.slot);
        let b = i16::from(other.slot);
        let diff = (a - b).rem_euclid(12);
        diff.min(12 - diff) as u8
    }
}

impl std::fmt::Display for CamelotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.slot, self.mode.letter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let key = CamelotKey::parse("8A").unwrap();
        assert_eq!(key.slot, 8);
        assert_eq!(key.mode, KeyMode::Minor);

        let key = CamelotKey::parse("12b").unwrap();
        assert_eq!(key.slot, 12);
        assert_eq!(key.mode, KeyMode::Major);

        let key = CamelotKey::parse(" 1B ").unwrap();
        assert_eq!(key.slot, 1);
        assert_eq!(key.mode, KeyMode::Major);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(CamelotKey::parse("").is_err());
        assert!(CamelotKey::parse("A").is_err());
        assert!(CamelotKey::parse("0A").is_err());
        assert!(CamelotKey::parse("13B").is_err());
        assert!(CamelotKey::parse("8C").is_err());
        assert!(CamelotKey::parse("Am").is_err());
    }

    #[test]
    fn test_identical_compatible() {
        let a = CamelotKey::parse("8A").unwrap();
        assert!(a.is_compatible_with(&a));
    }

    #[test]
    fn test_mode_swap_compatible() {
        let minor = CamelotKey::parse("8A").unwrap();
        let major = CamelotKey::parse("8B").unwrap();
        assert!(minor.is_compatible_with(&major));
        assert!(major.is_compatible_with(&minor));
    }

    #[test]
    fn test_adjacent_same_mode_compatible() {
        let a = CamelotKey::parse("8A").unwrap();
        let b = CamelotKey::parse("9A").unwrap();
        let c = CamelotKey::parse("7A").unwrap();
        assert!(a.is_compatible_with(&b));
        assert!(a.is_compatible_with(&c));
    }

    #[test]
    fn test_wheel_wraps() {
        let twelve = CamelotKey::parse("12A").unwrap();
        let one = CamelotKey::parse("1A").unwrap();
        assert!(twelve.is_compatible_with(&one));
        assert!(one.is_compatible_with(&twelve));
    }

    #[test]
    fn test_adjacent_cross_mode_incompatible() {
        let a = CamelotKey::parse("8A").unwrap();
        let b = CamelotKey::parse("9B").unwrap();
        assert!(!a.is_compatible_with(&b));
    }

    #[test]
    fn test_distant_incompatible() {
        let a = CamelotKey::parse("8A").unwrap();
        let b = CamelotKey::parse("3A").unwrap();
        assert!(!a.is_compatible_with(&b));
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["1A", "8A", "8B", "12B"] {
            let key = CamelotKey::parse(s).unwrap();
            assert_eq!(key.to_string(), s);
            assert_eq!(CamelotKey::parse(&key.to_string()).unwrap(), key);
        }
    }
}
