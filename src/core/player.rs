//! Player identification.
//!
//! Players are numbered, not named: the board format encodes the owner of a
//! piece as the digits in its cell token (`p2_rook` -> player 2). Owner `0`
//! is reserved for non-player pieces such as walls or decorations.

use serde::{Deserialize, Serialize};

/// Player identifier.
///
/// Owner numbers come straight from the board descriptor: `p<digits>_<name>`.
/// `PlayerId::NEUTRAL` (0) marks an environmental piece that no competing
/// player controls; real players are `1..=255`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// The reserved non-player owner.
    pub const NEUTRAL: PlayerId = PlayerId(0);

    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw owner number.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Whether this is the reserved non-player owner.
    #[must_use]
    pub const fn is_neutral(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_neutral() {
            write!(f, "neutral")
        } else {
            write!(f, "player {}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_owner() {
        assert!(PlayerId::NEUTRAL.is_neutral());
        assert!(!PlayerId::new(1).is_neutral());
        assert_eq!(PlayerId::new(0), PlayerId::NEUTRAL);
    }

    #[test]
    fn test_display() {
        assert_eq!(PlayerId::new(2).to_string(), "player 2");
        assert_eq!(PlayerId::NEUTRAL.to_string(), "neutral");
    }
}
