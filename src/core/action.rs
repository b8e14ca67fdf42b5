//! Gameplay actions and the per-game history they leave behind.
//!
//! An action is a proposed relocation of one piece. Whether it is legal, and
//! whether it drags side effects along (castling moves two pieces), is
//! decided by the scripts attached to the moving piece, not by this type.

use serde::{Deserialize, Serialize};

use super::coord::Coord;
use super::ids::PieceKindId;
use super::player::PlayerId;

/// A proposed move of the piece at `from` to `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub from: Coord,
    pub to: Coord,
}

impl Action {
    /// Create a new action.
    #[must_use]
    pub const fn new(from: Coord, to: Coord) -> Self {
        Self { from, to }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// An applied action with enough metadata for replay and for rule units
/// that reason about the past (castling rights, en-passant eligibility).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who acted.
    pub player: PlayerId,

    /// Origin square.
    pub from: Coord,

    /// Destination square.
    pub to: Coord,

    /// Kind of the piece that moved.
    pub kind: PieceKindId,

    /// Kind that stood on the destination before the move, if any.
    pub captured: Option<PieceKindId>,

    /// Turn number at which the action was applied.
    pub turn: u32,
}
