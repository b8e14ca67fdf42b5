//! Pluggable rule units ("scripts").
//!
//! A script is a named unit of rule logic resolved once at load time and
//! consulted during play. The core engine never enumerates concrete move
//! types: whatever a set's pieces can do is whatever their declared scripts
//! allow. One trait covers movement rules, special moves, and script-backed
//! win/lose predicates.
//!
//! ## Contract
//!
//! Given the current game state and the context that triggered it, a script
//! returns one of:
//! - `Allow` - the action is acceptable as a plain move-and-capture
//! - `Deny(reason)` - this script does not permit the action
//! - `Transform(deltas)` - the action is acceptable, with these mutations
//!   applied instead of the default move (castling relocates two pieces
//!   atomically)

pub mod builtin;
pub mod decl;
pub mod registry;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::board::CellOccupant;
use crate::core::{Coord, PieceKindId, PlayerId, ScriptName};
use crate::game::GameState;

pub use decl::{parse_script_decl, ScriptDecl};
pub use registry::{ScriptFactory, ScriptLoader, ScriptRegistry};

/// Errors produced by the script registry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// A name referenced by a piece or condition has no loaded script.
    #[error("script {name} referenced by {referenced_by} is not in the registry")]
    NotFound { name: ScriptName, referenced_by: String },

    /// A declaration exists but cannot be turned into a rule unit.
    #[error("script {name} failed to load: {detail}")]
    LoadFailure { name: ScriptName, detail: String },
}

/// An atomic state mutation contributed by a `Transform` outcome.
///
/// Deltas are validated against the board before anything is applied, so a
/// transform either commits completely or rejects the action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delta {
    /// Relocate the piece at `from`, capturing whatever stands at `to`.
    MovePiece { from: Coord, to: Coord },

    /// Remove the piece at `at`.
    RemovePiece { at: Coord },

    /// Put a piece on `at`, replacing any occupant.
    PlacePiece {
        at: Coord,
        owner: PlayerId,
        kind: PieceKindId,
    },

    /// Persist a value in a script's extension-bag namespace.
    SetScriptValue {
        script: ScriptName,
        key: String,
        value: i64,
    },
}

/// Mutations contributed by one transform; two covers the common
/// castling-style pair without allocation.
pub type DeltaList = SmallVec<[Delta; 2]>;

/// Outcome of consulting a script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptOutcome {
    /// The action is acceptable as a plain move.
    Allow,

    /// This script does not permit the action.
    Deny(String),

    /// The action is acceptable with these mutations instead of the
    /// default move.
    Transform(DeltaList),
}

/// The proposed move a script is consulted about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveContext {
    /// The acting player.
    pub player: PlayerId,

    /// Origin square.
    pub from: Coord,

    /// Destination square.
    pub to: Coord,

    /// Kind of the moving piece.
    pub kind: PieceKindId,

    /// Occupant of the destination before the move.
    pub target: CellOccupant,
}

/// What triggered a script invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleContext {
    /// A proposed move of a piece whose kind declares this script.
    Move(MoveContext),

    /// A predicate probe on behalf of a script-backed condition.
    Probe(PlayerId),
}

/// A loadable unit of rule logic.
///
/// Implementations are stateless; anything a script persists across turns
/// goes through `Delta::SetScriptValue` into its own extension-bag
/// namespace, or is derived from the game's action history.
pub trait Script: Send + Sync {
    /// The name this script was registered under.
    fn name(&self) -> &ScriptName;

    /// Judge an action or probe against the current state.
    fn evaluate(&self, state: &GameState, ctx: &RuleContext) -> ScriptOutcome;

    /// Piece kinds referenced by this script's parameters, for catalog
    /// cross-checking at validation time.
    fn piece_kind_refs(&self) -> &[PieceKindId] {
        &[]
    }
}

impl std::fmt::Debug for dyn Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Script").field("name", &self.name()).finish()
    }
}
