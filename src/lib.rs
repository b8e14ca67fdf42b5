//! # rust-bge
//!
//! A modular rule engine for chess-like board games.
//!
//! ## Design Principles
//!
//! 1. **Set-Agnostic**: No hardcoded piece kinds, move geometry, or win
//!    conditions. A "set" (board, piece records, scripts, conditions) is
//!    declarative data loaded and validated at startup; the classic chess
//!    rules ship as one conforming set among many.
//!
//! 2. **Late Binding By Name**: Pieces and conditions declare the rule
//!    units they depend on by name. The validator resolves every name once
//!    at load time; a dangling reference is a load error, never a runtime
//!    surprise.
//!
//! 3. **Fail-Fast Validation**: Loaders run in a fixed order (pieces ->
//!    piece scripts -> board -> win -> lose) and the first invalid stage
//!    aborts with that stage attached. A partially built set is never
//!    exposed.
//!
//! ## Architecture
//!
//! - **Immutable Set, Mutable Games**: a validated `Set` is read-only and
//!   shareable across concurrently running games; each `GameState` is a
//!   private mutable copy driven by a single play loop.
//!
//! - **Atomic Actions**: an action either commits completely, including all
//!   script side effects, or is rejected with an attributable reason and no
//!   state change.
//!
//! ## Modules
//!
//! - `core`: players, coordinates, identifiers, actions, script state
//! - `board`: the cell grid and its descriptor parser
//! - `pieces`: piece records and the per-set catalog
//! - `scripts`: pluggable rule units and their registry
//! - `conditions`: win/lose predicates and their loader
//! - `set`: the validated aggregate and the staged validator
//! - `game`: game state assembly and action application

pub mod board;
pub mod conditions;
pub mod core;
pub mod game;
pub mod pieces;
pub mod scripts;
pub mod set;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionRecord, Coord, Offset, PieceKindId, PlayerId, ScriptName, ScriptStateBag,
};

pub use crate::board::{parse_board, Board, BoardError, CellOccupant};

pub use crate::pieces::{
    parse_piece_record, serialize_piece_record, PieceCatalog, PieceDefinition, PieceError,
    PieceIcon,
};

pub use crate::scripts::{
    Delta, DeltaList, MoveContext, RuleContext, Script, ScriptDecl, ScriptError, ScriptFactory,
    ScriptLoader, ScriptOutcome, ScriptRegistry,
};

pub use crate::conditions::{
    Condition, ConditionCategory, ConditionError, ConditionFactory, ConditionLoader,
    ConditionVerdict, GameOutcome,
};

pub use crate::set::{
    load_and_validate, validate, validate_with, ErrorClass, Set, SetError, SetSource, Stage,
    ValidationError,
};

pub use crate::game::{new_game, AppliedResult, GameOver, GameState, Rejection};
