//! Win and lose conditions.
//!
//! A condition is a named predicate over the game state, evaluated after
//! every applied action. Conditions are loaded per category (win, lose) in
//! declaration order, and that order is the tie-break: the first condition
//! to reach a decision ends the game. Lose conditions are always evaluated
//! before win conditions, so losing the king is detected before taking one.

pub mod builtin;
pub mod loader;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{PieceKindId, PlayerId, ScriptName};
use crate::game::GameState;

pub use loader::{ConditionDecl, ConditionFactory, ConditionLoader};

/// Which file a condition was declared in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionCategory {
    Win,
    Lose,
}

impl std::fmt::Display for ConditionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionCategory::Win => f.write_str("win"),
            ConditionCategory::Lose => f.write_str("lose"),
        }
    }
}

/// How a decided game ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    /// A single winner.
    Winner(PlayerId),

    /// A single loser; remaining players outlive the game.
    Loser(PlayerId),

    /// Nobody wins.
    Draw,
}

/// Result of evaluating one condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionVerdict {
    /// The condition has no opinion; play continues.
    NoDecision,

    /// The game is over.
    Decided(GameOutcome),
}

/// Errors produced by the condition loader.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConditionError {
    /// A declaration line cannot be turned into a condition.
    #[error("condition {decl:?} failed to load: {detail}")]
    LoadFailure { decl: String, detail: String },
}

/// A named predicate over the game state.
pub trait Condition: Send + Sync {
    /// The declaration line this condition was built from.
    fn name(&self) -> &str;

    /// Decide whether the game has ended.
    fn evaluate(&self, state: &GameState) -> ConditionVerdict;

    /// Scripts this condition delegates to, for registry cross-checking at
    /// validation time.
    fn script_refs(&self) -> &[ScriptName] {
        &[]
    }

    /// Piece kinds this condition inspects, for catalog cross-checking at
    /// validation time.
    fn piece_kind_refs(&self) -> &[PieceKindId] {
        &[]
    }
}

impl std::fmt::Debug for dyn Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Condition").field("name", &self.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_serialization() {
        let verdict = ConditionVerdict::Decided(GameOutcome::Loser(PlayerId::new(2)));
        let json = serde_json::to_string(&verdict).unwrap();
        let back: ConditionVerdict = serde_json::from_str(&json).unwrap();
        assert_eq!(verdict, back);
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ConditionCategory::Win.to_string(), "win");
        assert_eq!(ConditionCategory::Lose.to_string(), "lose");
    }
}
