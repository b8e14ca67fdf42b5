//! The validated set: board + catalog + scripts + conditions.
//!
//! A `Set` is only ever produced by the validator, so holding one is proof
//! that every cross-reference resolved. It is immutable after construction
//! and may be shared (`Arc<Set>`) by any number of concurrently running
//! games.

pub mod error;
pub mod source;
pub mod validator;

use std::sync::Arc;

use crate::board::Board;
use crate::conditions::Condition;
use crate::pieces::PieceCatalog;
use crate::scripts::ScriptRegistry;

pub use error::{ErrorClass, SetError, Stage, ValidationError};
pub use source::SetSource;
pub use validator::{load_and_validate, validate, validate_with};

/// A complete, validated bundle defining one playable variant.
pub struct Set {
    name: String,
    board: Board,
    pieces: PieceCatalog,
    scripts: ScriptRegistry,
    win_conditions: Vec<Arc<dyn Condition>>,
    lose_conditions: Vec<Arc<dyn Condition>>,
}

impl Set {
    pub(crate) fn new(
        name: String,
        board: Board,
        pieces: PieceCatalog,
        scripts: ScriptRegistry,
        win_conditions: Vec<Arc<dyn Condition>>,
        lose_conditions: Vec<Arc<dyn Condition>>,
    ) -> Self {
        Self {
            name,
            board,
            pieces,
            scripts,
            win_conditions,
            lose_conditions,
        }
    }

    /// The set's name (directory-derived).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The initial board layout.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The piece catalog.
    #[must_use]
    pub fn pieces(&self) -> &PieceCatalog {
        &self.pieces
    }

    /// The script registry.
    #[must_use]
    pub fn scripts(&self) -> &ScriptRegistry {
        &self.scripts
    }

    /// Win conditions in declaration order.
    #[must_use]
    pub fn win_conditions(&self) -> &[Arc<dyn Condition>] {
        &self.win_conditions
    }

    /// Lose conditions in declaration order.
    #[must_use]
    pub fn lose_conditions(&self) -> &[Arc<dyn Condition>] {
        &self.lose_conditions
    }
}

impl std::fmt::Debug for Set {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Set")
            .field("name", &self.name)
            .field("board", &format_args!("{}x{}", self.board.rows(), self.board.columns()))
            .field("pieces", &self.pieces.len())
            .field("scripts", &self.scripts.len())
            .field("win_conditions", &self.win_conditions.len())
            .field("lose_conditions", &self.lose_conditions.len())
            .finish()
    }
}
