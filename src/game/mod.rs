//! Game state assembly and play.
//!
//! A validated `Set` is the immutable template; `new_game` stamps out a
//! mutable `GameState` from it. The set may be shared by any number of
//! games, each exclusively owned by its own driver.

pub mod state;

use std::sync::Arc;

use crate::set::Set;

pub use state::{AppliedResult, GameOver, GameState, Rejection};

/// Start a fresh game over a validated set.
#[must_use]
pub fn new_game(set: Arc<Set>) -> GameState {
    GameState::new(set)
}
