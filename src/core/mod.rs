//! Core types: players, coordinates, identifiers, actions, script state.

pub mod action;
pub mod coord;
pub mod extensions;
pub mod ids;
pub mod player;

pub use action::{Action, ActionRecord};
pub use coord::{Coord, Offset};
pub use extensions::ScriptStateBag;
pub use ids::{PieceKindId, ScriptName};
pub use player::PlayerId;
