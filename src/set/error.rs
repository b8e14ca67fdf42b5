//! Set-level errors and the validation stage they occurred in.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::BoardError;
use crate::conditions::ConditionError;
use crate::core::{Coord, PieceKindId};
use crate::pieces::PieceError;
use crate::scripts::ScriptError;

/// The fixed validation stages, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    SetRoot,
    Pieces,
    PieceScripts,
    Board,
    WinConditions,
    LoseConditions,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::SetRoot => "set root",
            Stage::Pieces => "pieces",
            Stage::PieceScripts => "piece scripts",
            Stage::Board => "board",
            Stage::WinConditions => "win conditions",
            Stage::LoseConditions => "lose conditions",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a set error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Malformed text structure.
    Format,
    /// A name that does not resolve.
    Reference,
    /// The same name defined twice.
    Duplicate,
    /// A unit is present but fails to initialize.
    Load,
    /// A required file or directory is absent.
    Missing,
    /// The underlying read failed.
    Io,
}

/// Any failure while loading or cross-checking a set.
#[derive(Debug, Error)]
pub enum SetError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Piece(#[from] PieceError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Condition(#[from] ConditionError),

    /// A board cell names a kind the catalog does not define.
    #[error("unknown piece kind {kind} at board cell {at}")]
    UnknownPieceKind { at: Coord, kind: PieceKindId },

    /// A script parameter or condition names a kind the catalog does not
    /// define.
    #[error("unknown piece kind {kind} referenced by {referenced_by}")]
    UnknownKindRef { kind: PieceKindId, referenced_by: String },

    /// The set directory itself is absent.
    #[error("set directory {path:?} not found")]
    SetNotFound { path: PathBuf },

    /// A required file or directory inside the set is absent.
    #[error("set has no {what} at {path:?}")]
    MissingEntry { what: &'static str, path: PathBuf },

    /// Reading a set file failed.
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SetError {
    /// Classify this error into the coarse taxonomy.
    #[must_use]
    pub fn classification(&self) -> ErrorClass {
        match self {
            SetError::Board(_) => ErrorClass::Format,
            SetError::Piece(PieceError::DuplicatePieceName { .. }) => ErrorClass::Duplicate,
            SetError::Piece(PieceError::EmptyCatalog) => ErrorClass::Missing,
            SetError::Piece(_) => ErrorClass::Format,
            SetError::Script(ScriptError::NotFound { .. }) => ErrorClass::Reference,
            SetError::Script(ScriptError::LoadFailure { .. }) => ErrorClass::Load,
            SetError::Condition(_) => ErrorClass::Load,
            SetError::UnknownPieceKind { .. } | SetError::UnknownKindRef { .. } => {
                ErrorClass::Reference
            }
            SetError::SetNotFound { .. } | SetError::MissingEntry { .. } => ErrorClass::Missing,
            SetError::Io { .. } => ErrorClass::Io,
        }
    }
}

/// A set failure tagged with the stage that produced it.
///
/// Validation is fail-fast: the first stage to fail is the one reported, and
/// no partially constructed `Set` escapes.
#[derive(Debug, Error)]
#[error("set validation failed at the {stage} stage: {source}")]
pub struct ValidationError {
    pub stage: Stage,
    #[source]
    pub source: SetError,
}

impl ValidationError {
    pub(crate) fn new(stage: Stage, source: impl Into<SetError>) -> Self {
        Self { stage, source: source.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let err = SetError::Board(BoardError::EmptyBoard);
        assert_eq!(err.classification(), ErrorClass::Format);

        let err = SetError::Piece(PieceError::DuplicatePieceName {
            name: PieceKindId::new("king"),
        });
        assert_eq!(err.classification(), ErrorClass::Duplicate);

        let err = SetError::UnknownPieceKind {
            at: Coord::new(0, 0),
            kind: PieceKindId::new("ghost"),
        };
        assert_eq!(err.classification(), ErrorClass::Reference);
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new(Stage::Board, BoardError::EmptyBoard);
        let text = err.to_string();
        assert!(text.contains("board stage"), "unexpected display: {text}");
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::PieceScripts.to_string(), "piece scripts");
        assert_eq!(Stage::LoseConditions.to_string(), "lose conditions");
    }
}
