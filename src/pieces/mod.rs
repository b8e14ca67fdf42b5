//! Piece catalog: static per-kind metadata.
//!
//! Each piece kind is defined by one record file; the catalog maps kind
//! names to their shared `PieceDefinition`. Instances on the board carry
//! only `(owner, kind)` and borrow everything else from the catalog.

pub mod catalog;
pub mod definition;
pub mod record;

use thiserror::Error;

use crate::core::PieceKindId;

pub use catalog::PieceCatalog;
pub use definition::{PieceDefinition, PieceIcon};
pub use record::{parse_piece_record, serialize_piece_record};

/// Errors produced by the piece record parser and catalog loader.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PieceError {
    /// A record did not split into glyph|icon[|scripts].
    #[error("malformed record for piece {kind}: expected 2 or 3 fields, found {fields}")]
    MalformedRecord { kind: PieceKindId, fields: usize },

    /// The display field is not exactly one character.
    #[error("invalid glyph {glyph:?} for piece {kind}: expected exactly one character")]
    InvalidGlyph { kind: PieceKindId, glyph: String },

    /// The sprite field does not decode to a non-zero 64-bit value.
    #[error("invalid icon encoding {value:?} for piece {kind}: expected a non-zero 64-bit hex literal")]
    InvalidIconEncoding { kind: PieceKindId, value: String },

    /// A script name in the third field is empty.
    #[error("empty script reference in record for piece {kind}")]
    EmptyScriptRef { kind: PieceKindId },

    /// Two records define the same kind name.
    #[error("duplicate piece name {name}")]
    DuplicatePieceName { name: PieceKindId },

    /// The set defines no pieces at all.
    #[error("piece catalog is empty")]
    EmptyCatalog,
}
