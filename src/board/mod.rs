//! Board model: a rectangular grid of cell occupants.
//!
//! A `Board` is produced by the descriptor parser and owned by the set as the
//! game's initial layout. Each game mutates its own copy; the set's board is
//! never touched after validation.

pub mod parser;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{Coord, PieceKindId, PlayerId};
use crate::pieces::PieceCatalog;

pub use parser::parse_board;

/// What occupies a single cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellOccupant {
    /// Nothing on this cell.
    Empty,

    /// A piece, decomposed from its fused `p<owner>_<kind>` board token.
    Occupied { owner: PlayerId, kind: PieceKindId },
}

impl CellOccupant {
    /// Whether the cell is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, CellOccupant::Empty)
    }

    /// The occupant's owner, if any.
    #[must_use]
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            CellOccupant::Empty => None,
            CellOccupant::Occupied { owner, .. } => Some(*owner),
        }
    }

    /// The occupant's piece kind, if any.
    #[must_use]
    pub fn kind(&self) -> Option<&PieceKindId> {
        match self {
            CellOccupant::Empty => None,
            CellOccupant::Occupied { kind, .. } => Some(kind),
        }
    }
}

/// Errors produced by the board descriptor parser.
///
/// Referential validity of the piece kinds on the board is deliberately not
/// checked here; that cross-check belongs to the set validator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    /// The `rows|columns|layout` split did not yield exactly three fields.
    #[error("malformed board descriptor: expected rows|columns|layout, found {fields} fields")]
    MalformedFormat { fields: usize },

    /// A dimension field is not a positive integer.
    #[error("invalid board {axis} dimension {value:?}: expected a positive integer")]
    InvalidDimension { axis: &'static str, value: String },

    /// The layout field is empty.
    #[error("board layout is empty")]
    EmptyBoard,

    /// The layout's bracket/quote structure is broken.
    #[error("malformed board layout at byte {at}: {detail}")]
    MalformedLayout { at: usize, detail: String },

    /// Declared dimensions disagree with the actual grid shape.
    #[error("board {axis} dimension mismatch: declared {declared}, layout has {actual}")]
    DimensionMismatch {
        axis: &'static str,
        declared: usize,
        actual: usize,
    },

    /// A non-empty cell token does not match `p<digits>_<name>`.
    #[error("invalid cell token {token:?} at {at}: expected p<digits>_<name>")]
    InvalidCellToken { at: Coord, token: String },
}

/// A rectangular grid of cells.
///
/// Dimensions are established at parse time and never change; the content of
/// cells changes only through the explicit mutators used during gameplay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    columns: usize,
    cells: Vec<Vec<CellOccupant>>,
}

impl Board {
    /// Build a board from a parsed grid.
    ///
    /// Callers outside the parser should go through `parse_board`.
    pub(crate) fn from_cells(rows: usize, columns: usize, cells: Vec<Vec<CellOccupant>>) -> Self {
        debug_assert_eq!(cells.len(), rows);
        debug_assert!(cells.iter().all(|r| r.len() == columns));
        Self { rows, columns, cells }
    }

    /// An all-empty board, mostly useful in tests and custom assemblies.
    #[must_use]
    pub fn empty(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![vec![CellOccupant::Empty; columns]; rows],
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Whether a coordinate lies on the board.
    #[must_use]
    pub fn contains(&self, at: Coord) -> bool {
        at.row < self.rows && at.col < self.columns
    }

    /// The occupant of a cell, or `None` off the board.
    #[must_use]
    pub fn get(&self, at: Coord) -> Option<&CellOccupant> {
        self.cells.get(at.row)?.get(at.col)
    }

    /// Replace the occupant of a cell. Panics off the board; gameplay code
    /// checks `contains` first.
    pub fn set(&mut self, at: Coord, occupant: CellOccupant) {
        self.cells[at.row][at.col] = occupant;
    }

    /// Iterate over all occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (Coord, PlayerId, &PieceKindId)> {
        self.cells.iter().enumerate().flat_map(|(row, cols)| {
            cols.iter().enumerate().filter_map(move |(col, cell)| match cell {
                CellOccupant::Empty => None,
                CellOccupant::Occupied { owner, kind } => {
                    Some((Coord::new(row, col), *owner, kind))
                }
            })
        })
    }

    /// The distinct non-neutral owners present, ascending.
    #[must_use]
    pub fn players(&self) -> Vec<PlayerId> {
        let mut players: Vec<PlayerId> = self
            .occupied()
            .map(|(_, owner, _)| owner)
            .filter(|owner| !owner.is_neutral())
            .collect();
        players.sort_unstable();
        players.dedup();
        players
    }

    /// Count the pieces of `kind` owned by `player`.
    #[must_use]
    pub fn count_kind(&self, player: PlayerId, kind: &PieceKindId) -> usize {
        self.occupied()
            .filter(|(_, owner, k)| *owner == player && *k == kind)
            .count()
    }

    /// Count all pieces owned by `player`.
    #[must_use]
    pub fn count_owned(&self, player: PlayerId) -> usize {
        self.occupied().filter(|(_, owner, _)| *owner == player).count()
    }

    /// Render the board as a bordered text diagram, one display glyph per
    /// occupied cell. Row 0 is printed at the bottom so "forward" for the
    /// first player reads upward.
    #[must_use]
    pub fn render_glyphs(&self, catalog: &PieceCatalog) -> String {
        let mut out = String::new();
        out.push('+');
        out.push_str(&"-".repeat(self.columns));
        out.push_str("+\n");
        for row in self.cells.iter().rev() {
            out.push('|');
            for cell in row {
                match cell {
                    CellOccupant::Empty => out.push(' '),
                    CellOccupant::Occupied { kind, .. } => {
                        out.push(catalog.get(kind).map_or('?', |def| def.glyph));
                    }
                }
            }
            out.push_str("|\n");
        }
        out.push('+');
        out.push_str(&"-".repeat(self.columns));
        out.push_str("+\n");
        out
    }
}
