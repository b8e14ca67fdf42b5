//! Board coordinates.
//!
//! Coordinates are row-major and 0-based: `Coord { row: 0, col: 0 }` is the
//! first cell of the first layout row. Rule units reason about relative
//! movement with `Offset` deltas, which may be negative.

use serde::{Deserialize, Serialize};

/// A cell position on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Apply an offset, returning `None` if the result leaves `rows` x `cols`.
    #[must_use]
    pub fn offset(self, delta: Offset, rows: usize, cols: usize) -> Option<Coord> {
        let row = self.row as i64 + delta.dr as i64;
        let col = self.col as i64 + delta.dc as i64;
        if row < 0 || col < 0 || row >= rows as i64 || col >= cols as i64 {
            return None;
        }
        Some(Coord::new(row as usize, col as usize))
    }

    /// Signed delta from `self` to `other`.
    #[must_use]
    pub fn delta_to(self, other: Coord) -> Offset {
        Offset {
            dr: other.row as i32 - self.row as i32,
            dc: other.col as i32 - self.col as i32,
        }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A signed movement delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    pub dr: i32,
    pub dc: i32,
}

impl Offset {
    /// Create a new offset.
    #[must_use]
    pub const fn new(dr: i32, dc: i32) -> Self {
        Self { dr, dc }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_in_bounds() {
        let c = Coord::new(1, 1);
        assert_eq!(c.offset(Offset::new(1, 0), 8, 8), Some(Coord::new(2, 1)));
        assert_eq!(c.offset(Offset::new(-1, -1), 8, 8), Some(Coord::new(0, 0)));
    }

    #[test]
    fn test_offset_out_of_bounds() {
        let c = Coord::new(0, 7);
        assert_eq!(c.offset(Offset::new(-1, 0), 8, 8), None);
        assert_eq!(c.offset(Offset::new(0, 1), 8, 8), None);
    }

    #[test]
    fn test_delta_to() {
        let from = Coord::new(6, 4);
        let to = Coord::new(4, 4);
        assert_eq!(from.delta_to(to), Offset::new(-2, 0));
    }
}
