//! Board descriptor parser.
//!
//! The descriptor is a single pipe-delimited record, `rows|columns|layout`,
//! where `layout` is a bracketed list of bracketed rows of double-quoted cell
//! strings:
//!
//! ```text
//! 2|2|[["",""],["","p1_king"]]
//! ```
//!
//! An empty string is an empty cell; anything else must match
//! `p<digits>_<name>` and is decomposed into the owner number and the piece
//! kind. The parser is pure: it never consults the piece catalog, so a board
//! full of unknown kinds parses fine and fails later at validation.

use tracing::debug;

use crate::core::{Coord, PieceKindId, PlayerId};

use super::{Board, BoardError, CellOccupant};

/// Parse a board descriptor into a `Board`.
pub fn parse_board(text: &str) -> Result<Board, BoardError> {
    let text = text.trim();

    let fields: Vec<&str> = text.split('|').collect();
    if fields.len() != 3 {
        return Err(BoardError::MalformedFormat { fields: fields.len() });
    }

    let rows = parse_dimension("row", fields[0])?;
    let columns = parse_dimension("column", fields[1])?;

    let raw_layout = fields[2].trim();
    if raw_layout.is_empty() {
        return Err(BoardError::EmptyBoard);
    }

    let tokens = parse_layout(raw_layout)?;

    if tokens.len() != rows {
        return Err(BoardError::DimensionMismatch {
            axis: "row",
            declared: rows,
            actual: tokens.len(),
        });
    }
    for row in &tokens {
        if row.len() != columns {
            return Err(BoardError::DimensionMismatch {
                axis: "column",
                declared: columns,
                actual: row.len(),
            });
        }
    }

    let mut cells = Vec::with_capacity(rows);
    for (r, row) in tokens.into_iter().enumerate() {
        let mut parsed = Vec::with_capacity(columns);
        for (c, token) in row.into_iter().enumerate() {
            parsed.push(parse_cell(Coord::new(r, c), &token)?);
        }
        cells.push(parsed);
    }

    debug!(rows, columns, "parsed board descriptor");
    Ok(Board::from_cells(rows, columns, cells))
}

fn parse_dimension(axis: &'static str, raw: &str) -> Result<usize, BoardError> {
    let trimmed = raw.trim();
    match trimmed.parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(BoardError::InvalidDimension {
            axis,
            value: trimmed.to_string(),
        }),
    }
}

/// Decompose a cell token into its occupant.
///
/// `""` is empty; otherwise the token must be `p<digits>_<name>` with a
/// non-empty name of word characters.
fn parse_cell(at: Coord, token: &str) -> Result<CellOccupant, BoardError> {
    if token.is_empty() {
        return Ok(CellOccupant::Empty);
    }

    let invalid = || BoardError::InvalidCellToken {
        at,
        token: token.to_string(),
    };

    let rest = token.strip_prefix('p').ok_or_else(invalid)?;
    let underscore = rest.find('_').ok_or_else(invalid)?;
    let (digits, name) = rest.split_at(underscore);
    let name = &name[1..];

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let owner: u8 = digits.parse().map_err(|_| invalid())?;

    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(invalid());
    }

    Ok(CellOccupant::Occupied {
        owner: PlayerId::new(owner),
        kind: PieceKindId::new(name),
    })
}

/// Tokenize the bracketed layout into rows of raw cell strings.
struct LayoutCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> LayoutCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { bytes: text.as_bytes(), pos: 0 }
    }

    fn error(&self, detail: impl Into<String>) -> BoardError {
        BoardError::MalformedLayout {
            at: self.pos,
            detail: detail.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Result<(), BoardError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected {:?}", byte as char)))
        }
    }

    fn quoted_string(&mut self) -> Result<String, BoardError> {
        self.expect(b'"')?;
        let start = self.pos;
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b'"' {
                let s = std::str::from_utf8(&self.bytes[start..self.pos])
                    .map_err(|_| self.error("cell string is not valid UTF-8"))?
                    .to_string();
                self.pos += 1;
                return Ok(s);
            }
            self.pos += 1;
        }
        Err(self.error("unterminated cell string"))
    }

    fn row(&mut self) -> Result<Vec<String>, BoardError> {
        self.expect(b'[')?;
        let mut cells = Vec::new();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(cells);
        }
        loop {
            cells.push(self.quoted_string()?);
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(cells);
                }
                _ => return Err(self.error("expected ',' or ']' after cell")),
            }
        }
    }
}

fn parse_layout(text: &str) -> Result<Vec<Vec<String>>, BoardError> {
    let mut cursor = LayoutCursor::new(text);
    cursor.expect(b'[')?;

    let mut rows = Vec::new();
    if cursor.peek() == Some(b']') {
        cursor.pos += 1;
    } else {
        loop {
            rows.push(cursor.row()?);
            match cursor.peek() {
                Some(b',') => cursor.pos += 1,
                Some(b']') => {
                    cursor.pos += 1;
                    break;
                }
                _ => return Err(cursor.error("expected ',' or ']' after row")),
            }
        }
    }

    if cursor.peek().is_some() {
        return Err(cursor.error("trailing data after layout"));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_board() {
        let board = parse_board("2|2|[[\"\",\"\"],[\"\",\"p1_king\"]]").unwrap();

        assert_eq!(board.rows(), 2);
        assert_eq!(board.columns(), 2);
        assert_eq!(
            board.get(Coord::new(1, 1)),
            Some(&CellOccupant::Occupied {
                owner: PlayerId::new(1),
                kind: PieceKindId::new("king"),
            })
        );
        assert_eq!(board.occupied().count(), 1);
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let board = parse_board("2|2| [ [\"\", \"\"] , [\"p0_wall\", \"\"] ]\n").unwrap();
        assert_eq!(
            board.get(Coord::new(1, 0)).unwrap().owner(),
            Some(PlayerId::NEUTRAL)
        );
    }

    #[test]
    fn test_malformed_format() {
        assert!(matches!(
            parse_board("8|8"),
            Err(BoardError::MalformedFormat { fields: 2 })
        ));
        assert!(matches!(
            parse_board("8|8|[]|extra"),
            Err(BoardError::MalformedFormat { fields: 4 })
        ));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            parse_board("x|2|[[\"\"],[\"\"]]"),
            Err(BoardError::InvalidDimension { axis: "row", .. })
        ));
        assert!(matches!(
            parse_board("2|0|[[\"\"],[\"\"]]"),
            Err(BoardError::InvalidDimension { axis: "column", .. })
        ));
    }

    #[test]
    fn test_empty_layout() {
        assert!(matches!(parse_board("2|2|"), Err(BoardError::EmptyBoard)));
    }

    #[test]
    fn test_dimension_mismatch_rows() {
        let err = parse_board("3|1|[[\"\"],[\"\"]]").unwrap_err();
        assert_eq!(
            err,
            BoardError::DimensionMismatch { axis: "row", declared: 3, actual: 2 }
        );
    }

    #[test]
    fn test_dimension_mismatch_columns() {
        let err = parse_board("2|2|[[\"\",\"\"],[\"\"]]").unwrap_err();
        assert_eq!(
            err,
            BoardError::DimensionMismatch { axis: "column", declared: 2, actual: 1 }
        );
    }

    #[test]
    fn test_invalid_cell_tokens() {
        for token in ["king", "p_king", "pX_king", "p1king", "p1_", "p1_ki ng", "q1_king"] {
            let text = format!("1|1|[[\"{token}\"]]");
            assert!(
                matches!(parse_board(&text), Err(BoardError::InvalidCellToken { .. })),
                "token {token:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_multi_digit_owner() {
        let board = parse_board("1|1|[[\"p12_guard\"]]").unwrap();
        assert_eq!(
            board.get(Coord::new(0, 0)).unwrap().owner(),
            Some(PlayerId::new(12))
        );
    }

    #[test]
    fn test_owner_overflow_rejected() {
        assert!(matches!(
            parse_board("1|1|[[\"p300_king\"]]"),
            Err(BoardError::InvalidCellToken { .. })
        ));
    }

    #[test]
    fn test_unterminated_layout() {
        assert!(matches!(
            parse_board("1|1|[[\"p1_king\"]"),
            Err(BoardError::MalformedLayout { .. })
        ));
        assert!(matches!(
            parse_board("1|1|[[\"p1_king]]"),
            Err(BoardError::MalformedLayout { .. })
        ));
    }

    #[test]
    fn test_trailing_garbage() {
        assert!(matches!(
            parse_board("1|1|[[\"\"]]x"),
            Err(BoardError::MalformedLayout { .. })
        ));
    }
}
