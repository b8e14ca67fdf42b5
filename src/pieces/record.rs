//! Piece record codec.
//!
//! One record per kind, pipe-delimited like the board descriptor:
//!
//! ```text
//! K|0x183C187E7E3C3C7E|king_moves,castle
//! ```
//!
//! Field 1 is the display glyph (exactly one character), field 2 the 64-bit
//! sprite hex, and the optional field 3 a comma-separated list of script
//! names. The kind name itself is not in the record; it is derived from the
//! record's file name. `serialize_piece_record` emits the canonical form and
//! round-trips through `parse_piece_record`.

use crate::core::{PieceKindId, ScriptName};

use super::definition::{PieceDefinition, PieceIcon};
use super::PieceError;

/// Parse a record for the kind `kind`.
pub fn parse_piece_record(kind: &PieceKindId, text: &str) -> Result<PieceDefinition, PieceError> {
    let text = text.trim();
    let fields: Vec<&str> = text.split('|').collect();
    if fields.len() != 2 && fields.len() != 3 {
        return Err(PieceError::MalformedRecord {
            kind: kind.clone(),
            fields: fields.len(),
        });
    }

    let mut glyphs = fields[0].chars();
    let glyph = match (glyphs.next(), glyphs.next()) {
        (Some(g), None) => g,
        _ => {
            return Err(PieceError::InvalidGlyph {
                kind: kind.clone(),
                glyph: fields[0].to_string(),
            })
        }
    };

    let icon = parse_icon(kind, fields[1])?;

    let mut scripts = Vec::new();
    if fields.len() == 3 && !fields[2].trim().is_empty() {
        for name in fields[2].split(',') {
            let name = name.trim();
            if name.is_empty() {
                return Err(PieceError::EmptyScriptRef { kind: kind.clone() });
            }
            scripts.push(ScriptName::new(name));
        }
    }

    Ok(PieceDefinition {
        kind: kind.clone(),
        glyph,
        icon,
        scripts,
    })
}

/// Emit the canonical record text for a definition.
#[must_use]
pub fn serialize_piece_record(def: &PieceDefinition) -> String {
    let mut out = format!("{}|{}", def.glyph, def.icon);
    if !def.scripts.is_empty() {
        out.push('|');
        let names: Vec<&str> = def.scripts.iter().map(ScriptName::as_str).collect();
        out.push_str(&names.join(","));
    }
    out
}

fn parse_icon(kind: &PieceKindId, raw: &str) -> Result<PieceIcon, PieceError> {
    let raw = raw.trim();
    let invalid = || PieceError::InvalidIconEncoding {
        kind: kind.clone(),
        value: raw.to_string(),
    };

    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);

    if digits.is_empty() || digits.len() > 16 {
        return Err(invalid());
    }
    let bits = u64::from_str_radix(digits, 16).map_err(|_| invalid())?;
    if bits == 0 {
        // An all-dark sprite renders as nothing; treat it as a bad record.
        return Err(invalid());
    }
    Ok(PieceIcon::new(bits))
}
