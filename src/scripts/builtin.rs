//! Builtin rule-unit kinds.
//!
//! These cover the classic-chess baseline so a set author only writes
//! declarations, not code:
//!
//! - `slide` - parameterized step/slide movement (king, queen, rook,
//!   bishop, knight are all slides over different direction sets)
//! - `pawn` - forward advance, double-step from the home rank, diagonal
//!   capture, optional promotion
//! - `castle` - two-square king move relocating the rook
//! - `en_passant` - diagonal capture onto the square skipped by an enemy
//!   double-step
//!
//! Anything beyond these is a custom kind registered on the `ScriptLoader`.

use std::sync::Arc;

use crate::board::CellOccupant;
use crate::core::{Coord, Offset, PieceKindId, PlayerId, ScriptName};
use crate::game::GameState;

use super::decl::ScriptDecl;
use super::registry::ScriptFactory;
use super::{Delta, DeltaList, MoveContext, RuleContext, Script, ScriptError, ScriptOutcome};

/// The builtin kinds, ready to register on a loader.
pub fn builtin_factories() -> Vec<(&'static str, ScriptFactory)> {
    vec![
        ("slide", Box::new(Slide::from_decl) as ScriptFactory),
        ("pawn", Box::new(Pawn::from_decl)),
        ("castle", Box::new(Castle::from_decl)),
        ("en_passant", Box::new(EnPassant::from_decl)),
    ]
}

/// Forward direction for a player's pawns.
///
/// Odd-numbered players advance toward higher rows, even-numbered players
/// toward lower rows, mirroring the two-sided layout of the board format
/// (player 1 at the bottom rows, player 2 at the top).
pub(crate) fn forward_dir(player: PlayerId) -> Offset {
    if player.raw() % 2 == 1 {
        Offset::new(1, 0)
    } else {
        Offset::new(-1, 0)
    }
}

// === parameter helpers ===

fn offsets_param(decl: &ScriptDecl, key: &str) -> Result<Vec<Offset>, ScriptError> {
    let raw = decl
        .param(key)
        .ok_or_else(|| decl.fail(format!("missing parameter {key}")))?;

    let mut offsets = Vec::new();
    for pair in raw.split(';') {
        let pair = pair.trim();
        let (dr, dc) = pair
            .split_once(',')
            .ok_or_else(|| decl.fail(format!("bad offset {pair:?} in {key}")))?;
        let dr: i32 = dr.trim().parse().map_err(|_| decl.fail(format!("bad offset {pair:?} in {key}")))?;
        let dc: i32 = dc.trim().parse().map_err(|_| decl.fail(format!("bad offset {pair:?} in {key}")))?;
        if dr == 0 && dc == 0 {
            return Err(decl.fail(format!("zero offset in {key}")));
        }
        offsets.push(Offset::new(dr, dc));
    }
    if offsets.is_empty() {
        return Err(decl.fail(format!("empty offset list in {key}")));
    }
    Ok(offsets)
}

fn bool_param(decl: &ScriptDecl, key: &str, default: bool) -> Result<bool, ScriptError> {
    match decl.param(key) {
        None => Ok(default),
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        Some(other) => Err(decl.fail(format!("parameter {key} must be true or false, not {other:?}"))),
    }
}

fn kind_param(decl: &ScriptDecl, key: &str) -> Result<PieceKindId, ScriptError> {
    let raw = decl
        .param(key)
        .ok_or_else(|| decl.fail(format!("missing parameter {key}")))?;
    if raw.is_empty() {
        return Err(decl.fail(format!("empty parameter {key}")));
    }
    Ok(PieceKindId::new(raw))
}

// === slide ===

/// Step or slide movement over a fixed direction set.
pub struct Slide {
    name: ScriptName,
    directions: Vec<Offset>,
    multi_step: bool,
    can_capture: bool,
}

impl Slide {
    /// Build from a declaration with `directions`, optional `multi_step`
    /// (default false) and optional `capture` (default true).
    pub fn from_decl(decl: &ScriptDecl) -> Result<Arc<dyn Script>, ScriptError> {
        Ok(Arc::new(Slide {
            name: decl.name.clone(),
            directions: offsets_param(decl, "directions")?,
            multi_step: bool_param(decl, "multi_step", false)?,
            can_capture: bool_param(decl, "capture", true)?,
        }))
    }

    fn reaches(&self, state: &GameState, mc: &MoveContext) -> bool {
        let board = state.board();
        for dir in &self.directions {
            let mut at = mc.from;
            loop {
                let Some(next) = at.offset(*dir, board.rows(), board.columns()) else {
                    break;
                };
                if next == mc.to {
                    return match &mc.target {
                        CellOccupant::Empty => true,
                        CellOccupant::Occupied { owner, .. } => {
                            self.can_capture && *owner != mc.player
                        }
                    };
                }
                if !self.multi_step {
                    break;
                }
                // A slide stops at the first occupied square.
                if !matches!(board.get(next), Some(CellOccupant::Empty)) {
                    break;
                }
                at = next;
            }
        }
        false
    }
}

impl Script for Slide {
    fn name(&self) -> &ScriptName {
        &self.name
    }

    fn evaluate(&self, state: &GameState, ctx: &RuleContext) -> ScriptOutcome {
        match ctx {
            RuleContext::Move(mc) if self.reaches(state, mc) => ScriptOutcome::Allow,
            RuleContext::Move(_) => {
                ScriptOutcome::Deny(format!("{}: square not reachable", self.name))
            }
            RuleContext::Probe(_) => {
                ScriptOutcome::Deny(format!("{}: not a predicate", self.name))
            }
        }
    }
}

// === pawn ===

/// Pawn movement: forward advance, double-step from the home rank,
/// diagonal capture, optional promotion on the far rank.
pub struct Pawn {
    name: ScriptName,
    promotes_to: Vec<PieceKindId>,
}

impl Pawn {
    /// Build from a declaration with an optional `promotes_to` piece kind.
    pub fn from_decl(decl: &ScriptDecl) -> Result<Arc<dyn Script>, ScriptError> {
        let promotes_to = match decl.param("promotes_to") {
            Some(_) => vec![kind_param(decl, "promotes_to")?],
            None => Vec::new(),
        };
        Ok(Arc::new(Pawn { name: decl.name.clone(), promotes_to }))
    }

    fn judge(&self, state: &GameState, mc: &MoveContext) -> Option<ScriptOutcome> {
        let board = state.board();
        let fwd = forward_dir(mc.player);
        let delta = mc.from.delta_to(mc.to);

        let accepted = if delta == fwd {
            mc.target.is_empty()
        } else if delta == Offset::new(2 * fwd.dr, 0) {
            let home_row = if fwd.dr > 0 { 1 } else { board.rows().checked_sub(2)? };
            let between = mc.from.offset(fwd, board.rows(), board.columns())?;
            mc.from.row == home_row
                && mc.target.is_empty()
                && matches!(board.get(between), Some(CellOccupant::Empty))
        } else if delta.dr == fwd.dr && delta.dc.abs() == 1 {
            matches!(&mc.target, CellOccupant::Occupied { owner, .. } if *owner != mc.player)
        } else {
            false
        };

        if !accepted {
            return None;
        }

        let promotion_row = if fwd.dr > 0 { board.rows() - 1 } else { 0 };
        if let Some(promoted) = self.promotes_to.first() {
            if mc.to.row == promotion_row {
                let mut deltas = DeltaList::new();
                deltas.push(Delta::MovePiece { from: mc.from, to: mc.to });
                deltas.push(Delta::PlacePiece {
                    at: mc.to,
                    owner: mc.player,
                    kind: promoted.clone(),
                });
                return Some(ScriptOutcome::Transform(deltas));
            }
        }
        Some(ScriptOutcome::Allow)
    }
}

impl Script for Pawn {
    fn name(&self) -> &ScriptName {
        &self.name
    }

    fn evaluate(&self, state: &GameState, ctx: &RuleContext) -> ScriptOutcome {
        match ctx {
            RuleContext::Move(mc) => self
                .judge(state, mc)
                .unwrap_or_else(|| ScriptOutcome::Deny(format!("{}: not a pawn move", self.name))),
            RuleContext::Probe(_) => {
                ScriptOutcome::Deny(format!("{}: not a predicate", self.name))
            }
        }
    }

    fn piece_kind_refs(&self) -> &[PieceKindId] {
        &self.promotes_to
    }
}

// === castle ===

/// Two-square king move that relocates the rook past the king.
///
/// Requires the path between king and rook to be clear, neither piece to
/// have moved (derived from the action history) and the player not to have
/// castled before (a done-flag in this script's extension-bag namespace).
pub struct Castle {
    name: ScriptName,
    refs: Vec<PieceKindId>,
}

impl Castle {
    /// Build from a declaration naming the `king` and `rook` piece kinds.
    pub fn from_decl(decl: &ScriptDecl) -> Result<Arc<dyn Script>, ScriptError> {
        let king = kind_param(decl, "king")?;
        let rook = kind_param(decl, "rook")?;
        Ok(Arc::new(Castle { name: decl.name.clone(), refs: vec![king, rook] }))
    }

    fn king(&self) -> &PieceKindId {
        &self.refs[0]
    }

    fn rook(&self) -> &PieceKindId {
        &self.refs[1]
    }

    fn judge(&self, state: &GameState, mc: &MoveContext) -> Result<DeltaList, String> {
        if mc.kind != *self.king() {
            return Err(format!("{}: only the {} may castle", self.name, self.king()));
        }

        let delta = mc.from.delta_to(mc.to);
        if delta.dr != 0 || delta.dc.abs() != 2 {
            return Err(format!("{}: not a castling move", self.name));
        }

        let done_key = format!("done:{}", mc.player.raw());
        if state.script_state().get(&self.name, &done_key, 0) != 0 {
            return Err(format!("{}: already castled", self.name));
        }

        let board = state.board();
        let row = mc.from.row;
        let rook_at = if delta.dc > 0 {
            Coord::new(row, board.columns() - 1)
        } else {
            Coord::new(row, 0)
        };

        match board.get(rook_at) {
            Some(CellOccupant::Occupied { owner, kind })
                if *owner == mc.player && kind == self.rook() => {}
            _ => return Err(format!("{}: no {} on the castling corner", self.name, self.rook())),
        }

        let (lo, hi) = if rook_at.col < mc.from.col {
            (rook_at.col, mc.from.col)
        } else {
            (mc.from.col, rook_at.col)
        };
        for col in lo + 1..hi {
            if !matches!(board.get(Coord::new(row, col)), Some(CellOccupant::Empty)) {
                return Err(format!("{}: path is not clear", self.name));
            }
        }

        let touched = |at: Coord| state.history().iter().any(|r| r.from == at || r.to == at);
        if touched(mc.from) || touched(rook_at) {
            return Err(format!("{}: king or rook has already moved", self.name));
        }

        let rook_dest = Coord::new(row, (mc.from.col as i64 + delta.dc.signum() as i64) as usize);
        let mut deltas = DeltaList::new();
        deltas.push(Delta::MovePiece { from: mc.from, to: mc.to });
        deltas.push(Delta::MovePiece { from: rook_at, to: rook_dest });
        deltas.push(Delta::SetScriptValue {
            script: self.name.clone(),
            key: done_key,
            value: 1,
        });
        Ok(deltas)
    }
}

impl Script for Castle {
    fn name(&self) -> &ScriptName {
        &self.name
    }

    fn evaluate(&self, state: &GameState, ctx: &RuleContext) -> ScriptOutcome {
        match ctx {
            RuleContext::Move(mc) => match self.judge(state, mc) {
                Ok(deltas) => ScriptOutcome::Transform(deltas),
                Err(reason) => ScriptOutcome::Deny(reason),
            },
            RuleContext::Probe(_) => {
                ScriptOutcome::Deny(format!("{}: not a predicate", self.name))
            }
        }
    }

    fn piece_kind_refs(&self) -> &[PieceKindId] {
        &self.refs
    }
}

// === en passant ===

/// Diagonal pawn capture onto the square an enemy pawn skipped with an
/// immediately preceding double-step.
pub struct EnPassant {
    name: ScriptName,
    refs: Vec<PieceKindId>,
}

impl EnPassant {
    /// Build from a declaration naming the `pawn` piece kind.
    pub fn from_decl(decl: &ScriptDecl) -> Result<Arc<dyn Script>, ScriptError> {
        let pawn = kind_param(decl, "pawn")?;
        Ok(Arc::new(EnPassant { name: decl.name.clone(), refs: vec![pawn] }))
    }

    fn pawn(&self) -> &PieceKindId {
        &self.refs[0]
    }

    fn judge(&self, state: &GameState, mc: &MoveContext) -> Result<DeltaList, String> {
        let unavailable = || format!("{}: en passant not available", self.name);

        if mc.kind != *self.pawn() || !mc.target.is_empty() {
            return Err(unavailable());
        }

        let fwd = forward_dir(mc.player);
        let delta = mc.from.delta_to(mc.to);
        if delta.dr != fwd.dr || delta.dc.abs() != 1 {
            return Err(unavailable());
        }

        // The double-step must be the move played immediately before.
        let Some(last) = state.history().last() else {
            return Err(unavailable());
        };
        let double_step = last.kind == *self.pawn()
            && last.player != mc.player
            && last.from.col == last.to.col
            && last.from.row.abs_diff(last.to.row) == 2
            && last.to == Coord::new(mc.from.row, mc.to.col);
        if !double_step {
            return Err(unavailable());
        }

        let mut deltas = DeltaList::new();
        deltas.push(Delta::MovePiece { from: mc.from, to: mc.to });
        deltas.push(Delta::RemovePiece { at: last.to });
        Ok(deltas)
    }
}

impl Script for EnPassant {
    fn name(&self) -> &ScriptName {
        &self.name
    }

    fn evaluate(&self, state: &GameState, ctx: &RuleContext) -> ScriptOutcome {
        match ctx {
            RuleContext::Move(mc) => match self.judge(state, mc) {
                Ok(deltas) => ScriptOutcome::Transform(deltas),
                Err(reason) => ScriptOutcome::Deny(reason),
            },
            RuleContext::Probe(_) => {
                ScriptOutcome::Deny(format!("{}: not a predicate", self.name))
            }
        }
    }

    fn piece_kind_refs(&self) -> &[PieceKindId] {
        &self.refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripts::decl::parse_script_decl;

    fn decl(name: &str, text: &str) -> ScriptDecl {
        parse_script_decl(name, text).unwrap()
    }

    #[test]
    fn test_forward_dir_parity() {
        assert_eq!(forward_dir(PlayerId::new(1)), Offset::new(1, 0));
        assert_eq!(forward_dir(PlayerId::new(2)), Offset::new(-1, 0));
        assert_eq!(forward_dir(PlayerId::new(3)), Offset::new(1, 0));
    }

    #[test]
    fn test_slide_params() {
        let script = Slide::from_decl(&decl(
            "knight_moves",
            "kind=slide\ndirections=2,1;1,2;-1,2;-2,1;-2,-1;-1,-2;1,-2;2,-1\n",
        ))
        .unwrap();
        assert_eq!(script.name(), &ScriptName::new("knight_moves"));
    }

    #[test]
    fn test_slide_rejects_bad_params() {
        assert!(Slide::from_decl(&decl("x", "kind=slide\n")).is_err());
        assert!(Slide::from_decl(&decl("x", "kind=slide\ndirections=\n")).is_err());
        assert!(Slide::from_decl(&decl("x", "kind=slide\ndirections=0,0\n")).is_err());
        assert!(Slide::from_decl(&decl("x", "kind=slide\ndirections=1;2\n")).is_err());
        assert!(
            Slide::from_decl(&decl("x", "kind=slide\ndirections=1,0\nmulti_step=maybe\n")).is_err()
        );
    }

    #[test]
    fn test_pawn_promotion_refs() {
        let script = Pawn::from_decl(&decl("p", "kind=pawn\npromotes_to=queen\n")).unwrap();
        assert_eq!(script.piece_kind_refs(), &[PieceKindId::new("queen")]);

        let plain = Pawn::from_decl(&decl("p", "kind=pawn\n")).unwrap();
        assert!(plain.piece_kind_refs().is_empty());
    }

    #[test]
    fn test_castle_requires_both_kinds() {
        assert!(Castle::from_decl(&decl("c", "kind=castle\nking=king\nrook=rook\n")).is_ok());
        assert!(Castle::from_decl(&decl("c", "kind=castle\nking=king\n")).is_err());
        assert!(Castle::from_decl(&decl("c", "kind=castle\nrook=rook\n")).is_err());
    }

    #[test]
    fn test_castle_reports_kind_refs() {
        let script = Castle::from_decl(&decl("c", "kind=castle\nking=king\nrook=rook\n")).unwrap();
        assert_eq!(
            script.piece_kind_refs(),
            &[PieceKindId::new("king"), PieceKindId::new("rook")]
        );
    }

    #[test]
    fn test_en_passant_requires_pawn_kind() {
        assert!(EnPassant::from_decl(&decl("e", "kind=en_passant\npawn=pawn\n")).is_ok());
        assert!(EnPassant::from_decl(&decl("e", "kind=en_passant\n")).is_err());
    }
}
