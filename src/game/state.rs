//! Mutable game state and action application.
//!
//! `GameState` owns everything that changes during play: the board copy, the
//! turn owner, the per-script extension bag, and the action history. The
//! set itself stays behind an `Arc` and is never written.
//!
//! ## Action arbitration
//!
//! Every script declared by the moving piece is consulted. The first
//! `Transform` in declared order wins; otherwise a single `Allow` permits
//! the default move-and-capture; otherwise the action is rejected with the
//! first `Deny`'s reason, attributed to the script that produced it. An
//! accepted action commits atomically: all deltas are validated against a
//! scratch board before anything real changes.

use std::sync::Arc;

use im::Vector;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::board::{Board, CellOccupant};
use crate::conditions::{ConditionVerdict, GameOutcome};
use crate::core::{Action, ActionRecord, Coord, PlayerId, ScriptName, ScriptStateBag};
use crate::pieces::PieceCatalog;
use crate::scripts::{Delta, DeltaList, MoveContext, RuleContext, ScriptOutcome};
use crate::set::Set;

/// Why the game ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    /// The decided outcome.
    pub outcome: GameOutcome,

    /// Name of the condition that decided it.
    pub condition: String,
}

/// A successfully applied action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedResult {
    /// What was recorded in the history.
    pub record: ActionRecord,

    /// Set when this action ended the game.
    pub game_over: Option<GameOver>,
}

/// A rejected action. The state is unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("action rejected{}: {reason}", .by.as_ref().map(|s| format!(" by {s}")).unwrap_or_default())]
pub struct Rejection {
    /// Human-readable reason.
    pub reason: String,

    /// The script that denied the action, when one did.
    pub by: Option<ScriptName>,
}

impl Rejection {
    fn structural(reason: impl Into<String>) -> Self {
        Self { reason: reason.into(), by: None }
    }
}

/// How the piece's scripts judged a proposed move.
enum Arbitration {
    Transform(ScriptName, DeltaList),
    Allow,
    Rejected(Rejection),
}

/// Mutable state of one game in progress.
pub struct GameState {
    set: Arc<Set>,
    board: Board,
    players: Vec<PlayerId>,
    active_idx: usize,
    turn_number: u32,
    script_state: ScriptStateBag,
    history: Vector<ActionRecord>,
    over: Option<GameOver>,
}

impl GameState {
    /// Stamp a fresh game out of a validated set.
    #[must_use]
    pub fn new(set: Arc<Set>) -> Self {
        let board = set.board().clone();
        let players = board.players();
        Self {
            set,
            board,
            players,
            active_idx: 0,
            turn_number: 1,
            script_state: ScriptStateBag::new(),
            history: Vector::new(),
            over: None,
        }
    }

    /// The set this game was assembled from.
    #[must_use]
    pub fn set(&self) -> &Arc<Set> {
        &self.set
    }

    /// The current board occupancy.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The players present on the initial board, ascending. Neutral pieces
    /// do not contribute a player.
    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    /// The player whose turn it is, or `None` for a playerless board.
    #[must_use]
    pub fn active_player(&self) -> Option<PlayerId> {
        self.players.get(self.active_idx).copied()
    }

    /// The current turn number, starting at 1.
    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// The per-script extension bag.
    #[must_use]
    pub fn script_state(&self) -> &ScriptStateBag {
        &self.script_state
    }

    /// Applied actions, oldest first.
    #[must_use]
    pub fn history(&self) -> &Vector<ActionRecord> {
        &self.history
    }

    /// How the game ended, if it has.
    #[must_use]
    pub fn outcome(&self) -> Option<&GameOver> {
        self.over.as_ref()
    }

    /// Whether the game is over.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.over.is_some()
    }

    /// Validate and apply one action.
    ///
    /// On acceptance the state mutates (board, history, turn owner, bag) and
    /// the terminality verdict is reported. On rejection nothing changes.
    pub fn apply_action(&mut self, action: Action) -> Result<AppliedResult, Rejection> {
        if self.over.is_some() {
            return Err(Rejection::structural("the game is over"));
        }

        let mc = self.move_context(action)?;

        let deltas = match self.arbitrate(&mc) {
            Arbitration::Transform(script, deltas) => {
                debug!(%script, %action, "transform accepted");
                deltas
            }
            Arbitration::Allow => {
                let mut deltas = DeltaList::new();
                deltas.push(Delta::MovePiece { from: mc.from, to: mc.to });
                deltas
            }
            Arbitration::Rejected(rejection) => return Err(rejection),
        };

        // Dry-run the full delta list on a scratch board so an accepted
        // action either commits completely or leaves no trace.
        let mut scratch = self.board.clone();
        let bag_writes = apply_deltas(&mut scratch, self.set.pieces(), &deltas)
            .map_err(|reason| Rejection { reason, by: None })?;

        self.board = scratch;
        for (script, key, value) in bag_writes {
            self.script_state.set(&script, key, value);
        }

        let record = ActionRecord {
            player: mc.player,
            from: mc.from,
            to: mc.to,
            kind: mc.kind,
            captured: mc.target.kind().cloned(),
            turn: self.turn_number,
        };
        self.history.push_back(record.clone());

        self.advance_turn();
        self.over = self.evaluate_conditions();

        Ok(AppliedResult { record, game_over: self.over.clone() })
    }

    /// Destinations the active player's piece at `from` may move to.
    ///
    /// Uses the same arbitration as `apply_action` without mutating state.
    #[must_use]
    pub fn legal_moves_from(&self, from: Coord) -> Vec<Coord> {
        if self.over.is_some() {
            return Vec::new();
        }

        let mut moves = Vec::new();
        for row in 0..self.board.rows() {
            for col in 0..self.board.columns() {
                let to = Coord::new(row, col);
                if to == from {
                    continue;
                }
                let Ok(mc) = self.move_context(Action::new(from, to)) else {
                    continue;
                };
                match self.arbitrate(&mc) {
                    Arbitration::Transform(..) | Arbitration::Allow => moves.push(to),
                    Arbitration::Rejected(_) => {}
                }
            }
        }
        moves
    }

    /// Structural checks shared by application and enumeration.
    fn move_context(&self, action: Action) -> Result<MoveContext, Rejection> {
        let active = self
            .active_player()
            .ok_or_else(|| Rejection::structural("no players in this game"))?;

        let (owner, kind) = match self.board.get(action.from) {
            Some(CellOccupant::Occupied { owner, kind }) => (*owner, kind.clone()),
            Some(CellOccupant::Empty) => {
                return Err(Rejection::structural(format!("no piece at {}", action.from)))
            }
            None => {
                return Err(Rejection::structural(format!("{} is off the board", action.from)))
            }
        };

        if owner != active {
            return Err(Rejection::structural(format!(
                "piece at {} belongs to {}, not {}",
                action.from, owner, active
            )));
        }

        let target = match self.board.get(action.to) {
            Some(cell) => cell.clone(),
            None => {
                return Err(Rejection::structural(format!("{} is off the board", action.to)))
            }
        };

        if action.to == action.from {
            return Err(Rejection::structural("destination equals origin"));
        }

        Ok(MoveContext {
            player: active,
            from: action.from,
            to: action.to,
            kind,
            target,
        })
    }

    /// Consult every script the moving piece declares.
    fn arbitrate(&self, mc: &MoveContext) -> Arbitration {
        let Some(def) = self.set.pieces().get(&mc.kind) else {
            // Unreachable for a validated set.
            return Arbitration::Rejected(Rejection::structural(format!(
                "piece kind {} is not in the catalog",
                mc.kind
            )));
        };

        if def.scripts.is_empty() {
            return Arbitration::Rejected(Rejection::structural(format!(
                "piece kind {} has no rule units and cannot act",
                mc.kind
            )));
        }

        let ctx = RuleContext::Move(mc.clone());
        let mut transform: Option<(ScriptName, DeltaList)> = None;
        let mut allowed = false;
        let mut first_deny: Option<Rejection> = None;

        for name in &def.scripts {
            let Some(script) = self.set.scripts().get(name) else {
                continue; // unreachable for a validated set
            };
            match script.evaluate(self, &ctx) {
                ScriptOutcome::Allow => allowed = true,
                ScriptOutcome::Transform(deltas) => {
                    if transform.is_none() {
                        transform = Some((name.clone(), deltas));
                    }
                }
                ScriptOutcome::Deny(reason) => {
                    if first_deny.is_none() {
                        first_deny = Some(Rejection { reason, by: Some(name.clone()) });
                    }
                }
            }
        }

        if let Some((script, deltas)) = transform {
            Arbitration::Transform(script, deltas)
        } else if allowed {
            Arbitration::Allow
        } else {
            Arbitration::Rejected(first_deny.unwrap_or_else(|| {
                Rejection::structural("no rule unit permits this action")
            }))
        }
    }

    /// Pass the turn to the next player that still owns a piece.
    fn advance_turn(&mut self) {
        self.turn_number += 1;
        let n = self.players.len();
        for step in 1..=n {
            let idx = (self.active_idx + step) % n;
            if self.board.count_owned(self.players[idx]) > 0 {
                self.active_idx = idx;
                return;
            }
        }
    }

    /// Lose conditions first, then win conditions, each in declared order.
    fn evaluate_conditions(&self) -> Option<GameOver> {
        let conditions = self
            .set
            .lose_conditions()
            .iter()
            .chain(self.set.win_conditions().iter());

        for condition in conditions {
            if let ConditionVerdict::Decided(outcome) = condition.evaluate(self) {
                return Some(GameOver {
                    outcome,
                    condition: condition.name().to_string(),
                });
            }
        }
        None
    }
}

/// Apply a delta list to a board, collecting extension-bag writes.
///
/// Every delta is checked before it mutates; the caller applies this to a
/// scratch board so a failure aborts the whole action.
fn apply_deltas(
    board: &mut Board,
    pieces: &PieceCatalog,
    deltas: &[Delta],
) -> Result<Vec<(ScriptName, String, i64)>, String> {
    let mut bag_writes = Vec::new();

    for delta in deltas {
        match delta {
            Delta::MovePiece { from, to } => {
                if !board.contains(*to) {
                    return Err(format!("delta moves a piece off the board to {to}"));
                }
                let occupant = match board.get(*from) {
                    Some(cell @ CellOccupant::Occupied { .. }) => cell.clone(),
                    _ => return Err(format!("delta moves a missing piece at {from}")),
                };
                board.set(*from, CellOccupant::Empty);
                board.set(*to, occupant);
            }
            Delta::RemovePiece { at } => {
                match board.get(*at) {
                    Some(CellOccupant::Occupied { .. }) => board.set(*at, CellOccupant::Empty),
                    _ => return Err(format!("delta removes a missing piece at {at}")),
                }
            }
            Delta::PlacePiece { at, owner, kind } => {
                if !board.contains(*at) {
                    return Err(format!("delta places a piece off the board at {at}"));
                }
                if !pieces.contains(kind) {
                    return Err(format!("delta places unknown piece kind {kind}"));
                }
                board.set(*at, CellOccupant::Occupied { owner: *owner, kind: kind.clone() });
            }
            Delta::SetScriptValue { script, key, value } => {
                bag_writes.push((script.clone(), key.clone(), *value));
            }
        }
    }

    Ok(bag_writes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PieceKindId;
    use crate::set::{validate, SetSource};

    /// Two kings and a pair of single-step movers on a 3x3 board.
    fn mini_set() -> Arc<Set> {
        let source = SetSource {
            name: "mini".to_string(),
            board: "3|3|[[\"p1_king\",\"\",\"\"],[\"\",\"\",\"\"],[\"\",\"\",\"p2_king\"]]"
                .to_string(),
            pieces: vec![(
                "king".to_string(),
                "K|0x183C187E7E3C3C7E|king_moves".to_string(),
            )],
            scripts: vec![(
                "king_moves".to_string(),
                "kind=slide\ndirections=1,0;1,1;0,1;-1,1;-1,0;-1,-1;0,-1;1,-1\n".to_string(),
            )],
            win: "sole_survivor\n".to_string(),
            lose: "piece_extinct king\n".to_string(),
        };
        Arc::new(validate(&source).unwrap())
    }

    #[test]
    fn test_new_game_copies_board() {
        let set = mini_set();
        let state = GameState::new(set.clone());

        assert_eq!(state.board(), set.board());
        assert_eq!(state.players(), &[PlayerId::new(1), PlayerId::new(2)]);
        assert_eq!(state.active_player(), Some(PlayerId::new(1)));
        assert_eq!(state.turn_number(), 1);
        assert!(!state.is_over());
    }

    #[test]
    fn test_apply_plain_move() {
        let mut state = GameState::new(mini_set());

        let result = state
            .apply_action(Action::new(Coord::new(0, 0), Coord::new(1, 1)))
            .unwrap();

        assert_eq!(result.record.kind, PieceKindId::new("king"));
        assert_eq!(result.record.captured, None);
        assert!(result.game_over.is_none());

        assert!(state.board().get(Coord::new(0, 0)).unwrap().is_empty());
        assert_eq!(
            state.board().get(Coord::new(1, 1)).unwrap().owner(),
            Some(PlayerId::new(1))
        );
        assert_eq!(state.active_player(), Some(PlayerId::new(2)));
        assert_eq!(state.turn_number(), 2);
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn test_rejected_action_changes_nothing() {
        let mut state = GameState::new(mini_set());
        let before = state.board().clone();

        // A king cannot jump two squares.
        let err = state
            .apply_action(Action::new(Coord::new(0, 0), Coord::new(0, 2)))
            .unwrap_err();

        assert_eq!(err.by, Some(ScriptName::new("king_moves")));
        assert_eq!(state.board(), &before);
        assert_eq!(state.active_player(), Some(PlayerId::new(1)));
        assert_eq!(state.turn_number(), 1);
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_structural_rejections() {
        let mut state = GameState::new(mini_set());

        // Empty origin.
        let err = state
            .apply_action(Action::new(Coord::new(1, 1), Coord::new(1, 2)))
            .unwrap_err();
        assert!(err.by.is_none());

        // Not the active player's piece.
        let err = state
            .apply_action(Action::new(Coord::new(2, 2), Coord::new(1, 2)))
            .unwrap_err();
        assert!(err.reason.contains("player 2"));

        // Off the board.
        let err = state
            .apply_action(Action::new(Coord::new(0, 0), Coord::new(0, 9)))
            .unwrap_err();
        assert!(err.reason.contains("off the board"));
    }

    #[test]
    fn test_capture_ends_game_through_conditions() {
        let mut state = GameState::new(mini_set());

        // Walk the kings toward each other, then capture.
        state.apply_action(Action::new(Coord::new(0, 0), Coord::new(1, 1))).unwrap();
        state.apply_action(Action::new(Coord::new(2, 2), Coord::new(2, 1))).unwrap();
        let result = state
            .apply_action(Action::new(Coord::new(1, 1), Coord::new(2, 1)))
            .unwrap();

        let over = result.game_over.expect("capturing the last king ends the game");
        // The lose condition fires before the win condition.
        assert_eq!(over.condition, "piece_extinct king");
        assert_eq!(over.outcome, GameOutcome::Loser(PlayerId::new(2)));
        assert!(state.is_over());

        // No further actions are accepted.
        let err = state
            .apply_action(Action::new(Coord::new(2, 1), Coord::new(1, 1)))
            .unwrap_err();
        assert!(err.reason.contains("over"));
    }

    #[test]
    fn test_legal_moves_from() {
        let state = GameState::new(mini_set());

        let mut moves = state.legal_moves_from(Coord::new(0, 0));
        moves.sort();
        assert_eq!(
            moves,
            vec![Coord::new(0, 1), Coord::new(1, 0), Coord::new(1, 1)]
        );

        // Opponent piece yields nothing while player 1 is active.
        assert!(state.legal_moves_from(Coord::new(2, 2)).is_empty());
        // Empty square yields nothing.
        assert!(state.legal_moves_from(Coord::new(1, 1)).is_empty());
    }
}
