//! Builtin condition kinds.
//!
//! - `sole_survivor` - a player wins once they are the only one with pieces
//! - `piece_extinct <kind>` - a player loses when they have no piece of the
//!   named kind left (the classic lose-your-king rule)
//! - `script <name>` - delegates the predicate to a registered script,
//!   probed once per player in roster order

use std::sync::Arc;

use crate::core::{PieceKindId, ScriptName};
use crate::game::GameState;
use crate::scripts::{RuleContext, ScriptOutcome};

use super::loader::{ConditionDecl, ConditionFactory};
use super::{Condition, ConditionCategory, ConditionError, ConditionVerdict, GameOutcome};

/// The builtin kinds, ready to register on a loader.
pub fn builtin_factories() -> Vec<(&'static str, ConditionFactory)> {
    vec![
        ("sole_survivor", Box::new(SoleSurvivor::from_decl) as ConditionFactory),
        ("piece_extinct", Box::new(PieceExtinct::from_decl)),
        ("script", Box::new(ScriptCondition::from_decl)),
    ]
}

/// Wins the game for the last player with pieces on the board.
pub struct SoleSurvivor {
    name: String,
}

impl SoleSurvivor {
    fn from_decl(decl: &ConditionDecl) -> Result<Arc<dyn Condition>, ConditionError> {
        if !decl.args.is_empty() {
            return Err(decl.fail("takes no arguments"));
        }
        Ok(Arc::new(SoleSurvivor { name: decl.line.clone() }))
    }
}

impl Condition for SoleSurvivor {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, state: &GameState) -> ConditionVerdict {
        let board = state.board();
        let mut survivors = state
            .players()
            .iter()
            .filter(|p| board.count_owned(**p) > 0);

        match (survivors.next(), survivors.next()) {
            (Some(winner), None) => ConditionVerdict::Decided(GameOutcome::Winner(*winner)),
            (None, _) => ConditionVerdict::Decided(GameOutcome::Draw),
            _ => ConditionVerdict::NoDecision,
        }
    }
}

/// Loses the game for the first player (in roster order) with no piece of
/// the named kind.
pub struct PieceExtinct {
    name: String,
    kinds: Vec<PieceKindId>,
}

impl PieceExtinct {
    fn from_decl(decl: &ConditionDecl) -> Result<Arc<dyn Condition>, ConditionError> {
        let kind = PieceKindId::new(decl.single_arg()?);
        Ok(Arc::new(PieceExtinct { name: decl.line.clone(), kinds: vec![kind] }))
    }

    fn kind(&self) -> &PieceKindId {
        &self.kinds[0]
    }
}

impl Condition for PieceExtinct {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, state: &GameState) -> ConditionVerdict {
        let board = state.board();
        for player in state.players() {
            if board.count_kind(*player, self.kind()) == 0 {
                return ConditionVerdict::Decided(GameOutcome::Loser(*player));
            }
        }
        ConditionVerdict::NoDecision
    }

    fn piece_kind_refs(&self) -> &[PieceKindId] {
        &self.kinds
    }
}

/// Delegates the predicate to a registered script.
///
/// The script is probed once per player in roster order; the first `Allow`
/// decides the game for that player, with the outcome's polarity taken from
/// the category the condition was declared in.
pub struct ScriptCondition {
    name: String,
    scripts: Vec<ScriptName>,
    category: ConditionCategory,
}

impl ScriptCondition {
    fn from_decl(decl: &ConditionDecl) -> Result<Arc<dyn Condition>, ConditionError> {
        let script = ScriptName::new(decl.single_arg()?);
        Ok(Arc::new(ScriptCondition {
            name: decl.line.clone(),
            scripts: vec![script],
            category: decl.category,
        }))
    }

    fn script(&self) -> &ScriptName {
        &self.scripts[0]
    }
}

impl Condition for ScriptCondition {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, state: &GameState) -> ConditionVerdict {
        // The registry reference was checked at validation time.
        let Some(script) = state.set().scripts().get(self.script()).cloned() else {
            return ConditionVerdict::NoDecision;
        };

        for player in state.players() {
            if let ScriptOutcome::Allow = script.evaluate(state, &RuleContext::Probe(*player)) {
                let outcome = match self.category {
                    ConditionCategory::Win => GameOutcome::Winner(*player),
                    ConditionCategory::Lose => GameOutcome::Loser(*player),
                };
                return ConditionVerdict::Decided(outcome);
            }
        }
        ConditionVerdict::NoDecision
    }

    fn script_refs(&self) -> &[ScriptName] {
        &self.scripts
    }
}
