//! Set validation: staged loading plus cross-reference checks.
//!
//! Loaders run in a fixed, documented order:
//!
//! 1. pieces catalog
//! 2. piece scripts (the registry, then every reference out of the catalog)
//! 3. board (parse, then every cell kind against the catalog)
//! 4. win conditions
//! 5. lose conditions
//!
//! The order matters: the board check needs the catalog, and the script
//! registry must be complete before the catalog's script references can be
//! confirmed. Validation halts at the first failing stage; the error carries
//! that stage, and no partially built `Set` is ever returned.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::board::parse_board;
use crate::conditions::{Condition, ConditionCategory, ConditionLoader};
use crate::pieces::PieceCatalog;
use crate::scripts::{ScriptLoader, ScriptRegistry};

use super::error::{SetError, Stage, ValidationError};
use super::source::SetSource;
use super::Set;

/// Read a set directory and validate it into a `Set`.
///
/// This is the crate's main entry point.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Set, ValidationError> {
    let source = SetSource::from_dir(path.as_ref())?;
    validate(&source)
}

/// Validate an already-read source bundle with the builtin rule-unit and
/// condition kinds.
pub fn validate(source: &SetSource) -> Result<Set, ValidationError> {
    validate_with(source, &ScriptLoader::new(), &ConditionLoader::new())
}

/// Validate with caller-supplied loaders, so embedders can register custom
/// rule-unit or condition kinds first.
pub fn validate_with(
    source: &SetSource,
    script_loader: &ScriptLoader,
    condition_loader: &ConditionLoader,
) -> Result<Set, ValidationError> {
    // Stage 1: the piece catalog, a pure record transform.
    let pieces = PieceCatalog::from_records(
        source.pieces.iter().map(|(n, t)| (n.as_str(), t.as_str())),
    )
    .map_err(|e| ValidationError::new(Stage::Pieces, e))?;

    // Stage 2: the script registry, then both directions of reference:
    // catalog -> registry (declared script names) and registry -> catalog
    // (piece kinds named by script parameters).
    let scripts = script_loader
        .load(source.scripts.iter().map(|(n, t)| (n.as_str(), t.as_str())))
        .map_err(|e| ValidationError::new(Stage::PieceScripts, e))?;

    let mut defs: Vec<_> = pieces.iter().collect();
    defs.sort_by(|a, b| a.kind.cmp(&b.kind));
    for def in defs {
        for script in &def.scripts {
            scripts
                .resolve(script, &format!("piece {}", def.kind))
                .map_err(|e| ValidationError::new(Stage::PieceScripts, e))?;
        }
    }
    let mut units: Vec<_> = scripts.iter().collect();
    units.sort_by(|a, b| a.name().cmp(b.name()));
    for script in units {
        for kind in script.piece_kind_refs() {
            if !pieces.contains(kind) {
                return Err(ValidationError::new(
                    Stage::PieceScripts,
                    SetError::UnknownKindRef {
                        kind: kind.clone(),
                        referenced_by: format!("script {}", script.name()),
                    },
                ));
            }
        }
    }

    // Stage 3: the board, then every occupied cell against the catalog.
    let board =
        parse_board(&source.board).map_err(|e| ValidationError::new(Stage::Board, e))?;
    for (at, _owner, kind) in board.occupied() {
        if !pieces.contains(kind) {
            return Err(ValidationError::new(
                Stage::Board,
                SetError::UnknownPieceKind { at, kind: kind.clone() },
            ));
        }
    }

    // Stages 4 and 5: conditions, each checked against registry and catalog.
    let win_conditions = load_conditions(
        condition_loader,
        ConditionCategory::Win,
        &source.win,
        Stage::WinConditions,
        &scripts,
        &pieces,
    )?;
    let lose_conditions = load_conditions(
        condition_loader,
        ConditionCategory::Lose,
        &source.lose,
        Stage::LoseConditions,
        &scripts,
        &pieces,
    )?;

    info!(
        set = %source.name,
        pieces = pieces.len(),
        scripts = scripts.len(),
        "set validated"
    );

    Ok(Set::new(
        source.name.clone(),
        board,
        pieces,
        scripts,
        win_conditions,
        lose_conditions,
    ))
}

fn load_conditions(
    loader: &ConditionLoader,
    category: ConditionCategory,
    text: &str,
    stage: Stage,
    scripts: &ScriptRegistry,
    pieces: &PieceCatalog,
) -> Result<Vec<Arc<dyn Condition>>, ValidationError> {
    let conditions = loader
        .load(category, text)
        .map_err(|e| ValidationError::new(stage, e))?;

    for condition in &conditions {
        for script in condition.script_refs() {
            scripts
                .resolve(script, &format!("condition {:?}", condition.name()))
                .map_err(|e| ValidationError::new(stage, e))?;
        }
        for kind in condition.piece_kind_refs() {
            if !pieces.contains(kind) {
                return Err(ValidationError::new(
                    stage,
                    SetError::UnknownKindRef {
                        kind: kind.clone(),
                        referenced_by: format!("condition {:?}", condition.name()),
                    },
                ));
            }
        }
    }
    Ok(conditions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Coord;
    use crate::pieces::PieceError;
    use crate::scripts::ScriptError;

    fn minimal_source() -> SetSource {
        SetSource {
            name: "mini".to_string(),
            board: "2|2|[[\"\",\"\"],[\"\",\"p1_king\"]]".to_string(),
            pieces: vec![("king".to_string(), "K|0x183C187E7E3C3C7E".to_string())],
            scripts: Vec::new(),
            win: String::new(),
            lose: String::new(),
        }
    }

    #[test]
    fn test_minimal_set_validates() {
        let set = validate(&minimal_source()).unwrap();

        assert_eq!(set.name(), "mini");
        assert_eq!(set.pieces().len(), 1);
        assert_eq!(set.board().occupied().count(), 1);

        let (at, owner, kind) = set.board().occupied().next().unwrap();
        assert_eq!(at, Coord::new(1, 1));
        assert_eq!(owner.raw(), 1);
        assert_eq!(kind.as_str(), "king");
    }

    #[test]
    fn test_unknown_board_kind_fails_at_board_stage() {
        let mut source = minimal_source();
        source.board = "2|2|[[\"\",\"\"],[\"\",\"p1_queen\"]]".to_string();

        let err = validate(&source).unwrap_err();
        assert_eq!(err.stage, Stage::Board);
        assert!(matches!(err.source, SetError::UnknownPieceKind { .. }));
    }

    #[test]
    fn test_piece_script_ref_fails_at_piece_scripts_stage() {
        let mut source = minimal_source();
        source.pieces = vec![(
            "king".to_string(),
            "K|0x183C187E7E3C3C7E|castle".to_string(),
        )];

        let err = validate(&source).unwrap_err();
        assert_eq!(err.stage, Stage::PieceScripts);
        assert!(matches!(err.source, SetError::Script(ScriptError::NotFound { .. })));
    }

    #[test]
    fn test_empty_pieces_fails_at_pieces_stage() {
        let mut source = minimal_source();
        source.pieces.clear();

        let err = validate(&source).unwrap_err();
        assert_eq!(err.stage, Stage::Pieces);
        assert!(matches!(err.source, SetError::Piece(PieceError::EmptyCatalog)));
    }

    #[test]
    fn test_earlier_stage_shadows_later_fault() {
        // Both the pieces stage and the lose stage are faulty; the pieces
        // stage must be the one reported.
        let mut source = minimal_source();
        source.pieces = vec![("king".to_string(), "KK|bad".to_string())];
        source.lose = "no_such_condition\n".to_string();

        let err = validate(&source).unwrap_err();
        assert_eq!(err.stage, Stage::Pieces);
    }

    #[test]
    fn test_lose_stage_fault_reported_when_everything_else_is_clean() {
        let mut source = minimal_source();
        source.lose = "no_such_condition\n".to_string();

        let err = validate(&source).unwrap_err();
        assert_eq!(err.stage, Stage::LoseConditions);
        assert!(matches!(err.source, SetError::Condition(_)));
    }

    #[test]
    fn test_condition_script_ref_fails_at_condition_stage() {
        let mut source = minimal_source();
        source.win = "script domination\n".to_string();

        let err = validate(&source).unwrap_err();
        assert_eq!(err.stage, Stage::WinConditions);
        assert!(matches!(err.source, SetError::Script(ScriptError::NotFound { .. })));
    }

    #[test]
    fn test_condition_kind_ref_fails_at_condition_stage() {
        let mut source = minimal_source();
        source.lose = "piece_extinct ghost\n".to_string();

        let err = validate(&source).unwrap_err();
        assert_eq!(err.stage, Stage::LoseConditions);
        assert!(matches!(err.source, SetError::UnknownKindRef { .. }));
    }

    #[test]
    fn test_script_kind_param_checked_against_catalog() {
        let mut source = minimal_source();
        source.pieces = vec![
            ("king".to_string(), "K|0x183C187E7E3C3C7E".to_string()),
            ("pawn".to_string(), "P|0x183C3C1818183C7E|pawn_moves".to_string()),
        ];
        source.scripts = vec![(
            "pawn_moves".to_string(),
            "kind=pawn\npromotes_to=empress\n".to_string(),
        )];

        let err = validate(&source).unwrap_err();
        assert_eq!(err.stage, Stage::PieceScripts);
        assert!(matches!(err.source, SetError::UnknownKindRef { .. }));
    }
}
