//! Raw set sources.
//!
//! `SetSource` is the text bundle the validator consumes: the board
//! descriptor, one record per piece, one declaration per script, and the two
//! condition files. `from_dir` performs the one-shot directory read; tests
//! and embedding callers can also assemble a source entirely in memory and
//! never touch the filesystem.

use std::fs;
use std::path::Path;

use tracing::debug;

use super::error::{SetError, Stage, ValidationError};

/// Standard name for the board file in a set.
const BOARD_FILE: &str = "board.csv";

/// Standard names for the condition files in a set.
const WIN_FILE: &str = "win.rules";
const LOSE_FILE: &str = "lose.rules";

/// Directory of piece records inside a set.
const PIECES_DIR: &str = "pieces";

/// Directory of script declarations inside a set.
const SCRIPTS_DIR: &str = "scripts";

/// The raw text of one set, before any parsing or validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SetSource {
    /// Set name, derived from the directory name.
    pub name: String,

    /// Contents of the board file.
    pub board: String,

    /// `(kind name, record text)` pairs, sorted by name.
    pub pieces: Vec<(String, String)>,

    /// `(script name, declaration text)` pairs, sorted by name.
    pub scripts: Vec<(String, String)>,

    /// Contents of the win condition file.
    pub win: String,

    /// Contents of the lose condition file.
    pub lose: String,
}

impl SetSource {
    /// Read a set directory into a source bundle.
    ///
    /// Files are visited in validation-stage order so a set missing several
    /// parts reports the earliest stage. Within a directory, entries are
    /// sorted by name for deterministic loading.
    pub fn from_dir(path: &Path) -> Result<SetSource, ValidationError> {
        if !path.is_dir() {
            return Err(ValidationError::new(
                Stage::SetRoot,
                SetError::SetNotFound { path: path.to_path_buf() },
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let pieces_dir = path.join(PIECES_DIR);
        if !pieces_dir.is_dir() {
            return Err(ValidationError::new(
                Stage::Pieces,
                SetError::MissingEntry { what: "pieces directory", path: pieces_dir },
            ));
        }
        let pieces = read_stem_files(&pieces_dir, "csv", Stage::Pieces)?;

        // A set without special rules simply has no scripts directory.
        let scripts_dir = path.join(SCRIPTS_DIR);
        let scripts = if scripts_dir.is_dir() {
            read_stem_files(&scripts_dir, "rules", Stage::PieceScripts)?
        } else {
            Vec::new()
        };

        let board = read_file(&path.join(BOARD_FILE), "board file", Stage::Board)?;
        let win = read_file(&path.join(WIN_FILE), "win definition", Stage::WinConditions)?;
        let lose = read_file(&path.join(LOSE_FILE), "lose definition", Stage::LoseConditions)?;

        debug!(
            set = %name,
            pieces = pieces.len(),
            scripts = scripts.len(),
            "read set directory"
        );

        Ok(SetSource { name, board, pieces, scripts, win, lose })
    }
}

fn read_file(path: &Path, what: &'static str, stage: Stage) -> Result<String, ValidationError> {
    if !path.is_file() {
        return Err(ValidationError::new(
            stage,
            SetError::MissingEntry { what, path: path.to_path_buf() },
        ));
    }
    fs::read_to_string(path).map_err(|source| {
        ValidationError::new(stage, SetError::Io { path: path.to_path_buf(), source })
    })
}

/// Read every `*.{ext}` file in a directory as `(stem, contents)`, sorted.
fn read_stem_files(
    dir: &Path,
    ext: &str,
    stage: Stage,
) -> Result<Vec<(String, String)>, ValidationError> {
    let io_err = |source| {
        ValidationError::new(stage, SetError::Io { path: dir.to_path_buf(), source })
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(ext) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let contents = fs::read_to_string(&path).map_err(|source| {
            ValidationError::new(stage, SetError::Io { path: path.clone(), source })
        })?;
        files.push((stem.to_string(), contents));
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_root_reports_set_root_stage() {
        let err = SetSource::from_dir(Path::new("/nonexistent/set")).unwrap_err();
        assert_eq!(err.stage, Stage::SetRoot);
        assert!(matches!(err.source, SetError::SetNotFound { .. }));
    }

    #[test]
    fn test_in_memory_source_needs_no_filesystem() {
        let source = SetSource {
            name: "mini".to_string(),
            board: "1|1|[[\"p1_king\"]]".to_string(),
            pieces: vec![("king".to_string(), "K|0x183C187E7E3C3C7E".to_string())],
            ..SetSource::default()
        };
        assert_eq!(source.pieces.len(), 1);
    }
}
