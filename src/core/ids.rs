//! Name-based identifiers.
//!
//! Piece kinds and scripts are identified by the names of the files that
//! define them. Both are plain strings behind newtypes so the two namespaces
//! cannot be mixed up at a call site.

use serde::{Deserialize, Serialize};

/// Identifier of a piece kind, unique within a set's catalog.
///
/// This is the `<name>` part of a board cell token (`p1_king` -> `king`),
/// and the stem of the record file that defines the kind. Case-sensitive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceKindId(String);

impl PieceKindId {
    /// Create a new kind identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the kind name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PieceKindId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PieceKindId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Name of a loadable rule unit, unique within a set's script registry.
///
/// Scripts are late-bound: pieces and conditions declare dependencies by
/// name and the validator resolves them once at load time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScriptName(String);

impl ScriptName {
    /// Create a new script name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the script name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScriptName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScriptName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_id_case_sensitive() {
        assert_ne!(PieceKindId::new("King"), PieceKindId::new("king"));
        assert_eq!(PieceKindId::from("king").as_str(), "king");
    }

    #[test]
    fn test_script_name() {
        let name = ScriptName::new("en_passant");
        assert_eq!(name.to_string(), "en_passant");
    }
}
