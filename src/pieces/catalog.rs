//! Piece catalog: kind name -> definition lookup.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::core::PieceKindId;

use super::definition::PieceDefinition;
use super::record::parse_piece_record;
use super::PieceError;

/// Catalog of piece definitions for one set.
///
/// Keys are the file-derived kind names; uniqueness is case-sensitive.
#[derive(Clone, Debug, Default)]
pub struct PieceCatalog {
    pieces: FxHashMap<PieceKindId, PieceDefinition>,
}

impl PieceCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `(name, record text)` pairs into a catalog.
    ///
    /// This is the piece loading stage: a pure transform with no
    /// cross-references into boards or scripts.
    pub fn from_records<'a, I>(records: I) -> Result<Self, PieceError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut catalog = Self::new();
        for (name, text) in records {
            let kind = PieceKindId::new(name);
            let def = parse_piece_record(&kind, text)?;
            catalog.insert(def)?;
        }
        if catalog.is_empty() {
            return Err(PieceError::EmptyCatalog);
        }
        debug!(pieces = catalog.len(), "loaded piece catalog");
        Ok(catalog)
    }

    /// Insert a definition, rejecting duplicate kind names.
    pub fn insert(&mut self, def: PieceDefinition) -> Result<(), PieceError> {
        if self.pieces.contains_key(&def.kind) {
            return Err(PieceError::DuplicatePieceName { name: def.kind });
        }
        self.pieces.insert(def.kind.clone(), def);
        Ok(())
    }

    /// Look up a definition by kind.
    #[must_use]
    pub fn get(&self, kind: &PieceKindId) -> Option<&PieceDefinition> {
        self.pieces.get(kind)
    }

    /// Whether a kind is defined.
    #[must_use]
    pub fn contains(&self, kind: &PieceKindId) -> bool {
        self.pieces.contains_key(kind)
    }

    /// Number of defined kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Iterate over all definitions (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &PieceDefinition> {
        self.pieces.values()
    }

    /// Kind names in sorted order, for deterministic reporting.
    #[must_use]
    pub fn sorted_kinds(&self) -> Vec<&PieceKindId> {
        let mut kinds: Vec<&PieceKindId> = self.pieces.keys().collect();
        kinds.sort();
        kinds
    }
}
