//! Script loading and lookup.
//!
//! The `ScriptLoader` owns a factory table mapping rule-unit kinds to
//! constructors; loading a set's declarations through it produces a
//! `ScriptRegistry` of named, ready-to-invoke rule units. The factory table
//! is the engine's extension point: a caller can register additional kinds
//! before loading and a set can then declare scripts of those kinds without
//! the core knowing their semantics.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::core::ScriptName;

use super::builtin;
use super::decl::{parse_script_decl, ScriptDecl};
use super::{Script, ScriptError};

/// Constructor for one rule-unit kind.
pub type ScriptFactory =
    Box<dyn Fn(&ScriptDecl) -> Result<Arc<dyn Script>, ScriptError> + Send + Sync>;

/// Factory table for turning declarations into rule units.
pub struct ScriptLoader {
    factories: FxHashMap<String, ScriptFactory>,
}

impl Default for ScriptLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptLoader {
    /// A loader with all builtin rule-unit kinds registered.
    #[must_use]
    pub fn new() -> Self {
        let mut loader = Self::empty();
        for (kind, factory) in builtin::builtin_factories() {
            loader.register_kind(kind, factory);
        }
        loader
    }

    /// A loader with no kinds at all.
    #[must_use]
    pub fn empty() -> Self {
        Self { factories: FxHashMap::default() }
    }

    /// Register a rule-unit kind, replacing any previous factory of the
    /// same name.
    pub fn register_kind(&mut self, kind: impl Into<String>, factory: ScriptFactory) {
        self.factories.insert(kind.into(), factory);
    }

    /// Whether a kind is registered.
    #[must_use]
    pub fn has_kind(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Load `(name, declaration text)` pairs into a registry.
    pub fn load<'a, I>(&self, decls: I) -> Result<ScriptRegistry, ScriptError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut registry = ScriptRegistry::default();
        for (name, text) in decls {
            let decl = parse_script_decl(name, text)?;
            let factory = self
                .factories
                .get(&decl.kind)
                .ok_or_else(|| decl.fail(format!("unknown rule-unit kind {:?}", decl.kind)))?;
            registry.insert(factory(&decl)?)?;
        }
        debug!(scripts = registry.len(), "loaded script registry");
        Ok(registry)
    }
}

/// Registry of loaded rule units, looked up by name on demand.
#[derive(Clone, Default)]
pub struct ScriptRegistry {
    scripts: FxHashMap<ScriptName, Arc<dyn Script>>,
}

impl ScriptRegistry {
    /// Insert a script, rejecting duplicate names.
    pub fn insert(&mut self, script: Arc<dyn Script>) -> Result<(), ScriptError> {
        let name = script.name().clone();
        if self.scripts.contains_key(&name) {
            return Err(ScriptError::LoadFailure {
                name,
                detail: "duplicate script name".to_string(),
            });
        }
        self.scripts.insert(name, script);
        Ok(())
    }

    /// Look up a script by name.
    #[must_use]
    pub fn get(&self, name: &ScriptName) -> Option<&Arc<dyn Script>> {
        self.scripts.get(name)
    }

    /// Resolve a declared dependency, reporting who referenced it on
    /// failure.
    pub fn resolve(
        &self,
        name: &ScriptName,
        referenced_by: &str,
    ) -> Result<Arc<dyn Script>, ScriptError> {
        self.scripts.get(name).cloned().ok_or_else(|| ScriptError::NotFound {
            name: name.clone(),
            referenced_by: referenced_by.to_string(),
        })
    }

    /// Whether a name is registered.
    #[must_use]
    pub fn contains(&self, name: &ScriptName) -> bool {
        self.scripts.contains_key(name)
    }

    /// Number of loaded scripts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Iterate over all loaded scripts (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Script>> {
        self.scripts.values()
    }

    /// Script names in sorted order, for deterministic reporting.
    #[must_use]
    pub fn sorted_names(&self) -> Vec<&ScriptName> {
        let mut names: Vec<&ScriptName> = self.scripts.keys().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptRegistry")
            .field("scripts", &self.sorted_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;
    use crate::scripts::{RuleContext, ScriptOutcome};

    #[test]
    fn test_load_builtin_kind() {
        let loader = ScriptLoader::new();
        let registry = loader
            .load([("rook_moves", "kind=slide\ndirections=1,0;-1,0;0,1;0,-1\nmulti_step=true\n")])
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&ScriptName::new("rook_moves")));
        assert!(registry.resolve(&ScriptName::new("rook_moves"), "test").is_ok());
    }

    #[test]
    fn test_unknown_kind_is_load_failure() {
        let loader = ScriptLoader::new();
        let err = loader.load([("weird", "kind=telekinesis\n")]).unwrap_err();
        assert!(matches!(err, ScriptError::LoadFailure { .. }));
    }

    #[test]
    fn test_resolve_missing_is_not_found() {
        let registry = ScriptRegistry::default();
        let err = registry
            .resolve(&ScriptName::new("castle"), "piece king")
            .unwrap_err();
        assert_eq!(
            err,
            ScriptError::NotFound {
                name: ScriptName::new("castle"),
                referenced_by: "piece king".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_script_name_rejected() {
        let loader = ScriptLoader::new();
        let err = loader
            .load([
                ("m", "kind=slide\ndirections=1,0\n"),
                ("m", "kind=slide\ndirections=0,1\n"),
            ])
            .unwrap_err();
        assert!(matches!(err, ScriptError::LoadFailure { .. }));
    }

    #[test]
    fn test_custom_kind_registration() {
        struct AlwaysAllow(ScriptName);
        impl Script for AlwaysAllow {
            fn name(&self) -> &ScriptName {
                &self.0
            }
            fn evaluate(&self, _state: &GameState, _ctx: &RuleContext) -> ScriptOutcome {
                ScriptOutcome::Allow
            }
        }

        let mut loader = ScriptLoader::empty();
        loader.register_kind(
            "always_allow",
            Box::new(|decl| Ok(Arc::new(AlwaysAllow(decl.name.clone())) as Arc<dyn Script>)),
        );

        assert!(loader.has_kind("always_allow"));
        assert!(!loader.has_kind("slide"));

        let registry = loader.load([("anything", "kind=always_allow\n")]).unwrap();
        assert!(registry.contains(&ScriptName::new("anything")));
    }
}
