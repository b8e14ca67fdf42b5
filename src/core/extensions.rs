//! Per-script auxiliary game state.
//!
//! Rule units sometimes need to persist data across turns: whether a player
//! has castled, a flag set by a custom script, and so on. Rather than letting
//! scripts reach into the state object directly (which would couple the state
//! type to arbitrary rule modules), each script gets its own `i64` key-value
//! namespace inside the game state. Two scripts can use the same key without
//! colliding.

use rustc_hash::FxHashMap;

use super::ids::ScriptName;

/// Namespaced key-value storage for rule-unit state.
///
/// Values are `i64`, matching the convention used elsewhere in the engine:
/// booleans are 0/1, small enums their discriminants.
#[derive(Clone, Debug, Default)]
pub struct ScriptStateBag {
    values: FxHashMap<ScriptName, FxHashMap<String, i64>>,
}

impl ScriptStateBag {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value from a script's namespace, with a default.
    #[must_use]
    pub fn get(&self, script: &ScriptName, key: &str, default: i64) -> i64 {
        self.values
            .get(script)
            .and_then(|ns| ns.get(key))
            .copied()
            .unwrap_or(default)
    }

    /// Set a value in a script's namespace.
    pub fn set(&mut self, script: &ScriptName, key: impl Into<String>, value: i64) {
        self.values
            .entry(script.clone())
            .or_default()
            .insert(key.into(), value);
    }

    /// Number of namespaces holding at least one value.
    #[must_use]
    pub fn namespace_count(&self) -> usize {
        self.values.len()
    }
}
