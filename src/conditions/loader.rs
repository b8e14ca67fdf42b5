//! Condition declaration parsing and loading.
//!
//! A condition file holds one declaration per line, `<kind> [args...]`,
//! with `#` comments and blank lines ignored:
//!
//! ```text
//! # ends the game when a player runs out of kings
//! piece_extinct king
//! ```
//!
//! Declaration order is preserved; it is the evaluation order during play.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::builtin;
use super::{Condition, ConditionCategory, ConditionError};

/// One parsed declaration line, not yet resolved to a condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionDecl {
    /// The raw declaration line; doubles as the condition's display name.
    pub line: String,

    /// The condition kind (first token).
    pub kind: String,

    /// Remaining tokens.
    pub args: Vec<String>,

    /// Which file the line came from.
    pub category: ConditionCategory,
}

impl ConditionDecl {
    /// A `LoadFailure` error for this declaration.
    pub(crate) fn fail(&self, detail: impl Into<String>) -> ConditionError {
        ConditionError::LoadFailure {
            decl: self.line.clone(),
            detail: detail.into(),
        }
    }

    /// The single argument of a one-argument kind.
    pub(crate) fn single_arg(&self) -> Result<&str, ConditionError> {
        match self.args.as_slice() {
            [arg] => Ok(arg),
            _ => Err(self.fail(format!("expected exactly one argument, found {}", self.args.len()))),
        }
    }
}

/// Constructor for one condition kind.
pub type ConditionFactory =
    Box<dyn Fn(&ConditionDecl) -> Result<Arc<dyn Condition>, ConditionError> + Send + Sync>;

/// Factory table for turning declaration lines into conditions.
pub struct ConditionLoader {
    factories: FxHashMap<String, ConditionFactory>,
}

impl Default for ConditionLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionLoader {
    /// A loader with all builtin condition kinds registered.
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

    /// Register a condition kind, replacing any previous factory of the
    /// same name.
    pub fn register_kind(&mut self, kind: impl Into<String>, factory: ConditionFactory) {
        self.factories.insert(kind.into(), factory);
    }

    /// Load one category's declaration file, preserving declaration order.
    pub fn load(
        &self,
        category: ConditionCategory,
        text: &str,
    ) -> Result<Vec<Arc<dyn Condition>>, ConditionError> {
        let mut conditions = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let kind = tokens.next().unwrap_or_default().to_string();
            let decl = ConditionDecl {
                line: line.to_string(),
                kind: kind.clone(),
                args: tokens.map(str::to_string).collect(),
                category,
            };

            let factory = self
                .factories
                .get(&kind)
                .ok_or_else(|| decl.fail(format!("unknown condition kind {kind:?}")))?;
            conditions.push(factory(&decl)?);
        }
        debug!(%category, count = conditions.len(), "loaded conditions");
        Ok(conditions)
    }
}
