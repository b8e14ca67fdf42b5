//! Script declaration parsing.
//!
//! A script file is a flat `key=value` list. The `kind` key selects which
//! registered rule-unit kind builds the script; every other key is a
//! parameter interpreted by that kind:
//!
//! ```text
//! # how a rook moves
//! kind=slide
//! directions=1,0;-1,0;0,1;0,-1
//! multi_step=true
//! ```

use rustc_hash::FxHashMap;

use crate::core::ScriptName;

use super::ScriptError;

/// A parsed script declaration, not yet resolved to a rule unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptDecl {
    /// The script's name (file-derived).
    pub name: ScriptName,

    /// The rule-unit kind that builds this script.
    pub kind: String,

    /// Kind-specific parameters.
    pub params: FxHashMap<String, String>,
}

impl ScriptDecl {
    /// Get a parameter value.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// A `LoadFailure` error for this declaration.
    pub(crate) fn fail(&self, detail: impl Into<String>) -> ScriptError {
        ScriptError::LoadFailure {
            name: self.name.clone(),
            detail: detail.into(),
        }
    }
}

/// Parse one declaration file.
pub fn parse_script_decl(name: &str, text: &str) -> Result<ScriptDecl, ScriptError> {
    let name = ScriptName::new(name);
    let fail = |detail: String| ScriptError::LoadFailure { name: name.clone(), detail };

    let mut kind = None;
    let mut params = FxHashMap::default();

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| fail(format!("line {}: expected key=value", lineno + 1)))?;
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            return Err(fail(format!("line {}: empty key", lineno + 1)));
        }

        if key == "kind" {
            if kind.replace(value.to_string()).is_some() {
                return Err(fail(format!("line {}: duplicate kind", lineno + 1)));
            }
        } else if params.insert(key.to_string(), value.to_string()).is_some() {
            return Err(fail(format!("line {}: duplicate parameter {key}", lineno + 1)));
        }
    }

    let kind = kind.ok_or_else(|| fail("missing kind".to_string()))?;

    Ok(ScriptDecl { name, kind, params })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decl() {
        let decl = parse_script_decl(
            "rook_moves",
            "# rook\nkind=slide\ndirections=1,0;-1,0\nmulti_step=true\n",
        )
        .unwrap();

        assert_eq!(decl.name, ScriptName::new("rook_moves"));
        assert_eq!(decl.kind, "slide");
        assert_eq!(decl.param("directions"), Some("1,0;-1,0"));
        assert_eq!(decl.param("multi_step"), Some("true"));
        assert_eq!(decl.param("missing"), None);
    }

    #[test]
    fn test_missing_kind() {
        let err = parse_script_decl("x", "directions=1,0\n").unwrap_err();
        assert!(matches!(err, ScriptError::LoadFailure { .. }));
    }

    #[test]
    fn test_bad_line() {
        let err = parse_script_decl("x", "kind=slide\nnot a pair\n").unwrap_err();
        assert!(matches!(err, ScriptError::LoadFailure { .. }));
    }

    #[test]
    fn test_duplicate_parameter() {
        let err = parse_script_decl("x", "kind=slide\na=1\na=2\n").unwrap_err();
        assert!(matches!(err, ScriptError::LoadFailure { .. }));
    }

    #[test]
    fn test_value_may_contain_equals() {
        let decl = parse_script_decl("x", "kind=custom\nexpr=a=b\n").unwrap();
        assert_eq!(decl.param("expr"), Some("a=b"));
    }
}
