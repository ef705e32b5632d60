//! Assessment of a string as a possible sprite name.
//!
//! A sprite becomes a Python class when the program is flattened, so its
//! name must be a Python identifier that is also usable as a class name.
//! The syntax questions are delegated to a [`NameOracle`]; [`PythonNames`]
//! is a self-contained oracle covering identifiers and reserved words.

use serde::{Deserialize, Serialize};

use crate::actor::STAGE_NAME;

/// Outcome of checking a candidate sprite name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NameValidity {
    Valid,
    Invalid { reason: String },
}

impl NameValidity {
    pub fn is_valid(&self) -> bool {
        matches!(self, NameValidity::Valid)
    }

    fn invalid_because(reason: impl Into<String>) -> Self {
        NameValidity::Invalid {
            reason: reason.into(),
        }
    }
}

/// Language front-end questions needed to validate a name.
pub trait NameOracle {
    /// Whether `candidate` is lexically an identifier. Keywords may pass.
    fn is_identifier(&self, candidate: &str) -> bool;

    /// Whether `source` parses as a class definition.
    fn parses_as_class_definition(&self, source: &str) -> bool;
}

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Built-in oracle for Python 3 names.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonNames;

impl NameOracle for PythonNames {
    fn is_identifier(&self, candidate: &str) -> bool {
        let mut chars = candidate.chars();
        match chars.next() {
            Some(c) if c == '_' || c.is_alphabetic() => {}
            _ => return false,
        }
        chars.all(|c| c == '_' || c.is_alphanumeric())
    }

    // Only the shape produced by `name_validity()` is recognised:
    // `class <Name>:` followed by an indented `pass`.
    fn parses_as_class_definition(&self, source: &str) -> bool {
        let Some((header, body)) = source.split_once('\n') else {
            return false;
        };
        let Some(name) = header
            .strip_prefix("class ")
            .and_then(|rest| rest.strip_suffix(':'))
        else {
            return false;
        };
        let body_ok = body.starts_with(char::is_whitespace) && body.trim() == "pass";

        body_ok && self.is_identifier(name) && !PYTHON_KEYWORDS.contains(&name)
    }
}

/// Assesses `candidate` as the name of a new sprite, given the names of
/// the sprites which already exist.
///
/// Checks run in a fixed order, so the reason reported is the first one
/// that applies.
pub fn name_validity<O, S>(oracle: &O, existing_names: &[S], candidate: &str) -> NameValidity
where
    O: NameOracle + ?Sized,
    S: AsRef<str>,
{
    if candidate == STAGE_NAME {
        return NameValidity::invalid_because("you cannot have a Sprite called \"Stage\"");
    }

    if candidate.is_empty() {
        return NameValidity::invalid_because("it is empty");
    }

    if !oracle.is_identifier(candidate) {
        return NameValidity::invalid_because("it does not follow the rules for names");
    }

    if existing_names.iter().any(|n| n.as_ref() == candidate) {
        return NameValidity::invalid_because(format!(
            "there is already a Sprite called {}",
            candidate
        ));
    }

    let class_def = format!("class {}:\n pass", candidate);
    if !oracle.parses_as_class_definition(&class_def) {
        return NameValidity::invalid_because("it is a reserved name");
    }

    NameValidity::Valid
}

/// Returns the first of `Sprite1`, `Sprite2`, ... not in `existing_names`.
pub fn unused_sprite_name<S: AsRef<str>>(existing_names: &[S]) -> String {
    (1..)
        .map(|suffix: u32| format!("Sprite{}", suffix))
        .find(|name| !existing_names.iter().any(|n| n.as_ref() == name))
        .unwrap_or_default()
}
