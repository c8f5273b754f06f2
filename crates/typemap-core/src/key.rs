//! Node identity: a type's declared name paired with its owning module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Composite key identifying a type within one scan.
///
/// The textual form is `"<name> <module>"`, e.g. `"object builtins"`. A key
/// survives that form unchanged only when the name has no whitespace and the
/// module is non-empty without surrounding whitespace; see [`TypeKey::check`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TypeKey {
    name: String,
    module: String,
}

/// Error returned when a string is not a valid `"<name> <module>"` key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid type key {input:?}: expected \"<name> <module>\"")]
pub struct KeyParseError {
    pub input: String,
}

impl TypeKey {
    /// Build a key without checking it. Use [`TypeKey::try_new`] for input
    /// that may not survive persistence.
    pub fn new(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
        }
    }

    /// Build a key that is guaranteed to round-trip through its textual form.
    pub fn try_new(
        name: impl Into<String>,
        module: impl Into<String>,
    ) -> Result<Self, KeyParseError> {
        let key = Self::new(name, module);
        key.check()?;
        Ok(key)
    }

    /// Whether the `"<name> <module>"` form parses back to this exact key.
    pub fn check(&self) -> Result<(), KeyParseError> {
        let name_ok = !self.name.is_empty() && !self.name.chars().any(char::is_whitespace);
        let module_ok = !self.module.is_empty() && self.module.trim() == self.module;
        if name_ok && module_ok {
            Ok(())
        } else {
            Err(KeyParseError {
                input: self.to_string(),
            })
        }
    }

    /// The root of every Python class hierarchy.
    pub fn object() -> Self {
        Self::new("object", "builtins")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module(&self) -> &str {
        &self.module
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.module)
    }
}

impl FromStr for TypeKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || KeyParseError {
            input: s.to_string(),
        };
        let (name, module) = s.split_once(' ').ok_or_else(invalid)?;
        Self::try_new(name, module).map_err(|_| invalid())
    }
}

impl From<TypeKey> for String {
    fn from(key: TypeKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for TypeKey {
    type Error = KeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
