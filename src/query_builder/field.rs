use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum accepted length of a field reference
pub const MAX_FIELD_LEN: usize = 128;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid field name '{field}': {reason}")]
pub struct InvalidField {
    pub field: String,
    pub reason: &'static str,
}

/// Sanitized document field reference
///
/// Accepts dotted identifiers (`bk_os_type`, `property.cpu`) only. Operator
/// prefixes such as `$` and any other punctuation are rejected, so the value
/// can be embedded as a pipeline variable without reaching the query language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupField(String);

impl GroupField {
    pub fn new(field: impl Into<String>) -> Result<Self, InvalidField> {
        let field = field.into();
        let invalid = |reason| InvalidField {
            field: field.clone(),
            reason,
        };

        if field.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if field.len() > MAX_FIELD_LEN {
            return Err(invalid("too long"));
        }
        for segment in field.split('.') {
            let mut chars = segment.chars();
            match chars.next() {
                Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
                Some(_) => return Err(invalid("segment must start with a letter or underscore")),
                None => return Err(invalid("empty path segment")),
            }
            if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(invalid("only letters, digits and underscores are allowed"));
            }
        }
        Ok(Self(field))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pipeline variable referencing this field's value, e.g. `$bk_os_type`
    pub fn variable(&self) -> String {
        format!("${}", self.0)
    }
}

impl fmt::Display for GroupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GroupField {
    type Error = InvalidField;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for GroupField {
    type Error = InvalidField;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GroupField> for String {
    fn from(field: GroupField) -> Self {
        field.0
    }
}
