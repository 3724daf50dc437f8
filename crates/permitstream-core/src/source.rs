use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

const MAX_SOURCE_ID_LEN: usize = 64;

/// Validated source identifier.
///
/// A lowercase ASCII slug (`a-z`, `0-9`, `_`), starting with a letter.
/// Doubles as the directory name in the snapshot store, so the character
/// set is deliberately filesystem-safe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceId(String);

impl SourceId {
    pub fn new(value: impl Into<String>) -> Result<Self, FetchError> {
        let value = value.into();
        if value.is_empty() {
            return Err(FetchError::invalid_request("source id cannot be empty"));
        }
        if value.len() > MAX_SOURCE_ID_LEN {
            return Err(FetchError::invalid_request(format!(
                "source id '{value}' exceeds {MAX_SOURCE_ID_LEN} characters"
            )));
        }
        let mut chars = value.chars();
        let first = chars.next().unwrap_or('_');
        if !first.is_ascii_lowercase() {
            return Err(FetchError::invalid_request(format!(
                "source id '{value}' must start with a lowercase letter"
            )));
        }
        for (index, ch) in value.char_indices() {
            if !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_') {
                return Err(FetchError::invalid_request(format!(
                    "source id '{value}' has invalid character '{ch}' at index {index}"
                )));
            }
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SourceId {
    type Error = FetchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SourceId> for String {
    fn from(value: SourceId) -> Self {
        value.0
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
