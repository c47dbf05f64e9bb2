// src/select/key.rs
// Content-based identity for candidate lists

use serde::Serialize;
use std::fmt;

use crate::error::KeyError;

/// Identity of a candidate list within a session.
///
/// Two calls that share a key and a user share usage history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionKey(String);

impl SelectionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SelectionKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SelectionKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Derive a key from the candidates' canonical JSON text.
///
/// Values go through `serde_json::Value` first, so object fields come out in
/// sorted order and structurally equal lists map to the same key regardless of
/// how their maps were built. Fails with `KeyError::Unsupported` when a value's
/// `Serialize` impl errors or a map has non-string keys, and with
/// `KeyError::Empty` for an empty list.
pub fn derive_key<T: Serialize>(items: &[T]) -> Result<SelectionKey, KeyError> {
    if items.is_empty() {
        return Err(KeyError::Empty);
    }
    let canonical = serde_json::to_value(items)?;
    Ok(SelectionKey(canonical.to_string()))
}
