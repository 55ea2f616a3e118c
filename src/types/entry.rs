//! Core data model: configuration entries and change notifications.
//!
//! A `ConfigEntry` is one name/value pair as a provider reports it. The value
//! is `Option<String>` because "known to be unset" (`None`) is a real state,
//! distinct from an empty string and from a key no provider has ever seen.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single configuration item. Identity is `name`, case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Unique key for the entry.
    pub name: String,
    /// Current value; `None` means explicitly unset.
    pub value: Option<String>,
}

impl ConfigEntry {
    /// Create an entry with a concrete value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Create an entry that is known but has no value.
    pub fn unset(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Whether the entry carries a concrete value.
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }
}

impl fmt::Display for ConfigEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => write!(f, "{}=<unset>", self.name),
        }
    }
}

/// Inbound notification that an entry was persisted or updated upstream.
///
/// Delivery is at-least-once and unordered relative to unrelated writes; the
/// resolver reacts by unconditionally evicting the entry from its cache.
#[derive(Debug, Clone)]
pub struct EntryUpdated {
    /// The entry that changed.
    pub target: ConfigEntry,
}

impl EntryUpdated {
    pub fn new(target: ConfigEntry) -> Self {
        Self { target }
    }
}
