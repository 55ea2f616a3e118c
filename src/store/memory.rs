//! In-memory entry store for tests and ephemeral embedders.

use std::sync::RwLock;

use crate::types::{ConfigEntry, ConfigError, Result};

use super::EntryStore;

/// A store over an insertion-ordered vector behind an `RwLock`.
///
/// Unlike the SQLite store it does not enforce name uniqueness, which makes it
/// useful for exercising the duplicate-tolerance contract: `find_by_name`
/// returns the last-inserted match.
#[derive(Debug, Default)]
pub struct MemoryEntryStore {
    entries: RwLock<Vec<ConfigEntry>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry directly, bypassing the upsert logic. Test seam for
    /// constructing duplicate-name anomalies.
    pub fn push(&self, entry: ConfigEntry) {
        self.entries
            .write()
            .expect("entry store lock poisoned")
            .push(entry);
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<ConfigEntry>>> {
        self.entries
            .read()
            .map_err(|_| ConfigError::Storage("entry store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<ConfigEntry>>> {
        self.entries
            .write()
            .map_err(|_| ConfigError::Storage("entry store lock poisoned".to_string()))
    }
}

impl EntryStore for MemoryEntryStore {
    fn all(&self) -> Result<Vec<ConfigEntry>> {
        Ok(self.read()?.clone())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<ConfigEntry>> {
        Ok(self
            .read()?
            .iter()
            .rev()
            .find(|entry| entry.name == name)
            .cloned())
    }

    fn add(&self, entry: &ConfigEntry) -> Result<()> {
        self.write()?.push(entry.clone());
        Ok(())
    }

    fn update(&self, entry: &ConfigEntry) -> Result<()> {
        let mut entries = self.write()?;
        for existing in entries.iter_mut().filter(|e| e.name == entry.name) {
            existing.value = entry.value.clone();
        }
        Ok(())
    }

    fn set_value(&self, name: &str, value: Option<&str>) -> Result<bool> {
        // Single write lock stands in for a transaction scope.
        let mut entries = self.write()?;
        match entries.iter().rposition(|e| e.name == name) {
            None => entries.push(ConfigEntry {
                name: name.to_string(),
                value: value.map(str::to_string),
            }),
            Some(pos) if entries[pos].value.as_deref() != value => {
                entries[pos].value = value.map(str::to_string);
            }
            Some(_) => {}
        }
        Ok(true)
    }
}
