//! Persisted Entry Store
//!
//! The narrow contract the repository-backed provider consumes, plus two
//! implementations: a pooled SQLite store for real deployments and an
//! in-memory store for tests and ephemeral embedders.

mod memory;
mod sqlite;

pub use memory::MemoryEntryStore;
pub use sqlite::SqliteEntryStore;

use crate::types::{ConfigEntry, Result};

/// A persisted store of [`ConfigEntry`] rows.
///
/// Implementations should enforce name uniqueness; where they cannot,
/// `find_by_name` must still resolve duplicates deterministically by taking
/// the last-inserted entry.
pub trait EntryStore: Send + Sync {
    /// Full snapshot of every stored entry, in insertion order.
    fn all(&self) -> Result<Vec<ConfigEntry>>;

    /// Exact-match lookup by name. On duplicate names, the last-inserted
    /// entry wins.
    fn find_by_name(&self, name: &str) -> Result<Option<ConfigEntry>>;

    /// Insert a new entry. Fails if the store enforces uniqueness and the
    /// name already exists.
    fn add(&self, entry: &ConfigEntry) -> Result<()>;

    /// Replace the value of an existing entry, matched by name.
    fn update(&self, entry: &ConfigEntry) -> Result<()>;

    /// Insert-or-update `name` to `value`: insert when missing, update when
    /// the stored value differs, no-op when unchanged. Returns `Ok(true)`
    /// barring storage failure.
    ///
    /// The default is a non-transactional composition of the other methods;
    /// stores with real transactions should override it so the read and the
    /// write share one scope.
    fn set_value(&self, name: &str, value: Option<&str>) -> Result<bool> {
        let entry = ConfigEntry {
            name: name.to_string(),
            value: value.map(str::to_string),
        };
        match self.find_by_name(name)? {
            None => self.add(&entry)?,
            Some(existing) if existing.value.as_deref() != value => self.update(&entry)?,
            Some(_) => {}
        }
        Ok(true)
    }
}
