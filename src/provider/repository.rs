//! Provider backed by a persisted entry store.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::store::EntryStore;
use crate::types::{ConfigEntry, Result};

use super::{ConfigProvider, ProviderKind};

/// A writable configuration provider that reads and persists entries through
/// an [`EntryStore`].
///
/// Duplicate names in the store are a data-integrity anomaly the store's
/// uniqueness constraint should prevent; lookups tolerate them by taking the
/// last-inserted entry rather than failing.
pub struct RepositoryProvider<S: EntryStore + ?Sized> {
    store: Arc<S>,
}

impl<S: EntryStore + ?Sized> RepositoryProvider<S> {
    /// Create a provider over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The store this provider was constructed with.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

impl<S: EntryStore + ?Sized> ConfigProvider for RepositoryProvider<S> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::PrimaryStore
    }

    fn can_write(&self) -> bool {
        true
    }

    fn get_configuration(&self, key: &str) -> Result<Option<String>> {
        Ok(self.store.find_by_name(key)?.and_then(|entry| entry.value))
    }

    fn all_configurations(&self) -> Result<HashMap<String, Option<String>>> {
        // all() is insertion-ordered, so on duplicates the last insert wins.
        Ok(self
            .store
            .all()?
            .into_iter()
            .map(|entry| (entry.name, entry.value))
            .collect())
    }

    fn set_configuration(&self, key: &str, value: Option<&str>) -> Result<bool> {
        let changed = self.store.set_value(key, value)?;
        debug!(key = %key, changed, "persisted configuration");
        Ok(changed)
    }

    fn get_entry(&self, name: &str) -> Result<Option<ConfigEntry>> {
        self.store.find_by_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryEntryStore;

    fn provider_with(entries: &[ConfigEntry]) -> RepositoryProvider<MemoryEntryStore> {
        let store = Arc::new(MemoryEntryStore::new());
        for entry in entries {
            store.push(entry.clone());
        }
        RepositoryProvider::new(store)
    }

    #[test]
    fn test_lookup_by_name() {
        let provider = provider_with(&[
            ConfigEntry::new("SiteName", "stratify"),
            ConfigEntry::unset("Theme"),
        ]);

        assert_eq!(
            provider.get_configuration("SiteName").unwrap(),
            Some("stratify".to_string())
        );
        // An explicitly unset entry reads as no value.
        assert_eq!(provider.get_configuration("Theme").unwrap(), None);
        assert_eq!(provider.get_configuration("Missing").unwrap(), None);
    }

    #[test]
    fn test_duplicate_names_resolve_to_last_inserted() {
        let provider = provider_with(&[
            ConfigEntry::new("Key", "first"),
            ConfigEntry::new("Key", "second"),
        ]);

        assert_eq!(
            provider.get_configuration("Key").unwrap(),
            Some("second".to_string())
        );
    }

    #[test]
    fn test_entry_lookup_preserves_unset_state() {
        let provider = provider_with(&[ConfigEntry::unset("Theme")]);

        let entry = provider.get_entry("Theme").unwrap().unwrap();
        assert_eq!(entry, ConfigEntry::unset("Theme"));
        assert!(provider.get_entry("Missing").unwrap().is_none());
    }

    #[test]
    fn test_set_inserts_then_updates() {
        let provider = provider_with(&[]);

        assert!(provider.set_configuration("Key", Some("1")).unwrap());
        assert_eq!(
            provider.get_configuration("Key").unwrap(),
            Some("1".to_string())
        );

        assert!(provider.set_configuration("Key", Some("2")).unwrap());
        assert_eq!(
            provider.get_configuration("Key").unwrap(),
            Some("2".to_string())
        );
    }

    #[test]
    fn test_snapshot_includes_unset_entries() {
        let provider = provider_with(&[
            ConfigEntry::new("A", "1"),
            ConfigEntry::unset("B"),
        ]);

        let all = provider.all_configurations().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["A"], Some("1".to_string()));
        assert_eq!(all["B"], None);
    }
}
