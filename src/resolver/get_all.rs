//! Lazy precedence-first enumeration of the union of all providers' keys.

use std::collections::{BTreeSet, HashSet};

use crate::provider::SharedProvider;
use crate::types::{ConfigEntry, Result};

/// Iterator behind [`ConfigService::get_all`](super::ConfigService::get_all).
///
/// Scans primary-store providers before overlays, emits the first non-null
/// value per key exactly once, and finishes with one unset entry per key that
/// was only ever seen with a null value. Per-provider snapshots are taken
/// lazily as the scan advances and sorted by name so the sequence is
/// deterministic; a fresh iterator performs a fresh scan.
pub struct GetAllIter {
    providers: Vec<SharedProvider>,
    provider_idx: usize,
    current: std::vec::IntoIter<(String, Option<String>)>,
    emitted: HashSet<String>,
    null_keys: BTreeSet<String>,
    draining_nulls: Option<std::collections::btree_set::IntoIter<String>>,
    failed: bool,
}

impl GetAllIter {
    pub(super) fn new(providers: &[SharedProvider]) -> Self {
        // Primary stores first so a persisted non-null value is never
        // shadowed by an overlay's value for the same key.
        let ordered: Vec<SharedProvider> = providers
            .iter()
            .filter(|p| p.kind().is_primary_store())
            .cloned()
            .chain(
                providers
                    .iter()
                    .filter(|p| !p.kind().is_primary_store())
                    .cloned(),
            )
            .collect();

        Self {
            providers: ordered,
            provider_idx: 0,
            current: Vec::new().into_iter(),
            emitted: HashSet::new(),
            null_keys: BTreeSet::new(),
            draining_nulls: None,
            failed: false,
        }
    }

    fn advance_provider(&mut self) -> Result<bool> {
        let Some(provider) = self.providers.get(self.provider_idx) else {
            return Ok(false);
        };
        self.provider_idx += 1;

        let mut snapshot: Vec<(String, Option<String>)> =
            provider.all_configurations()?.into_iter().collect();
        snapshot.sort_by(|a, b| a.0.cmp(&b.0));
        self.current = snapshot.into_iter();
        Ok(true)
    }
}

impl Iterator for GetAllIter {
    type Item = Result<ConfigEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if let Some(drain) = &mut self.draining_nulls {
                return drain.next().map(|name| Ok(ConfigEntry::unset(name)));
            }

            if let Some((name, value)) = self.current.next() {
                match value {
                    Some(value) => {
                        if self.emitted.insert(name.clone()) {
                            self.null_keys.remove(&name);
                            return Some(Ok(ConfigEntry {
                                name,
                                value: Some(value),
                            }));
                        }
                    }
                    None => {
                        if !self.emitted.contains(&name) {
                            self.null_keys.insert(name);
                        }
                    }
                }
                continue;
            }

            match self.advance_provider() {
                Ok(true) => continue,
                Ok(false) => {
                    // Every known-but-unresolved key still appears, once.
                    self.draining_nulls = Some(std::mem::take(&mut self.null_keys).into_iter());
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
