//! Configuration Provider Abstraction
//!
//! Defines the `ConfigProvider` trait: a uniform read (and optionally write)
//! accessor over one configuration source. Providers carry no identity beyond
//! their position in the resolver's list; position encodes precedence.
//!
//! ## Modules
//!
//! - `repository`: provider backed by a persisted entry store
//! - `static_map`: read-only provider over pre-loaded maps
//! - `env`: read-only provider over a process-environment snapshot

mod env;
mod repository;
mod static_map;

pub use env::{CONNECTION_STRING_NAMESPACE, EnvProvider};
pub use repository::RepositoryProvider;
pub use static_map::StaticProvider;

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{ConfigEntry, Result};

/// Shared provider handle for concurrent access across threads.
pub type SharedProvider = Arc<dyn ConfigProvider>;

/// Capability tag for a provider.
///
/// Merge ordering in the resolver keys off this tag instead of inspecting
/// concrete types, so custom providers participate in the same rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Backed by a persisted entry store; its entries (including explicitly
    /// unset ones) are authoritative during full enumeration.
    PrimaryStore,
    /// Any other source: settings file, environment snapshot, literal map.
    Overlay,
    /// An aggregating resolver. Filtered out when nested inside another
    /// resolver's provider list to prevent self-reference.
    Aggregate,
}

impl ProviderKind {
    pub fn is_primary_store(self) -> bool {
        matches!(self, ProviderKind::PrimaryStore)
    }
}

/// A single configuration source.
///
/// Lookups must not fail for unknown keys; `Ok(None)` means "no value here".
/// Errors are reserved for genuine source failures, which propagate.
pub trait ConfigProvider: Send + Sync {
    /// Capability tag used for merge ordering and nesting filters.
    fn kind(&self) -> ProviderKind;

    /// Whether `set_configuration` can persist values here.
    fn can_write(&self) -> bool;

    /// This provider's value for `key`, or `Ok(None)` if it has none.
    fn get_configuration(&self, key: &str) -> Result<Option<String>>;

    /// Full snapshot of this provider's configurations. Values of `None`
    /// represent entries known to be unset; they still claim the key in the
    /// flat merge.
    fn all_configurations(&self) -> Result<HashMap<String, Option<String>>>;

    /// This provider's connection string for `name`, from the separate
    /// connection-string namespace.
    fn get_connection_string(&self, _name: &str) -> Result<Option<String>> {
        Ok(None)
    }

    /// Full snapshot of this provider's connection strings.
    fn all_connection_strings(&self) -> Result<HashMap<String, Option<String>>> {
        Ok(HashMap::new())
    }

    /// Persist `value` for `key`. Returns `Ok(false)` for read-only providers;
    /// storage failures propagate.
    fn set_configuration(&self, _key: &str, _value: Option<&str>) -> Result<bool> {
        Ok(false)
    }

    /// Entry-level lookup. Primary stores return the persisted entry even when
    /// its value is unset; the default synthesizes one from the value lookup.
    fn get_entry(&self, name: &str) -> Result<Option<ConfigEntry>> {
        Ok(self
            .get_configuration(name)?
            .map(|value| ConfigEntry::new(name, value)))
    }
}
