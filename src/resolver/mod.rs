//! Resolver Service
//!
//! `ConfigService` composes an ordered list of providers and exposes unified
//! read/write/enumerate operations:
//!
//! - precedence lookup: writable providers first, then list order, first
//!   non-null value wins
//! - write fan-out to every writable provider
//! - recursive connection-string alias resolution
//! - lazy precedence-first enumeration (`get_all`)
//! - an advisory value cache evicted on upstream change notification
//!
//! The cache is never consulted as the source of truth for a lookup; it exists
//! so hot paths and observers can avoid re-polling providers, and it is kept
//! honest by unconditional eviction (eventually consistent, not linearizable).

mod get_all;

pub use get_all::GetAllIter;

use std::collections::{HashMap, HashSet};

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::provider::{
    CONNECTION_STRING_NAMESPACE, ConfigProvider, ProviderKind, SharedProvider,
};
use crate::types::{ConfigEntry, ConfigError, EntryUpdated, Result};

/// Name tried by [`ConfigService::default_connection_string`].
pub const DEFAULT_CONNECTION_STRING: &str = "DefaultConnectionString";

/// Marker prefix turning a connection string into a named reference.
const ALIAS_MARKER: &str = "name=";

/// Aggregates configuration providers behind one read/write surface.
///
/// Long-lived and shared process-wide; all operations are synchronous and safe
/// to call from many threads at once. The provider list is immutable after
/// construction (or a one-time [`consolidate`](Self::consolidate)).
pub struct ConfigService {
    providers: Vec<SharedProvider>,
    /// Advisory cache: name -> last-resolved value. Never the source of truth.
    cache: DashMap<String, Option<String>>,
    /// Diagnostic record of every key ever requested and the value last
    /// returned. Observability only; never read during resolution.
    requested: DashMap<String, Option<String>>,
    /// Optional override for the environment-level connection-string table.
    connection_string_table: Option<HashMap<String, String>>,
}

impl ConfigService {
    /// Construct from an ordered provider list, most important first.
    ///
    /// Nested aggregate providers are filtered out so a service accidentally
    /// placed in its own list cannot recurse.
    pub fn new(providers: impl IntoIterator<Item = SharedProvider>) -> Self {
        Self {
            providers: Self::filter_aggregates(providers),
            cache: DashMap::new(),
            requested: DashMap::new(),
            connection_string_table: None,
        }
    }

    /// Use an explicit environment-level connection-string table instead of
    /// process environment variables when resolving `name=` aliases.
    pub fn with_connection_string_table(mut self, table: HashMap<String, String>) -> Self {
        self.connection_string_table = Some(table);
        self
    }

    /// One-time dependency-consolidation hook: replace the provider list
    /// before first use. Taking `&mut self` makes racing this against
    /// in-flight reads unrepresentable.
    pub fn consolidate(&mut self, providers: impl IntoIterator<Item = SharedProvider>) {
        self.providers = Self::filter_aggregates(providers);
        debug!(provider_count = self.providers.len(), "provider list consolidated");
    }

    /// The providers this service resolves against, in precedence order.
    pub fn providers(&self) -> &[SharedProvider] {
        &self.providers
    }

    fn filter_aggregates(
        providers: impl IntoIterator<Item = SharedProvider>,
    ) -> Vec<SharedProvider> {
        providers
            .into_iter()
            .filter(|p| p.kind() != ProviderKind::Aggregate)
            .collect()
    }

    /// Stable writable-first ordering: a writable source's explicit unset
    /// marker stays discoverable ahead of read-only fallbacks, which are still
    /// reached when no writable provider answers.
    fn scan_order(&self) -> impl Iterator<Item = &SharedProvider> {
        self.providers
            .iter()
            .filter(|p| p.can_write())
            .chain(self.providers.iter().filter(|p| !p.can_write()))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Resolve `key` to the highest-precedence non-null value, or `Ok(None)`
    /// when no provider answers. Records the outcome in the cache and the
    /// diagnostic map.
    pub fn get_configuration(&self, key: &str) -> Result<Option<String>> {
        let mut resolved = None;

        for provider in self.scan_order() {
            if let Some(value) = provider.get_configuration(key)? {
                resolved = Some(value);
                break;
            }
        }

        // Idempotent overwrite: repeated requests re-record, never accumulate.
        self.requested.insert(key.to_string(), resolved.clone());
        self.cache.insert(key.to_string(), resolved.clone());

        Ok(resolved)
    }

    /// Non-erroring lookup boundary. Any internal failure is logged and
    /// converted to `(false, None)`; this is the only place resolution errors
    /// are swallowed.
    pub fn try_get(&self, key: &str) -> (bool, Option<String>) {
        match self.get_configuration(key) {
            Ok(value) => (true, value),
            Err(e) => {
                warn!(key = %key, error = %e, "configuration resolution failed");
                (false, None)
            }
        }
    }

    /// Resolve `key` as a boolean. Absent resolves to `false`; malformed text
    /// is a [`ConfigError::Parse`]. Accepts `true`/`false` in any case.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.get_configuration(key)? {
            None => Ok(false),
            Some(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(ConfigError::parse(key, text, "bool")),
            },
        }
    }

    /// Resolve `key` as an integer. Absent resolves to `0`.
    pub fn get_int(&self, key: &str) -> Result<i64> {
        match self.get_configuration(key)? {
            None => Ok(0),
            Some(text) => match text.trim().parse::<i64>() {
                Ok(value) => Ok(value),
                Err(_) => Err(ConfigError::parse(key, text, "i64")),
            },
        }
    }

    /// Whether the conventional `Debug` flag resolves to true; soft-fails to
    /// `false` on any resolution or parse problem.
    pub fn debug(&self) -> bool {
        matches!(self.get_bool("Debug"), Ok(true))
    }

    /// Entry-level lookup: prefer a primary store's persisted entry (even an
    /// unset one), populating the cache with its value; otherwise synthesize
    /// an entry from the precedence scan when it yields non-empty text.
    pub fn get_entry(&self, name: &str) -> Result<Option<ConfigEntry>> {
        for provider in self
            .providers
            .iter()
            .filter(|p| p.kind().is_primary_store())
        {
            if let Some(entry) = provider.get_entry(name)? {
                self.cache.insert(name.to_string(), entry.value.clone());
                return Ok(Some(entry));
            }
        }

        match self.get_configuration(name)? {
            Some(value) if !value.trim().is_empty() => Ok(Some(ConfigEntry::new(name, value))),
            _ => Ok(None),
        }
    }

    // =========================================================================
    // Connection strings
    // =========================================================================

    /// First non-null connection string for `name` across providers, same
    /// precedence scan as [`get_configuration`](Self::get_configuration) but
    /// against the connection-string namespace. No diagnostic recording.
    pub fn get_connection_string(&self, name: &str) -> Result<Option<String>> {
        for provider in self.scan_order() {
            if let Some(value) = provider.get_connection_string(name)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Recursively resolve `name` to a literal connection string.
    ///
    /// A hit may itself be a `name=` alias, or a configuration key may rename
    /// to another lookup; chains resolve to the final literal. Unresolved
    /// names (and cycles) fall back to the input treated as the literal value.
    pub fn find_connection_string(&self, name: &str) -> Result<String> {
        let mut seen = HashSet::new();
        self.resolve_connection_string(name, &mut seen)
    }

    /// [`find_connection_string`](Self::find_connection_string) for
    /// [`DEFAULT_CONNECTION_STRING`].
    pub fn default_connection_string(&self) -> Result<String> {
        self.find_connection_string(DEFAULT_CONNECTION_STRING)
    }

    fn resolve_connection_string(
        &self,
        token: &str,
        seen: &mut HashSet<String>,
    ) -> Result<String> {
        if !seen.insert(token.to_string()) {
            // Rename cycle: stop and hand back the token as a literal.
            return Ok(token.to_string());
        }

        if let Some(value) = self.get_connection_string(token)? {
            return self.follow_alias(value, seen);
        }

        if let Some(value) = self.get_configuration(token)? {
            if !value.trim().is_empty() {
                return self.resolve_connection_string(&value, seen);
            }
        }

        if let Some(value) = self.environment_connection_string(token) {
            return self.follow_alias(value, seen);
        }

        Ok(token.to_string())
    }

    fn follow_alias(&self, value: String, seen: &mut HashSet<String>) -> Result<String> {
        let is_alias = value
            .get(..ALIAS_MARKER.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(ALIAS_MARKER));

        if is_alias {
            self.resolve_connection_string(&value[ALIAS_MARKER.len()..], seen)
        } else {
            Ok(value)
        }
    }

    /// Environment-level connection-string table: an explicit override map if
    /// configured, else `CONNECTIONSTRINGS_{NAME}` process variables.
    fn environment_connection_string(&self, name: &str) -> Option<String> {
        match &self.connection_string_table {
            Some(table) => table.get(name).cloned(),
            None => std::env::var(format!("{}{}", CONNECTION_STRING_NAMESPACE, name)).ok(),
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Fan a write out to every writable provider in list order. A failing
    /// provider does not block the rest; returns `Ok(true)` iff at least one
    /// write succeeded, `Ok(false)` with zero writable providers.
    pub fn set_configuration(&self, key: &str, value: Option<&str>) -> Result<bool> {
        let mut any = false;

        for provider in self.providers.iter().filter(|p| p.can_write()) {
            match provider.set_configuration(key, value) {
                Ok(true) => any = true,
                Ok(false) => {}
                Err(e) => {
                    warn!(key = %key, error = %e, "writable provider rejected configuration write");
                }
            }
        }

        Ok(any)
    }

    // =========================================================================
    // Enumeration
    // =========================================================================

    /// Lazy, deterministic enumeration of every known key, precedence-first:
    /// primary stores before overlays, first non-null value per key emitted
    /// exactly once, then one unset entry per key never seen with a value.
    /// Each call performs a fresh scan; results are never cached.
    pub fn get_all(&self) -> GetAllIter {
        GetAllIter::new(&self.providers)
    }

    /// Flat configuration merge in list order: the first provider to *offer*
    /// a key claims it, even with a null value. Deliberately looser than
    /// [`get_all`](Self::get_all), which lets non-null values win.
    pub fn all_configurations(&self) -> Result<HashMap<String, Option<String>>> {
        let mut merged = HashMap::new();
        for provider in &self.providers {
            for (key, value) in provider.all_configurations()? {
                merged.entry(key).or_insert(value);
            }
        }
        Ok(merged)
    }

    /// Flat connection-string merge, same claim semantics as
    /// [`all_configurations`](Self::all_configurations).
    pub fn all_connection_strings(&self) -> Result<HashMap<String, Option<String>>> {
        let mut merged = HashMap::new();
        for provider in &self.providers {
            for (name, value) in provider.all_connection_strings()? {
                merged.entry(name).or_insert(value);
            }
        }
        Ok(merged)
    }

    // =========================================================================
    // Cache lifecycle
    // =========================================================================

    /// React to an upstream entry update: unconditionally evict that key from
    /// the cache. A notification without an entry name is a contract
    /// violation, surfaced immediately.
    pub fn accept_update(&self, notification: &EntryUpdated) -> Result<()> {
        if notification.target.name.is_empty() {
            return Err(ConfigError::InvalidArgument(
                "update notification carries no entry name".to_string(),
            ));
        }

        self.cache.remove(&notification.target.name);
        debug!(key = %notification.target.name, "evicted updated configuration from cache");
        Ok(())
    }

    /// Drop every cached value. Safe to call concurrently with reads and
    /// writes; readers see either the old value or nothing, never torn state.
    pub fn flush_cache(&self) {
        self.cache.clear();
        debug!("configuration cache flushed");
    }

    /// Advisory cached value for `key`: `None` when never resolved or
    /// evicted, `Some(None)` when last resolved to unset.
    pub fn cached_value(&self, key: &str) -> Option<Option<String>> {
        self.cache.get(key).map(|entry| entry.value().clone())
    }

    /// Snapshot of the diagnostic map: every key ever requested and the value
    /// last returned for it.
    pub fn requested_configurations(&self) -> HashMap<String, Option<String>> {
        self.requested
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

/// A service is itself a provider, so resolvers can be composed. The nesting
/// filter in [`ConfigService::new`] keys off this `Aggregate` kind.
impl ConfigProvider for ConfigService {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Aggregate
    }

    fn can_write(&self) -> bool {
        true
    }

    fn get_configuration(&self, key: &str) -> Result<Option<String>> {
        ConfigService::get_configuration(self, key)
    }

    fn all_configurations(&self) -> Result<HashMap<String, Option<String>>> {
        ConfigService::all_configurations(self)
    }

    fn get_connection_string(&self, name: &str) -> Result<Option<String>> {
        ConfigService::get_connection_string(self, name)
    }

    fn all_connection_strings(&self) -> Result<HashMap<String, Option<String>>> {
        ConfigService::all_connection_strings(self)
    }

    fn set_configuration(&self, key: &str, value: Option<&str>) -> Result<bool> {
        ConfigService::set_configuration(self, key, value)
    }

    fn get_entry(&self, name: &str) -> Result<Option<ConfigEntry>> {
        ConfigService::get_entry(self, name)
    }
}
