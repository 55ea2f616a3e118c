//! stratify - Layered Configuration Resolution
//!
//! Resolves a single authoritative value per key across an ordered set of
//! configuration sources, with write-back to writable sources and an advisory
//! cache invalidated by upstream change notifications.
//!
//! ## Core Concepts
//!
//! - **Provider**: one configuration source behind the [`ConfigProvider`]
//!   trait - a persisted store, a parsed settings file, an environment
//!   snapshot.
//! - **Precedence**: writable providers are consulted first, then list order;
//!   the first non-null value wins.
//! - **Resolver**: [`ConfigService`] aggregates providers behind unified
//!   read/write/enumerate operations and owns the cache.
//! - **Unset vs absent**: a provider can report a key as explicitly unset
//!   (`None` value), which is distinct from no provider knowing the key at
//!   all; [`ConfigService::get_all`] keeps the distinction visible.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use stratify::{ConfigService, MemoryEntryStore, RepositoryProvider, StaticProvider};
//!
//! let store = Arc::new(MemoryEntryStore::new());
//! let service = ConfigService::new([
//!     Arc::new(RepositoryProvider::new(store)) as stratify::SharedProvider,
//!     Arc::new(StaticProvider::new().with_configuration("Debug", "true")),
//! ]);
//!
//! service.set_configuration("SiteName", Some("stratify")).unwrap();
//! assert_eq!(
//!     service.get_configuration("SiteName").unwrap(),
//!     Some("stratify".to_string())
//! );
//! assert!(service.debug());
//! ```
//!
//! ## Modules
//!
//! - [`provider`]: the provider contract and built-in sources
//! - [`store`]: the persisted entry-store contract, SQLite and in-memory
//! - [`resolver`]: the aggregating service
//! - [`loader`]: figment-based settings-file loading

pub mod loader;
pub mod provider;
pub mod resolver;
pub mod store;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Data model & errors
pub use types::{ConfigEntry, ConfigError, EntryUpdated, Result};

// Providers
pub use provider::{
    ConfigProvider, EnvProvider, ProviderKind, RepositoryProvider, SharedProvider, StaticProvider,
};

// Stores
pub use store::{EntryStore, MemoryEntryStore, SqliteEntryStore};

// Resolver
pub use resolver::{ConfigService, DEFAULT_CONNECTION_STRING, GetAllIter};

// Settings files
pub use loader::SettingsFile;
