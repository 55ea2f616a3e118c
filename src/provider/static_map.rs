//! Read-only provider over pre-loaded key/value maps.

use std::collections::HashMap;

use super::{ConfigProvider, ProviderKind};
use crate::types::Result;

/// A provider wrapping externally-loaded configuration and connection-string
/// maps (a parsed settings file, literal test fixtures). Never writable; no
/// live-reload contract.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    configurations: HashMap<String, Option<String>>,
    connection_strings: HashMap<String, Option<String>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a flat map; every value is treated as set.
    pub fn from_map(configurations: HashMap<String, String>) -> Self {
        Self {
            configurations: configurations
                .into_iter()
                .map(|(k, v)| (k, Some(v)))
                .collect(),
            connection_strings: HashMap::new(),
        }
    }

    pub fn with_configuration(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.configurations.insert(key.into(), Some(value.into()));
        self
    }

    /// Record a key as present but explicitly unset.
    pub fn with_unset(mut self, key: impl Into<String>) -> Self {
        self.configurations.insert(key.into(), None);
        self
    }

    pub fn with_connection_string(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.connection_strings.insert(name.into(), Some(value.into()));
        self
    }
}

impl ConfigProvider for StaticProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Overlay
    }

    fn can_write(&self) -> bool {
        false
    }

    fn get_configuration(&self, key: &str) -> Result<Option<String>> {
        Ok(self.configurations.get(key).cloned().flatten())
    }

    fn all_configurations(&self) -> Result<HashMap<String, Option<String>>> {
        Ok(self.configurations.clone())
    }

    fn get_connection_string(&self, name: &str) -> Result<Option<String>> {
        Ok(self.connection_strings.get(name).cloned().flatten())
    }

    fn all_connection_strings(&self) -> Result<HashMap<String, Option<String>>> {
        Ok(self.connection_strings.clone())
    }
}
