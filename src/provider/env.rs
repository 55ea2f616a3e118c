//! Read-only provider over a process-environment snapshot.

use std::collections::HashMap;

use super::{ConfigProvider, ProviderKind};
use crate::types::Result;

/// Variables under this namespace (after the provider prefix) feed the
/// connection-string namespace instead of the configuration namespace.
pub const CONNECTION_STRING_NAMESPACE: &str = "CONNECTIONSTRINGS_";

/// A provider over environment variables, snapshotted at construction.
///
/// Keys keep whatever case the environment used after the prefix is stripped;
/// lookups stay case-sensitive like every other provider. There is no live
/// view: variables set after construction are not visible.
#[derive(Debug, Clone, Default)]
pub struct EnvProvider {
    configurations: HashMap<String, Option<String>>,
    connection_strings: HashMap<String, Option<String>>,
}

impl EnvProvider {
    /// Snapshot every variable starting with `prefix`.
    ///
    /// `{prefix}CONNECTIONSTRINGS_{NAME}` lands in the connection-string
    /// namespace under `NAME`; every other `{prefix}{KEY}` becomes a
    /// configuration under `KEY`.
    pub fn with_prefix(prefix: &str) -> Self {
        Self::from_vars(prefix, std::env::vars())
    }

    /// Snapshot an explicit variable set. Hermetic alternative to
    /// [`EnvProvider::with_prefix`] for tests and embedders.
    pub fn from_vars(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut configurations = HashMap::new();
        let mut connection_strings = HashMap::new();

        for (key, value) in vars {
            let Some(rest) = key.strip_prefix(prefix) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            match rest.strip_prefix(CONNECTION_STRING_NAMESPACE) {
                Some(name) if !name.is_empty() => {
                    connection_strings.insert(name.to_string(), Some(value));
                }
                _ => {
                    configurations.insert(rest.to_string(), Some(value));
                }
            }
        }

        Self {
            configurations,
            connection_strings,
        }
    }
}

impl ConfigProvider for EnvProvider {
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
