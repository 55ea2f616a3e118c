//! Settings File Loader (Figment-based)
//!
//! Builds a read-only [`StaticProvider`] from an externally-maintained
//! settings file. Layout mirrors the two namespaces:
//!
//! ```toml
//! [configurations]
//! Debug = "true"
//!
//! [connection_strings]
//! DefaultConnectionString = "Server=.;"
//! ```
//!
//! JSON files use the same shape. There is no live-reload contract; reload by
//! loading again and rebuilding the provider.

use std::collections::HashMap;
use std::path::Path;

use figment::{
    Figment,
    providers::{Format, Json, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::provider::StaticProvider;
use crate::types::{ConfigError, Result};

/// Parsed shape of a settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub configurations: HashMap<String, String>,
    #[serde(default)]
    pub connection_strings: HashMap<String, String>,
}

impl SettingsFile {
    /// Load from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!(path = %path.as_ref().display(), "loading settings file");
        Figment::new()
            .merge(Serialized::defaults(SettingsFile::default()))
            .merge(Toml::file(path.as_ref()))
            .extract()
            .map_err(|e| ConfigError::Settings(e.to_string()))
    }

    /// Load from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!(path = %path.as_ref().display(), "loading settings file");
        Figment::new()
            .merge(Serialized::defaults(SettingsFile::default()))
            .merge(Json::file(path.as_ref()))
            .extract()
            .map_err(|e| ConfigError::Settings(e.to_string()))
    }

    /// Parse from a JSON string already in hand.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert into a read-only provider.
    pub fn into_provider(self) -> StaticProvider {
        let mut provider = StaticProvider::from_map(self.configurations);
        for (name, value) in self.connection_strings {
            provider = provider.with_connection_string(name, value);
        }
        provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ConfigProvider;
    use std::io::Write;

    #[test]
    fn test_load_toml_settings() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
[configurations]
Debug = "true"

[connection_strings]
DefaultConnectionString = "Server=.;"
"#
        )
        .unwrap();

        let settings = SettingsFile::load_toml(file.path()).unwrap();
        let provider = settings.into_provider();

        assert_eq!(
            provider.get_configuration("Debug").unwrap(),
            Some("true".to_string())
        );
        assert_eq!(
            provider
                .get_connection_string("DefaultConnectionString")
                .unwrap(),
            Some("Server=.;".to_string())
        );
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[configurations]\nA = \"1\"").unwrap();

        let settings = SettingsFile::load_toml(file.path()).unwrap();
        assert_eq!(settings.configurations.len(), 1);
        assert!(settings.connection_strings.is_empty());
    }

    #[test]
    fn test_from_json_str() {
        let settings = SettingsFile::from_json_str(
            r#"{"configurations": {"A": "1"}, "connection_strings": {"Main": "Server=.;"}}"#,
        )
        .unwrap();

        assert_eq!(settings.configurations["A"], "1");
        assert_eq!(settings.connection_strings["Main"], "Server=.;");
    }

    #[test]
    fn test_malformed_file_is_a_settings_error() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "configurations = \"not a table\"").unwrap();

        assert!(matches!(
            SettingsFile::load_toml(file.path()),
            Err(ConfigError::Settings(_))
        ));
    }
}
