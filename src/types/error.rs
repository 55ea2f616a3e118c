//! Unified error type for the crate.
//!
//! Direct accessors propagate these errors; `ConfigService::try_get` is the
//! single boundary that converts them into a soft failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A caller violated a contract (e.g. a change notification without an
    /// entry name). Surfaced immediately, never swallowed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A resolved string could not be converted to the requested type.
    #[error("cannot parse configuration '{key}' value {value:?} as {expected}")]
    Parse {
        key: String,
        value: String,
        expected: &'static str,
    },

    /// Underlying entry-store failure (pool exhaustion, constraint violation).
    #[error("storage error: {0}")]
    Storage(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Settings file could not be read or extracted.
    #[error("settings error: {0}")]
    Settings(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    /// Create a parse error for a typed accessor.
    pub fn parse(key: &str, value: impl Into<String>, expected: &'static str) -> Self {
        Self::Parse {
            key: key.to_string(),
            value: value.into(),
            expected,
        }
    }
}
