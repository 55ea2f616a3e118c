pub mod entry;
pub mod error;

pub use entry::{ConfigEntry, EntryUpdated};
pub use error::{ConfigError, Result};
