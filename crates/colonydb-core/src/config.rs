//! Application configuration.

use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "ColonyDB";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default database file, relative to the working directory
pub const DEFAULT_DATABASE_FILE: &str = "colony.db";

/// Environment variable overriding the database path
pub const DATABASE_ENV: &str = "COLONYDB_DATABASE";

/// Environment variable overriding the log filter (`RUST_LOG` still wins)
pub const LOG_ENV: &str = "COLONYDB_LOG";

/// Default tracing filter directive.
pub fn default_log_filter() -> String {
    "info,colonydb_core=info,colonydb_import=info".to_string()
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ColonyConfig {
    pub database_path: PathBuf,
    pub log_filter: String,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            log_filter: default_log_filter(),
        }
    }
}

impl ColonyConfig {
    /// Defaults overridden by `COLONYDB_DATABASE` / `COLONYDB_LOG`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            database_path: lookup(DATABASE_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            log_filter: lookup(LOG_ENV)
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.log_filter),
        }
    }
}
