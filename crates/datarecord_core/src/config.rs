//! Runtime configuration for core callers.
//!
//! # Responsibility
//! - Resolve database path and logging settings from the environment.
//!
//! # Invariants
//! - Blank environment values count as unset.
//! - Resolution never fails; unset values fall back to defaults.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "DATARECORD_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "DATARECORD_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "DATARECORD_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "datarecords_database.sqlite3";

/// Settings needed to open the database and start logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    /// `None` means no level was configured; see `effective_log_level`.
    pub log_level: Option<String>,
    /// `None` keeps logs on stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: None,
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        Self {
            db_path: value(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            log_level: value(LOG_LEVEL_ENV),
            log_dir: value(LOG_DIR_ENV).map(PathBuf::from),
        }
    }

    /// Configured level, or the build-mode default.
    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }
}

/// Default store location: a fixed file name in the system temp directory.
pub fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}
