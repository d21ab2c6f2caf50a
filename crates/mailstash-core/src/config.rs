//! Store configuration.
//!
//! Configuration lives in a JSON file, by default
//! `<config dir>/mailstash/config.json`. A missing file yields defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Result;

/// Directory name used under the platform config and data directories.
const APP_DIR: &str = "mailstash";

/// Settings for opening the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. `None` opens a private in-memory database.
    pub database_path: Option<PathBuf>,
    /// Maximum pooled connections for file-backed databases.
    pub max_connections: u32,
    /// How long a connection waits on a locked database, in seconds.
    pub busy_timeout_secs: u64,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: Some(Self::default_database_path()),
            max_connections: 5,
            busy_timeout_secs: 5,
            log_filter: "mailstash_core=info".to_string(),
        }
    }
}

impl StoreConfig {
    /// Configuration for a throwaway in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            database_path: None,
            ..Self::default()
        }
    }

    /// Default location of the configuration file.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.json")
    }

    /// Default location of the database file.
    #[must_use]
    pub fn default_database_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("mailstash.db")
    }

    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if the parsed values are out of range.
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await? {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write configuration to `path` as pretty JSON, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem operation fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;

        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] when `max_connections` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(crate::Error::Config(
                "max_connections must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
