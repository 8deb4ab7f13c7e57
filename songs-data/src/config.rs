//! Store configuration loading
//!
//! The database location is resolved in priority order:
//! 1. Explicit path argument (highest priority)
//! 2. `SONGS_DATABASE_PATH` environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the database path
pub const DATABASE_PATH_ENV: &str = "SONGS_DATABASE_PATH";

/// Backing database settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_path: PathBuf,
    pub max_connections: u32,
    pub min_connections: u32,
    /// SQLite busy_timeout applied to every connection
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            max_connections: 20,
            min_connections: 5,
            busy_timeout_ms: 5000,
        }
    }
}

impl StoreConfig {
    /// Config pointing at `database_path` with default pool settings
    pub fn with_database_path(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve the effective configuration
    ///
    /// Pool settings come from the config file when one is found; the
    /// database path follows the priority order in the module docs.
    pub fn resolve(cli_database_path: Option<&Path>, config_file: Option<&Path>) -> Result<Self> {
        let file_path = match config_file {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_file(),
        };

        let mut config = match file_path {
            Some(path) if path.exists() => {
                tracing::debug!("Loading store config from {}", path.display());
                Self::load(&path)?
            }
            Some(path) if config_file.is_some() => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            _ => Self::default(),
        };

        // Priority 1: explicit argument, Priority 2: environment variable
        let env_path = std::env::var(DATABASE_PATH_ENV)
            .ok()
            .filter(|path| !path.is_empty());
        match (cli_database_path, env_path) {
            (Some(path), _) => config.database_path = path.to_path_buf(),
            (None, Some(path)) => config.database_path = PathBuf::from(path),
            (None, None) => {}
        }

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(Error::Config("max_connections must be at least 1".to_string()));
        }
        if self.min_connections > self.max_connections {
            return Err(Error::Config(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("database_path must not be empty".to_string()));
        }
        Ok(())
    }
}

/// `~/.config/songs/config.toml` on Linux, the platform config dir elsewhere
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("songs").join("config.toml"))
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("songs"))
        .unwrap_or_else(|| PathBuf::from("./songs_data"))
        .join("songs.db")
}
