//! Configuration for userctl
//!
//! Resolution order, last wins:
//! 1. Built-in defaults
//! 2. `~/.userctl/config.toml` (or the path passed explicitly)
//! 3. `DATABASE_URL` from the environment
//!
//! CLI flags are applied on top by the binary.
//!
//! ```toml
//! storage = "postgres"
//!
//! [server]
//! bind_addr = "127.0.0.1:3000"
//! cors_permissive = false
//!
//! [database]
//! url = "postgres://localhost/userctl"
//! max_connections = 5
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::db::pool::DEFAULT_MAX_CONNECTIONS;
use crate::http::ServerConfig;

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?} (invalid TOML): {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("database url not set (use --database-url, DATABASE_URL or [database].url)")]
    MissingDatabaseUrl,
}

/// Where user records live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserctlConfig {
    pub storage: StorageBackend,
    pub server: ServerSection,
    pub database: DatabaseSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind_addr: SocketAddr,
    pub cors_permissive: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        let defaults = ServerConfig::default();
        Self {
            bind_addr: defaults.bind_addr,
            cors_permissive: defaults.cors_permissive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl UserctlConfig {
    /// Load configuration.
    ///
    /// With `Some(path)` the file must exist. With `None` the default path
    /// is tried and silently skipped when absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::config_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };

        config.apply_env(std::env::var("DATABASE_URL").ok());
        Ok(config)
    }

    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Default config file path: ~/.userctl/config.toml
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".userctl").join("config.toml"))
    }

    /// Overlay environment values. Blank values are ignored.
    pub fn apply_env(&mut self, database_url: Option<String>) {
        if let Some(url) = database_url.filter(|u| !u.trim().is_empty()) {
            self.database.url = Some(url);
        }
    }

    /// Database URL, required for the postgres backend and migrations.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database
            .url
            .as_deref()
            .ok_or(ConfigError::MissingDatabaseUrl)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.server.bind_addr,
            cors_permissive: self.server.cors_permissive,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults() {
        let config = UserctlConfig::default();
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.server.bind_addr.port(), 3000);
        assert_eq!(config.database.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert!(matches!(
            config.database_url(),
            Err(ConfigError::MissingDatabaseUrl)
        ));
    }

    #[test]
    fn parses_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
storage = "memory"

[server]
bind_addr = "0.0.0.0:8080"
"#
        )
        .unwrap();

        let config = UserctlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.server.bind_addr.port(), 8080);
        assert!(!config.server.cors_permissive);
        assert_eq!(config.database.url, None);
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = UserctlConfig::load(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "storage = [").unwrap();

        let err = UserctlConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_overrides_file_url() {
        let mut config = UserctlConfig::default();
        config.database.url = Some("postgres://file/db".into());

        config.apply_env(Some("  ".into()));
        assert_eq!(config.database_url().unwrap(), "postgres://file/db");

        config.apply_env(Some("postgres://env/db".into()));
        assert_eq!(config.database_url().unwrap(), "postgres://env/db");
    }
}
