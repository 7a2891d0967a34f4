//! Database configuration via `sluice.toml`.
//!
//! Maps each dialect's connection aliases to connection targets and sizes
//! the per-alias connection pools. A default `sluice.toml` can be written
//! with [`SluiceConfig::write_default_if_missing`].

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sluice_core::{Error, Result};

/// Config file name looked up by the CLI.
pub const CONFIG_FILE_NAME: &str = "sluice.toml";

/// Pool sizing, shared by every alias.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolConfig {
    /// Connections kept per alias (default: 8)
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// How long an acquisition waits for a free connection (default: 5000)
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

fn default_max_connections() -> usize {
    8
}

fn default_acquire_timeout_ms() -> u64 {
    5000
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

impl PoolConfig {
    /// Acquisition timeout as a duration.
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

/// Configuration loaded from `sluice.toml`.
///
/// # Example
///
/// ```toml
/// [pool]
/// max_connections = 8
/// acquire_timeout_ms = 5000
///
/// [databases.sqlite]
/// main = "data/main.db"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SluiceConfig {
    /// Pool sizing.
    #[serde(default)]
    pub pool: PoolConfig,
    /// `dialect -> alias -> target`.
    #[serde(default)]
    pub databases: BTreeMap<String, BTreeMap<String, String>>,
}

impl SluiceConfig {
    /// Connection target for `alias` under `dialect`.
    pub fn target(&self, dialect: &str, alias: &str) -> Option<&str> {
        self.databases
            .get(dialect)
            .and_then(|aliases| aliases.get(alias))
            .map(String::as_str)
    }

    /// Add or replace one alias.
    pub fn with_database(
        mut self,
        dialect: impl Into<String>,
        alias: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.databases
            .entry(dialect.into())
            .or_default()
            .insert(alias.into(), target.into());
        self
    }

    /// Check values serde cannot check.
    pub fn validate(&self) -> Result<()> {
        if self.pool.max_connections == 0 {
            return Err(Error::Config {
                reason: "pool.max_connections must be at least 1".to_string(),
            });
        }
        for dialect in self.databases.keys() {
            if sluice_sql::dialect::lookup(dialect).is_none() {
                return Err(Error::Config {
                    reason: format!(
                        "unknown dialect '{}' in [databases]; expected one of sqlite, mysql, pgsql, mssql",
                        dialect
                    ),
                });
            }
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Sluice configuration
#
# Pool sizing applies to every connection alias.
[pool]
max_connections = 8
acquire_timeout_ms = 5000

# Connection aliases per dialect. Commands name an alias in their
# `connection` argument; the value is the connection target.
[databases.sqlite]
main = "sluice.db"

# [databases.pgsql]
# reporting = "host=localhost user=sluice dbname=reporting"
"#
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SluiceConfig = toml::from_str(content).map_err(|e| Error::Config {
            reason: format!("failed to parse config: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config { reason } => Error::Config {
                reason: format!("{}: {}", path.display(), reason),
            },
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(true)` when the file was created.
    pub fn write_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        std::fs::write(path, Self::default_toml()).map_err(|e| Error::Config {
            reason: format!(
                "failed to write default config file '{}': {}",
                path.display(),
                e
            ),
        })?;
        Ok(true)
    }
}
