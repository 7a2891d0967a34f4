//! Connectors and connection pools shared across sessions.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use sluice_core::{Error, Result};
use sluice_sql::Argument;
use tracing::info;

use crate::config::SluiceConfig;
use crate::connection::{ConnectionPool, Connector};
use crate::slot::Slot;
use crate::sqlite::SqliteConnector;

/// Configuration, connectors and lazily created pools.
///
/// `Send + Sync`; share it behind an `Arc` and build one
/// [`Session`](crate::Session) per request.
pub struct Registry {
    config: SluiceConfig,
    connectors: RwLock<HashMap<String, Arc<dyn Connector>>>,
    pools: Mutex<HashMap<(String, String), Arc<ConnectionPool>>>,
}

impl Registry {
    /// Registry with no connectors.
    pub fn new(config: SluiceConfig) -> Self {
        Self {
            config,
            connectors: RwLock::new(HashMap::new()),
            pools: Mutex::new(HashMap::new()),
        }
    }

    /// Registry with the built-in SQLite connector.
    pub fn from_config(config: SluiceConfig) -> Result<Self> {
        config.validate()?;
        let registry = Self::new(config);
        registry.register_connector("sqlite", Arc::new(SqliteConnector));
        Ok(registry)
    }

    /// Effective configuration.
    pub fn config(&self) -> &SluiceConfig {
        &self.config
    }

    /// Install or replace the connector for `dialect`.
    ///
    /// Pools already created for the dialect keep their old connector.
    pub fn register_connector(&self, dialect: &str, connector: Arc<dyn Connector>) {
        self.connectors.write().insert(dialect.to_string(), connector);
    }

    /// The pool for `(dialect, alias)`, created on first use.
    pub fn pool(&self, dialect: &str, alias: &str) -> Result<Arc<ConnectionPool>> {
        let key = (dialect.to_string(), alias.to_string());
        if let Some(pool) = self.pools.lock().get(&key) {
            return Ok(Arc::clone(pool));
        }

        let target = self
            .config
            .target(dialect, alias)
            .ok_or_else(|| Error::UnknownConnection {
                dialect: dialect.to_string(),
                alias: alias.to_string(),
            })?;
        let connector = self
            .connectors
            .read()
            .get(dialect)
            .cloned()
            .ok_or_else(|| Error::NoConnector {
                dialect: dialect.to_string(),
            })?;

        let mut pools = self.pools.lock();
        let pool = pools.entry(key).or_insert_with(|| {
            info!(target: "sluice::pool", dialect, alias, "creating connection pool");
            Arc::new(ConnectionPool::new(
                dialect,
                alias,
                target,
                connector,
                self.config.pool,
            ))
        });
        Ok(Arc::clone(pool))
    }

    /// Ordered argument list of `operation` (e.g. `"sqlite.read"`).
    pub fn describe_arguments(&self, operation: &str) -> Result<Vec<Argument>> {
        Ok(Slot::parse(operation)?.schema().describe())
    }
}
