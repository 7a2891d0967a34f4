//! Connections, connectors and per-alias pools.
//!
//! A [`Connector`] opens [`Connection`]s for one dialect. Each configured
//! alias gets a [`ConnectionPool`] of at most `max_connections` connections;
//! acquisitions beyond that wait on a condition variable until one is
//! returned or the acquire timeout passes.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};
use sluice_core::{Error, Result, Value};
use sluice_sql::CompiledStatement;
use tracing::debug;

use crate::config::PoolConfig;

/// Row callback: column names, then the row's values in column order.
pub type RowSink<'a> = dyn FnMut(&[String], Vec<Value>) + 'a;

/// One open database connection.
///
/// Implementations map native failures to [`Error::ExecutionFailed`] with
/// the driver's own message.
pub trait Connection: Send {
    /// Start a transaction.
    fn begin(&mut self) -> Result<()>;

    /// Commit the open transaction.
    fn commit(&mut self) -> Result<()>;

    /// Roll back the open transaction.
    fn rollback(&mut self) -> Result<()>;

    /// Run a row-producing statement, feeding each row to `on_row`.
    fn query(&mut self, statement: &CompiledStatement, on_row: &mut RowSink<'_>) -> Result<()>;

    /// Run a statement and return the affected-row count.
    fn execute(&mut self, statement: &CompiledStatement) -> Result<u64>;
}

/// Opens connections for one dialect.
pub trait Connector: Send + Sync {
    /// Open a connection to `target` (the configured alias value).
    fn connect(&self, target: &str) -> Result<Box<dyn Connection>>;
}

struct PoolState {
    idle: Vec<Box<dyn Connection>>,
    open: usize,
}

/// Bounded pool of connections for one `(dialect, alias)`.
pub struct ConnectionPool {
    dialect: String,
    alias: String,
    target: String,
    connector: Arc<dyn Connector>,
    settings: PoolConfig,
    state: Mutex<PoolState>,
    available: Condvar,
}

impl fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ConnectionPool")
            .field("dialect", &self.dialect)
            .field("alias", &self.alias)
            .field("open", &state.open)
            .field("idle", &state.idle.len())
            .finish()
    }
}

impl ConnectionPool {
    /// Create an empty pool; connections are opened on demand.
    pub fn new(
        dialect: impl Into<String>,
        alias: impl Into<String>,
        target: impl Into<String>,
        connector: Arc<dyn Connector>,
        settings: PoolConfig,
    ) -> Self {
        Self {
            dialect: dialect.into(),
            alias: alias.into(),
            target: target.into(),
            connector,
            settings,
            state: Mutex::new(PoolState {
                idle: Vec::new(),
                open: 0,
            }),
            available: Condvar::new(),
        }
    }

    /// Alias this pool serves.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Connections currently open (idle or checked out).
    pub fn open_connections(&self) -> usize {
        self.state.lock().open
    }

    /// Connections waiting in the pool.
    pub fn idle_connections(&self) -> usize {
        self.state.lock().idle.len()
    }

    /// Take a connection, opening one if the pool has room, otherwise
    /// waiting up to the acquire timeout.
    pub fn acquire(self: &Arc<Self>) -> Result<PooledConnection> {
        let started = Instant::now();
        let deadline = started + self.settings.acquire_timeout();
        let mut state = self.state.lock();
        loop {
            if let Some(conn) = state.idle.pop() {
                return Ok(PooledConnection::new(conn, Arc::clone(self)));
            }
            if state.open < self.settings.max_connections {
                state.open += 1;
                break;
            }
            if self.available.wait_until(&mut state, deadline).timed_out()
                && state.idle.is_empty()
                && state.open >= self.settings.max_connections
            {
                return Err(Error::PoolExhausted {
                    alias: self.alias.clone(),
                    waited_ms: started.elapsed().as_millis() as u64,
                });
            }
        }
        drop(state);

        // Slot reserved; connect without holding the lock.
        match self.connector.connect(&self.target) {
            Ok(conn) => {
                debug!(target: "sluice::pool", dialect = %self.dialect, alias = %self.alias, "opened connection");
                Ok(PooledConnection::new(conn, Arc::clone(self)))
            }
            Err(e) => {
                self.forget();
                Err(e)
            }
        }
    }

    fn restore(&self, conn: Box<dyn Connection>) {
        self.state.lock().idle.push(conn);
        self.available.notify_one();
    }

    fn forget(&self) {
        let mut state = self.state.lock();
        state.open = state.open.saturating_sub(1);
        drop(state);
        self.available.notify_one();
    }
}

/// A checked-out connection; returns to its pool on drop.
pub struct PooledConnection {
    conn: Option<Box<dyn Connection>>,
    pool: Arc<ConnectionPool>,
    broken: bool,
}

impl PooledConnection {
    fn new(conn: Box<dyn Connection>, pool: Arc<ConnectionPool>) -> Self {
        Self {
            conn: Some(conn),
            pool,
            broken: false,
        }
    }

    /// Close the connection instead of returning it to the pool.
    pub fn discard(&mut self) {
        self.broken = true;
    }

    fn inner(&mut self) -> Result<&mut (dyn Connection + 'static)> {
        self.conn
            .as_deref_mut()
            .ok_or_else(|| Error::execution("connection already returned to its pool"))
    }
}

impl fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("alias", &self.pool.alias)
            .field("broken", &self.broken)
            .finish()
    }
}

impl Connection for PooledConnection {
    fn begin(&mut self) -> Result<()> {
        self.inner()?.begin()
    }

    fn commit(&mut self) -> Result<()> {
        self.inner()?.commit()
    }

    fn rollback(&mut self) -> Result<()> {
        self.inner()?.rollback()
    }

    fn query(&mut self, statement: &CompiledStatement, on_row: &mut RowSink<'_>) -> Result<()> {
        self.inner()?.query(statement, on_row)
    }

    fn execute(&mut self, statement: &CompiledStatement) -> Result<u64> {
        self.inner()?.execute(statement)
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if self.broken {
                drop(conn);
                self.pool.forget();
            } else {
                self.pool.restore(conn);
            }
        }
    }
}
