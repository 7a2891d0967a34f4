//! # Sluice Executor
//!
//! The invoke boundary for Sluice: operation names plus command trees in,
//! result trees out.
//!
//! It provides:
//! - [`Session`] - per-request entry point owning a connection scope stack
//! - [`Registry`] - configuration, connectors and pools shared by sessions
//! - [`ScopeStack`] - nested acquisitions of one connection per alias
//! - [`Executor`] - runs one compiled statement on one connection
//!
//! ## Quick Start
//!
//! ```text
//! use sluice_executor::{Registry, Session, SluiceConfig};
//!
//! let config = SluiceConfig::from_file(Path::new("sluice.toml"))?;
//! let session = Session::new(Arc::new(Registry::from_config(config)?));
//!
//! let mut tree = node_from_json("sqlite.read", &json!({
//!     "connection": "main",
//!     "table": "users",
//!     "where": { "eq": { "column": "id", "value": 42 } }
//! }))?;
//! session.invoke("sqlite.read", &mut tree)?;
//! ```
//!
//! ## Operations
//!
//! | Slot | Effect |
//! |------|--------|
//! | `read` | rows as `.` children |
//! | `create` | `affected`, `id` |
//! | `update` / `delete` | `affected` |
//! | `transaction` | runs `commands` in one scope |
//!
//! Any CRUD slot given `generate-only: true` returns its SQL instead of
//! running it.

#![warn(missing_docs)]

mod config;
mod connection;
mod executor;
mod registry;
mod scope;
mod session;
mod slot;
mod sqlite;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API
// =============================================================================

pub use config::{PoolConfig, SluiceConfig, CONFIG_FILE_NAME};
pub use connection::{Connection, ConnectionPool, Connector, PooledConnection, RowSink};
pub use executor::{Executor, Outcome};
pub use registry::Registry;
pub use scope::{ScopeGuard, ScopeOutcome, ScopeStack};
pub use session::Session;
pub use slot::{Slot, SlotKind, TRANSACTION_SCHEMA};
pub use sqlite::{SqliteConnection, SqliteConnector};

// Re-export the tree and error types so users don't need sluice-core directly
pub use sluice_core::{json, Error, Node, Result, Value};

// Re-export the compiler surface
pub use sluice_sql::{
    build, dialect, Argument as ArgumentInfo, BuiltStatement, CompiledStatement, Dialect, Operation,
    Parameter, Shape, StatementKind,
};
