//! Sluice - declarative CRUD command trees compiled to parametrized SQL
//!
//! A caller describes a read, create, update or delete as a tree of named
//! nodes. Sluice validates the tree against the operation's argument schema,
//! compiles it into a dialect-specific statement with every literal bound as
//! a parameter, and either runs it inside a connection scope or hands the
//! SQL back untouched.
//!
//! # Quick Start
//!
//! ```ignore
//! use sluice::{json::node_from_json, Registry, Session, SluiceConfig};
//!
//! let config = SluiceConfig::default().with_database("sqlite", "main", "app.db");
//! let session = Session::new(Arc::new(Registry::from_config(config)?));
//!
//! let mut tree = node_from_json("sqlite.read", &json!({
//!     "connection": "main",
//!     "table": "users",
//!     "columns": ["id", "name"],
//!     "where": { "eq": { "column": "id", "value": 42 } },
//!     "limit": 10
//! }))?;
//! session.invoke("sqlite.read", &mut tree)?;
//! ```
//!
//! # Architecture
//!
//! All invocations go through a [`Session`]. The SQL compiler
//! (`sluice-sql`) is pure; only the executor layer touches databases.

// Re-export the public API from sluice-executor
pub use sluice_executor::*;
