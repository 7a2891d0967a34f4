//! Shared test utilities for the integration suite.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

pub use serde_json::{json, Value as JsonValue};
pub use sluice::json::{node_from_json, node_to_json};
pub use sluice::{Error, Node, Registry, Session, SluiceConfig, Value};
use sluice::{CompiledStatement, Connection, Connector, SqliteConnector, StatementKind};
use tempfile::TempDir;

const SCHEMA: &str = "
    CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        age INTEGER,
        email TEXT,
        created TEXT
    );
    CREATE TABLE orders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        total REAL NOT NULL
    );
";

// ============================================================================
// TestDb - SQLite files in a temporary directory
// ============================================================================

/// Two SQLite databases (`main`, `audit`) behind one registry.
pub struct TestDb {
    pub dir: TempDir,
    pub registry: Arc<Registry>,
}

impl TestDb {
    /// Fresh databases with the `users` and `orders` tables.
    pub fn new() -> Self {
        Self::with_pool(8, 5000)
    }

    /// Like [`new`](Self::new) with explicit pool sizing.
    pub fn with_pool(max_connections: usize, acquire_timeout_ms: u64) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let mut config = SluiceConfig::default();
        config.pool.max_connections = max_connections;
        config.pool.acquire_timeout_ms = acquire_timeout_ms;
        let config = config
            .with_database("sqlite", "main", path_str(&dir, "main.db"))
            .with_database("sqlite", "audit", path_str(&dir, "audit.db"));
        let db = Self {
            registry: Arc::new(Registry::from_config(config).expect("registry")),
            dir,
        };
        for alias in ["main", "audit"] {
            for ddl in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                db.raw(alias, ddl);
            }
        }
        db
    }

    /// A new session over the shared registry.
    pub fn session(&self) -> Session {
        Session::new(Arc::clone(&self.registry))
    }

    /// Path of the file behind `alias`.
    pub fn path(&self, alias: &str) -> PathBuf {
        self.dir.path().join(format!("{}.db", alias))
    }

    /// Run one statement outside any scope.
    pub fn raw(&self, alias: &str, sql: &str) -> u64 {
        let mut conn = SqliteConnector
            .connect(&self.path(alias).to_string_lossy())
            .expect("connect");
        conn.execute(&statement(sql)).expect(sql)
    }

    /// First column of every row of `sql`, outside any scope.
    pub fn column(&self, alias: &str, sql: &str) -> Vec<Value> {
        let mut conn = SqliteConnector
            .connect(&self.path(alias).to_string_lossy())
            .expect("connect");
        let mut out = Vec::new();
        conn.query(&statement(sql), &mut |_, values| {
            out.extend(values.into_iter().next());
        })
        .expect(sql);
        out
    }

    /// `SELECT count(*)` of `table` in `alias`.
    pub fn count(&self, alias: &str, table: &str) -> i64 {
        self.column(alias, &format!("SELECT count(*) FROM {}", table))[0]
            .as_int()
            .expect("count")
    }

    /// Insert a user directly and return its id.
    pub fn seed_user(&self, name: &str, age: i64, email: Option<&str>) -> i64 {
        let email = email.map(|e| format!("'{}'", e)).unwrap_or_else(|| "NULL".into());
        self.raw(
            "main",
            &format!(
                "INSERT INTO users (name, age, email, created) VALUES ('{}', {}, {}, datetime('now'))",
                name, age, email
            ),
        );
        self.column("main", "SELECT max(id) FROM users")[0]
            .as_int()
            .expect("id")
    }

    /// Parse `json`, invoke `operation` and return the result tree.
    pub fn invoke(&self, operation: &str, json: JsonValue) -> Result<Node, Error> {
        let session = self.session();
        let mut tree = node_from_json(operation, &json)?;
        session.invoke(operation, &mut tree)?;
        Ok(tree)
    }

    /// Like [`invoke`](Self::invoke), rendering the result as JSON.
    pub fn invoke_json(&self, operation: &str, json: JsonValue) -> Result<JsonValue, Error> {
        self.invoke(operation, json).map(|tree| node_to_json(&tree))
    }
}

fn path_str(dir: &TempDir, file: &str) -> String {
    dir.path().join(file).to_string_lossy().into_owned()
}

fn statement(sql: &str) -> CompiledStatement {
    CompiledStatement {
        text: sql.to_string(),
        parameters: Vec::new(),
        kind: StatementKind::Execute,
    }
}
