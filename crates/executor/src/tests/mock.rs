//! Recording connector for scope and session tests.

use std::sync::Arc;

use parking_lot::Mutex;
use sluice_core::{Error, Result, Value};
use sluice_sql::CompiledStatement;

use crate::{Connection, Connector, Registry, RowSink, Session, SluiceConfig};

/// Everything a mock connection was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Connect(String),
    Begin,
    Commit,
    Rollback,
    Query(String),
    Execute(String),
}

/// Connector whose connections log into one shared journal.
#[derive(Clone, Default)]
pub struct MockConnector {
    journal: Arc<Mutex<Vec<Event>>>,
    fail_on: Option<String>,
    rows: Vec<Vec<(String, Value)>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements containing `needle` fail.
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    /// Rows returned by every read.
    pub fn with_rows(mut self, rows: Vec<Vec<(&str, Value)>>) -> Self {
        self.rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|(c, v)| (c.to_string(), v)).collect())
            .collect();
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.journal.lock().clone()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.journal.lock().iter().filter(|e| *e == event).count()
    }

    pub fn connects(&self) -> usize {
        self.journal
            .lock()
            .iter()
            .filter(|e| matches!(e, Event::Connect(_)))
            .count()
    }

    pub fn statements(&self) -> usize {
        self.journal
            .lock()
            .iter()
            .filter(|e| matches!(e, Event::Query(_) | Event::Execute(_)))
            .count()
    }
}

impl Connector for MockConnector {
    fn connect(&self, target: &str) -> Result<Box<dyn Connection>> {
        self.journal.lock().push(Event::Connect(target.to_string()));
        Ok(Box::new(MockConnection {
            connector: self.clone(),
        }))
    }
}

struct MockConnection {
    connector: MockConnector,
}

impl MockConnection {
    fn record(&self, event: Event) {
        self.connector.journal.lock().push(event);
    }

    fn check(&self, statement: &CompiledStatement) -> Result<()> {
        match &self.connector.fail_on {
            Some(needle) if statement.text.contains(needle.as_str()) => {
                Err(Error::execution(format!("no such table: {}", needle)))
            }
            _ => Ok(()),
        }
    }
}

impl Connection for MockConnection {
    fn begin(&mut self) -> Result<()> {
        self.record(Event::Begin);
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.record(Event::Commit);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.record(Event::Rollback);
        Ok(())
    }

    fn query(&mut self, statement: &CompiledStatement, on_row: &mut RowSink<'_>) -> Result<()> {
        self.record(Event::Query(statement.text.clone()));
        self.check(statement)?;
        if statement.text == "SELECT last_insert_rowid()" {
            on_row(&["last_insert_rowid()".to_string()], vec![Value::Int(99)]);
            return Ok(());
        }
        for row in &self.connector.rows {
            let columns: Vec<String> = row.iter().map(|(c, _)| c.clone()).collect();
            let values = row.iter().map(|(_, v)| v.clone()).collect();
            on_row(&columns, values);
        }
        Ok(())
    }

    fn execute(&mut self, statement: &CompiledStatement) -> Result<u64> {
        self.record(Event::Execute(statement.text.clone()));
        self.check(statement)?;
        Ok(1)
    }
}

/// Config with `main` and `audit` aliases for every dialect.
pub fn mock_config(max_connections: usize) -> SluiceConfig {
    let mut config = SluiceConfig::default();
    config.pool.max_connections = max_connections;
    config.pool.acquire_timeout_ms = 50;
    for dialect in ["sqlite", "mysql", "pgsql", "mssql"] {
        config = config
            .with_database(dialect, "main", format!("mock://{}/main", dialect))
            .with_database(dialect, "audit", format!("mock://{}/audit", dialect));
    }
    config
}

/// Registry routing every dialect to `connector`.
pub fn mock_registry(connector: &MockConnector, max_connections: usize) -> Arc<Registry> {
    let registry = Registry::new(mock_config(max_connections));
    for dialect in ["sqlite", "mysql", "pgsql", "mssql"] {
        registry.register_connector(dialect, Arc::new(connector.clone()));
    }
    Arc::new(registry)
}

pub fn mock_session(connector: &MockConnector) -> Session {
    Session::new(mock_registry(connector, 4))
}
