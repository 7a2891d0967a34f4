//! Built-in SQLite connector (rusqlite).
//!
//! The target string is a database file path, or `:memory:`.

use rusqlite::types::Value as SqlValue;
use sluice_core::{Error, Result, Value};
use sluice_sql::CompiledStatement;

use crate::connection::{Connection, Connector, RowSink};

/// Opens rusqlite connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteConnector;

impl Connector for SqliteConnector {
    fn connect(&self, target: &str) -> Result<Box<dyn Connection>> {
        let conn = rusqlite::Connection::open(target).map_err(Error::execution)?;
        Ok(Box::new(SqliteConnection { conn }))
    }
}

/// One rusqlite connection.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int(n) => SqlValue::Integer(*n),
        Value::Float(f) => SqlValue::Real(*f),
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::DateTime(dt) => SqlValue::Text(dt.to_rfc3339()),
        Value::Bytes(b) => SqlValue::Blob(b.clone()),
    }
}

fn from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(n) => Value::Int(n),
        SqlValue::Real(f) => Value::Float(f),
        SqlValue::Text(s) => Value::String(s),
        SqlValue::Blob(b) => Value::Bytes(b),
    }
}

fn params(statement: &CompiledStatement) -> impl Iterator<Item = SqlValue> + '_ {
    statement.values().map(to_sql)
}

impl Connection for SqliteConnection {
    fn begin(&mut self) -> Result<()> {
        self.conn.execute_batch("BEGIN").map_err(Error::execution)
    }

    fn commit(&mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT").map_err(Error::execution)
    }

    fn rollback(&mut self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK").map_err(Error::execution)
    }

    fn query(&mut self, statement: &CompiledStatement, on_row: &mut RowSink<'_>) -> Result<()> {
        let mut stmt = self.conn.prepare(&statement.text).map_err(Error::execution)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt
            .query(rusqlite::params_from_iter(params(statement)))
            .map_err(Error::execution)?;
        while let Some(row) = rows.next().map_err(Error::execution)? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                let value: SqlValue = row.get(i).map_err(Error::execution)?;
                values.push(from_sql(value));
            }
            on_row(&columns, values);
        }
        Ok(())
    }

    fn execute(&mut self, statement: &CompiledStatement) -> Result<u64> {
        let affected = self
            .conn
            .execute(&statement.text, rusqlite::params_from_iter(params(statement)))
            .map_err(Error::execution)?;
        Ok(affected as u64)
    }
}
