//! The Executor - runs one compiled statement on one connection.
//!
//! The Executor is stateless: scopes, pools and transactions are managed by
//! the caller. It only drives the statement according to its kind and
//! collects the result.

use sluice_core::{Node, Result, Value, ANONYMOUS};
use sluice_sql::{CompiledStatement, Dialect, StatementKind};
use tracing::debug;

use crate::connection::Connection;

/// Result of one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Rows of a read, each a `.` node of `column = value` children.
    Rows(Vec<Node>),
    /// Affected-row count of an update or delete.
    Affected(u64),
    /// Insert summary; `id` is present when the generated key was requested.
    Inserted {
        /// Rows inserted.
        affected: u64,
        /// Generated key.
        id: Option<Value>,
    },
}

impl Outcome {
    /// Replace the children of `node` with this result.
    pub fn write_into(self, node: &mut Node) {
        node.children = match self {
            Outcome::Rows(rows) => rows,
            Outcome::Affected(affected) => vec![Node::with_value("affected", affected as i64)],
            Outcome::Inserted { affected, id } => {
                let mut summary = vec![Node::with_value("affected", affected as i64)];
                if let Some(id) = id {
                    summary.push(Node::with_value("id", id));
                }
                summary
            }
        };
    }
}

/// Stateless statement runner.
///
/// `Send + Sync`; one instance can serve every session.
#[derive(Debug, Clone, Copy, Default)]
pub struct Executor;

impl Executor {
    /// Create an executor.
    pub fn new() -> Self {
        Self
    }

    /// Run `statement` on `connection`.
    pub fn execute(
        &self,
        statement: &CompiledStatement,
        dialect: &dyn Dialect,
        connection: &mut dyn Connection,
    ) -> Result<Outcome> {
        match statement.kind {
            StatementKind::Query => {
                let rows = collect_rows(statement, connection)?;
                debug!(target: "sluice::executor", rows = rows.len(), "query finished");
                Ok(Outcome::Rows(rows))
            }
            StatementKind::Execute => {
                let affected = connection.execute(statement)?;
                debug!(target: "sluice::executor", affected, "statement finished");
                Ok(Outcome::Affected(affected))
            }
            StatementKind::Insert { return_id } => {
                let affected = connection.execute(statement)?;
                let id = if return_id {
                    Some(last_insert_id(dialect, connection)?)
                } else {
                    None
                };
                debug!(target: "sluice::executor", affected, returned_id = id.is_some(), "insert finished");
                Ok(Outcome::Inserted { affected, id })
            }
            StatementKind::InsertSelectingId => {
                let id = first_value(statement, connection)?;
                debug!(target: "sluice::executor", "insert finished with key from the same batch");
                Ok(Outcome::Inserted {
                    affected: 1,
                    id: Some(id),
                })
            }
        }
    }
}

fn collect_rows(statement: &CompiledStatement, connection: &mut dyn Connection) -> Result<Vec<Node>> {
    let mut rows = Vec::new();
    connection.query(statement, &mut |columns, values| {
        let cells = columns
            .iter()
            .zip(values)
            .map(|(column, value)| Node::with_value(column.as_str(), value));
        rows.push(Node::new(ANONYMOUS).with_children(cells));
    })?;
    Ok(rows)
}

fn last_insert_id(dialect: &dyn Dialect, connection: &mut dyn Connection) -> Result<Value> {
    let lookup = CompiledStatement {
        text: dialect.last_insert_id().to_string(),
        parameters: Vec::new(),
        kind: StatementKind::Query,
    };
    first_value(&lookup, connection)
}

/// First column of the first row, or null when nothing came back.
fn first_value(statement: &CompiledStatement, connection: &mut dyn Connection) -> Result<Value> {
    let mut first = None;
    connection.query(statement, &mut |_, values| {
        if first.is_none() {
            first = values.into_iter().next();
        }
    })?;
    Ok(first.unwrap_or(Value::Null))
}
