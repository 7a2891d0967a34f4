//! SQL builders.
//!
//! One [`SqlBuilder`] per operation compiles a validated command tree into a
//! [`CompiledStatement`]. Builders share the where compiler and the dialect
//! abstraction; none executes anything.
//!
//! | Operation | Builder | Statement |
//! |-----------|---------|-----------|
//! | read | [`ReadBuilder`] | `SELECT` |
//! | create | [`CreateBuilder`] | `INSERT` |
//! | update | [`UpdateBuilder`] | `UPDATE` |
//! | delete | [`DeleteBuilder`] | `DELETE` |

mod create;
mod delete;
mod read;
mod update;

pub use create::CreateBuilder;
pub use delete::DeleteBuilder;
pub use read::ReadBuilder;
pub use update::UpdateBuilder;

use serde::Serialize;
use sluice_core::{Error, Node, Result, Value};
use tracing::debug;

use crate::dialect::Dialect;
use crate::schema::{ArgumentSchema, GENERATE_ONLY};
use crate::statement::{CompiledStatement, StatementWriter};
use crate::where_clause::{self, Operand};

/// CRUD operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// `SELECT`
    Read,
    /// `INSERT`
    Create,
    /// `UPDATE`
    Update,
    /// `DELETE`
    Delete,
}

impl Operation {
    /// All operations.
    pub const ALL: [Operation; 4] = [
        Operation::Read,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    /// Slot name (`"read"` in `"sqlite.read"`).
    pub fn name(self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// Parse a slot name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// The builder for this operation.
    pub fn builder(self) -> &'static dyn SqlBuilder {
        match self {
            Operation::Read => &ReadBuilder,
            Operation::Create => &CreateBuilder,
            Operation::Update => &UpdateBuilder,
            Operation::Delete => &DeleteBuilder,
        }
    }
}

/// Compiles a validated command tree for one operation.
pub trait SqlBuilder: Send + Sync {
    /// Operation implemented by this builder.
    fn operation(&self) -> Operation;

    /// Accepted arguments.
    fn schema(&self) -> &'static ArgumentSchema;

    /// Compile `args`, which must already satisfy [`schema`](Self::schema).
    fn compile(&self, args: &Node, dialect: &dyn Dialect) -> Result<CompiledStatement>;
}

/// A compiled statement plus the routing the tree asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltStatement {
    /// The statement.
    pub statement: CompiledStatement,
    /// Connection alias to run it against.
    pub connection: String,
    /// Build-only mode requested.
    pub generate_only: bool,
}

/// Validate `args` against the operation's schema and compile it.
pub fn build(operation: Operation, dialect: &dyn Dialect, args: &Node) -> Result<BuiltStatement> {
    let builder = operation.builder();
    builder.schema().validate(args)?;

    let statement = builder.compile(args, dialect)?;
    let connection = text_arg(args, "connection")
        .ok_or_else(|| Error::MissingArgument {
            key: "connection".to_string(),
        })?
        .to_string();
    let generate_only = flag_arg(args, GENERATE_ONLY).unwrap_or(false);

    debug!(
        target: "sluice::sql",
        dialect = dialect.name(),
        operation = operation.name(),
        parameters = statement.parameters.len(),
        sql = %statement.text,
        "compiled statement"
    );

    Ok(BuiltStatement {
        statement,
        connection,
        generate_only,
    })
}

// =============================================================================
// Argument accessors (valid after schema validation)
// =============================================================================

pub(crate) fn text_arg<'a>(args: &'a Node, key: &str) -> Option<&'a str> {
    args.child(key).and_then(Node::value_str)
}

pub(crate) fn count_arg(args: &Node, key: &str) -> Option<u64> {
    args.child(key)
        .and_then(|n| n.value.as_ref())
        .and_then(Value::as_int)
        .and_then(|n| u64::try_from(n).ok())
}

pub(crate) fn flag_arg(args: &Node, key: &str) -> Option<bool> {
    args.child(key)
        .and_then(|n| n.value.as_ref())
        .and_then(Value::as_bool)
}

pub(crate) fn required_text<'a>(args: &'a Node, key: &str) -> Result<&'a str> {
    text_arg(args, key).ok_or_else(|| Error::MissingArgument {
        key: key.to_string(),
    })
}

/// Append ` WHERE <condition>` when `where` has children.
pub(crate) fn write_where(args: &Node, w: &mut StatementWriter<'_>) -> Result<()> {
    let Some(filter) = args.child("where") else {
        return Ok(());
    };
    if filter.children.is_empty() {
        return Ok(());
    }
    w.push_str(" WHERE ");
    where_clause::write_condition(filter, "where", Operand::Parameter, w)
}

/// Column/value pairs of a `values` subtree, rejecting repeats and subtrees.
pub(crate) fn column_values(args: &Node) -> Result<Vec<(&str, Value)>> {
    let Some(values) = args.child("values") else {
        return Ok(Vec::new());
    };
    let mut pairs: Vec<(&str, Value)> = Vec::with_capacity(values.children.len());
    for column in &values.children {
        if !column.children.is_empty() {
            return Err(Error::shape(
                "values",
                format!("'{}' must be a scalar", column.name),
            ));
        }
        if pairs.iter().any(|(name, _)| *name == column.name) {
            return Err(Error::shape(
                "values",
                format!("column '{}' given more than once", column.name),
            ));
        }
        pairs.push((column.name.as_str(), column.value.clone().unwrap_or(Value::Null)));
    }
    Ok(pairs)
}
