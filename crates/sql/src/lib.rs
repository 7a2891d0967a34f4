//! SQL compiler for Sluice command trees.
//!
//! Turns a validated [`Node`](sluice_core::Node) into parametrized SQL for one
//! of four dialects. Nothing here opens a connection: compilation is pure and
//! deterministic, so the same tree always yields byte-identical statements.
//!
//! ```text
//! use sluice_sql::{build, dialect, Operation};
//!
//! let dialect = dialect::lookup("sqlite").unwrap();
//! let built = build(Operation::Read, dialect, &tree)?;
//! // built.statement.text == r#"SELECT "id" FROM "users" WHERE "id" = ?1"#
//! ```
//!
//! Literals are only ever bound as parameters. Identifiers are checked
//! against a strict grammar and quoted per dialect, so no caller-supplied
//! text reaches the SQL unescaped.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod dialect;
pub mod identifier;
pub mod schema;
pub mod statement;
pub mod where_clause;

#[cfg(test)]
mod tests;

pub use builder::{build, BuiltStatement, Operation, SqlBuilder};
pub use dialect::{Dialect, Paging};
pub use identifier::Identifier;
pub use schema::{Argument, ArgumentSchema, Shape, GENERATE_ONLY};
pub use statement::{CompiledStatement, Parameter, StatementKind, StatementWriter};
