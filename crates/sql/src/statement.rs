//! Compiled statements.
//!
//! A [`CompiledStatement`] is SQL text plus the ordered parameter list its
//! placeholders refer to. It is produced without touching a database and is
//! consumed by exactly one execution (or written back into the tree in
//! build-only mode).

use serde::Serialize;
use sluice_core::{Node, Result, Value};

use crate::dialect::Dialect;
use crate::identifier::Identifier;

/// One bound parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Placeholder as it appears in the SQL text.
    pub placeholder: String,
    /// Bound literal.
    pub value: Value,
}

/// How the executor drives a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatementKind {
    /// Produces rows.
    Query,
    /// Produces an affected-row count.
    Execute,
    /// Insert; `return_id` asks for the generated key.
    Insert {
        /// Whether the generated key is read back after the insert.
        return_id: bool,
    },
    /// Single-row insert whose text also selects the generated key, read
    /// from the first row it returns.
    InsertSelectingId,
}

/// SQL text with its ordered parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStatement {
    /// SQL with dialect placeholders.
    pub text: String,
    /// Parameters, in placeholder order.
    pub parameters: Vec<Parameter>,
    /// Execution mode.
    pub kind: StatementKind,
}

impl CompiledStatement {
    /// Bound values, in placeholder order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.parameters.iter().map(|p| &p.value)
    }

    /// Build-only result: the node's value becomes the SQL text and its
    /// children one node per parameter (`placeholder = literal`).
    pub fn write_into(&self, node: &mut Node) {
        node.value = Some(Value::String(self.text.clone()));
        node.children = self
            .parameters
            .iter()
            .map(|p| Node {
                name: p.placeholder.clone(),
                value: Some(p.value.clone()),
                children: Vec::new(),
            })
            .collect();
    }
}

/// Accumulates text and parameters for one statement.
///
/// Every literal goes through [`bind`](Self::bind), so the parameter list
/// always matches the placeholders in the text.
pub struct StatementWriter<'d> {
    dialect: &'d dyn Dialect,
    text: String,
    parameters: Vec<Parameter>,
}

impl<'d> StatementWriter<'d> {
    /// Start an empty statement for `dialect`.
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            text: String::with_capacity(128),
            parameters: Vec::new(),
        }
    }

    /// Append SQL keywords or punctuation.
    pub fn push_str(&mut self, sql: &str) {
        self.text.push_str(sql);
    }

    /// Validate and append a quoted identifier.
    pub fn push_identifier(&mut self, raw: &str) -> Result<()> {
        let identifier = Identifier::parse(raw)?;
        identifier.write_quoted(self.dialect, &mut self.text);
        Ok(())
    }

    /// Append a placeholder and record its value.
    pub fn bind(&mut self, value: Value) {
        let placeholder = self.dialect.placeholder(self.parameters.len() + 1);
        self.text.push_str(&placeholder);
        self.parameters.push(Parameter { placeholder, value });
    }

    /// Mutable access for dialect hooks that render clauses directly.
    pub(crate) fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    /// Finish the statement.
    pub fn finish(self, kind: StatementKind) -> CompiledStatement {
        CompiledStatement {
            text: self.text,
            parameters: self.parameters,
            kind,
        }
    }
}
