//! `UPDATE` builder.

use sluice_core::{Error, Node, Result};

use super::{column_values, required_text, write_where, Operation, SqlBuilder};
use crate::dialect::Dialect;
use crate::schema::{Argument, ArgumentSchema, Shape, GENERATE_ONLY};
use crate::statement::{CompiledStatement, StatementKind, StatementWriter};

static SCHEMA: ArgumentSchema = ArgumentSchema::new(&[
    Argument::required("connection", Shape::Text),
    Argument::required("table", Shape::Text),
    Argument::required("values", Shape::Subtree),
    Argument::optional("where", Shape::Subtree),
    Argument::optional(GENERATE_ONLY, Shape::Flag),
]);

/// Builds `UPDATE` statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateBuilder;

impl SqlBuilder for UpdateBuilder {
    fn operation(&self) -> Operation {
        Operation::Update
    }

    fn schema(&self) -> &'static ArgumentSchema {
        &SCHEMA
    }

    fn compile(&self, args: &Node, dialect: &dyn Dialect) -> Result<CompiledStatement> {
        let pairs = column_values(args)?;
        if pairs.is_empty() {
            return Err(Error::shape("values", "update needs at least one column"));
        }
        let mut w = StatementWriter::new(dialect);

        w.push_str("UPDATE ");
        w.push_identifier(required_text(args, "table")?)?;
        w.push_str(" SET ");
        for (i, (column, value)) in pairs.into_iter().enumerate() {
            if i > 0 {
                w.push_str(", ");
            }
            w.push_identifier(column)?;
            w.push_str(" = ");
            w.bind(value);
        }
        write_where(args, &mut w)?;

        Ok(w.finish(StatementKind::Execute))
    }
}
