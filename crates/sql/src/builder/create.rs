//! `INSERT` builder.

use sluice_core::{Node, Result};

use super::{column_values, flag_arg, required_text, Operation, SqlBuilder};
use crate::dialect::Dialect;
use crate::schema::{Argument, ArgumentSchema, Shape, GENERATE_ONLY};
use crate::statement::{CompiledStatement, StatementKind, StatementWriter};

static SCHEMA: ArgumentSchema = ArgumentSchema::new(&[
    Argument::required("connection", Shape::Text),
    Argument::required("table", Shape::Text),
    Argument::required("values", Shape::Subtree),
    Argument::optional("return-id", Shape::Flag),
    Argument::optional(GENERATE_ONLY, Shape::Flag),
]);

/// Builds `INSERT` statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateBuilder;

impl SqlBuilder for CreateBuilder {
    fn operation(&self) -> Operation {
        Operation::Create
    }

    fn schema(&self) -> &'static ArgumentSchema {
        &SCHEMA
    }

    fn compile(&self, args: &Node, dialect: &dyn Dialect) -> Result<CompiledStatement> {
        let pairs = column_values(args)?;
        let return_id = flag_arg(args, "return-id").unwrap_or(true);
        let mut w = StatementWriter::new(dialect);

        w.push_str("INSERT INTO ");
        w.push_identifier(required_text(args, "table")?)?;

        if pairs.is_empty() {
            w.push_str(" ");
            w.push_str(dialect.default_values());
            return Ok(finish_insert(w, dialect, return_id));
        }

        w.push_str(" (");
        for (i, (column, _)) in pairs.iter().enumerate() {
            if i > 0 {
                w.push_str(", ");
            }
            w.push_identifier(column)?;
        }
        w.push_str(") VALUES (");
        for (i, (_, value)) in pairs.into_iter().enumerate() {
            if i > 0 {
                w.push_str(", ");
            }
            w.bind(value);
        }
        w.push_str(")");

        Ok(finish_insert(w, dialect, return_id))
    }
}

fn finish_insert(mut w: StatementWriter<'_>, dialect: &dyn Dialect, return_id: bool) -> CompiledStatement {
    match dialect.insert_id_in_batch() {
        Some(select) if return_id => {
            w.push_str(select);
            w.finish(StatementKind::InsertSelectingId)
        }
        _ => w.finish(StatementKind::Insert { return_id }),
    }
}
