//! `SELECT` builder.

use sluice_core::{Error, Node, Result};

use super::{count_arg, required_text, write_where, Operation, SqlBuilder};
use crate::dialect::{Dialect, Paging};
use crate::schema::{Argument, ArgumentSchema, Shape, GENERATE_ONLY};
use crate::statement::{CompiledStatement, StatementKind, StatementWriter};
use crate::where_clause::{self, Operand};

static SCHEMA: ArgumentSchema = ArgumentSchema::new(&[
    Argument::required("connection", Shape::Text),
    Argument::required("table", Shape::TextTree),
    Argument::optional("columns", Shape::Subtree),
    Argument::optional("where", Shape::Subtree),
    Argument::optional("order", Shape::Subtree),
    Argument::optional("limit", Shape::Count),
    Argument::optional("offset", Shape::Count),
    Argument::optional(GENERATE_ONLY, Shape::Flag),
]);

/// Builds `SELECT` statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadBuilder;

impl SqlBuilder for ReadBuilder {
    fn operation(&self) -> Operation {
        Operation::Read
    }

    fn schema(&self) -> &'static ArgumentSchema {
        &SCHEMA
    }

    fn compile(&self, args: &Node, dialect: &dyn Dialect) -> Result<CompiledStatement> {
        let paging = Paging {
            limit: count_arg(args, "limit"),
            offset: count_arg(args, "offset"),
        };
        let mut w = StatementWriter::new(dialect);

        w.push_str("SELECT ");
        if let Some(prefix) = dialect.select_prefix(paging) {
            w.push_str(&prefix);
            w.push_str(" ");
        }
        write_columns(args, &mut w)?;

        w.push_str(" FROM ");
        w.push_identifier(required_text(args, "table")?)?;
        if let Some(table) = args.child("table") {
            for join in &table.children {
                write_join(join, &mut w)?;
            }
        }

        write_where(args, &mut w)?;
        let ordered = write_order(args, &mut w)?;
        dialect.write_paging(w.text_mut(), paging, ordered);

        Ok(w.finish(StatementKind::Query))
    }
}

fn write_columns(args: &Node, w: &mut StatementWriter<'_>) -> Result<()> {
    let columns = args.child("columns").map(|c| c.children.as_slice()).unwrap_or(&[]);
    if columns.is_empty() {
        w.push_str("*");
        return Ok(());
    }
    for (i, column) in columns.iter().enumerate() {
        if !column.children.is_empty() {
            return Err(Error::shape(
                "columns",
                format!("'{}' must not have children", column.name),
            ));
        }
        if i > 0 {
            w.push_str(", ");
        }
        w.push_identifier(column.value_str().unwrap_or(&column.name))?;
    }
    Ok(())
}

fn join_keyword(kind: Option<&str>) -> Result<&'static str> {
    match kind.map(str::to_ascii_lowercase).as_deref() {
        None | Some("inner") => Ok(" INNER JOIN "),
        Some("left") => Ok(" LEFT JOIN "),
        Some("right") => Ok(" RIGHT JOIN "),
        Some("full") => Ok(" FULL OUTER JOIN "),
        Some(other) => Err(Error::shape(
            "table",
            format!("unknown join type '{}'", other),
        )),
    }
}

fn write_join(join: &Node, w: &mut StatementWriter<'_>) -> Result<()> {
    if join.name != "join" {
        return Err(Error::shape(
            "table",
            format!("unexpected child '{}'", join.name),
        ));
    }
    let table = join
        .value_str()
        .ok_or_else(|| Error::shape("table", "join needs a table name"))?;

    let mut kind = None;
    let mut on = None;
    for child in &join.children {
        match child.name.as_str() {
            "type" if kind.is_none() => {
                kind = Some(
                    child
                        .value_str()
                        .ok_or_else(|| Error::shape("table", "join type must be a string"))?,
                );
            }
            "on" if on.is_none() => on = Some(child),
            other => {
                return Err(Error::shape(
                    "table",
                    format!("unexpected join child '{}'", other),
                ))
            }
        }
    }
    let on = on
        .filter(|n| !n.children.is_empty())
        .ok_or_else(|| Error::shape("on", "join needs a non-empty 'on' condition"))?;

    w.push_str(join_keyword(kind)?);
    w.push_identifier(table)?;
    w.push_str(" ON ");
    where_clause::write_condition(on, "on", Operand::Column, w)
}

fn direction(item: &Node) -> Result<&'static str> {
    let Some(direction) = item.child("direction") else {
        return Ok("asc");
    };
    match direction.value_str().map(str::to_ascii_lowercase).as_deref() {
        Some("asc") => Ok("asc"),
        Some("desc") => Ok("desc"),
        _ => Err(Error::shape("order", "direction must be 'asc' or 'desc'")),
    }
}

/// Returns whether an `ORDER BY` was written.
fn write_order(args: &Node, w: &mut StatementWriter<'_>) -> Result<bool> {
    let items = args.child("order").map(|o| o.children.as_slice()).unwrap_or(&[]);
    if items.is_empty() {
        return Ok(false);
    }
    w.push_str(" ORDER BY ");
    for (i, item) in items.iter().enumerate() {
        if let Some(unexpected) = item
            .children
            .iter()
            .find(|c| c.name != "column" && c.name != "direction")
        {
            return Err(Error::shape(
                "order",
                format!("unexpected child '{}'", unexpected.name),
            ));
        }
        let column = item
            .child("column")
            .and_then(Node::value_str)
            .or_else(|| item.value_str())
            .ok_or_else(|| Error::shape("order", format!("'{}' needs a column", item.name)))?;
        if i > 0 {
            w.push_str(", ");
        }
        w.push_identifier(column)?;
        w.push_str(" ");
        w.push_str(direction(item)?);
    }
    Ok(true)
}
