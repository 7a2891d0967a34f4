//! `DELETE` builder.

use sluice_core::{Node, Result};

use super::{required_text, write_where, Operation, SqlBuilder};
use crate::dialect::Dialect;
use crate::schema::{Argument, ArgumentSchema, Shape, GENERATE_ONLY};
use crate::statement::{CompiledStatement, StatementKind, StatementWriter};

static SCHEMA: ArgumentSchema = ArgumentSchema::new(&[
    Argument::required("connection", Shape::Text),
    Argument::required("table", Shape::Text),
    Argument::optional("where", Shape::Subtree),
    Argument::optional(GENERATE_ONLY, Shape::Flag),
]);

/// Builds `DELETE` statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteBuilder;

impl SqlBuilder for DeleteBuilder {
    fn operation(&self) -> Operation {
        Operation::Delete
    }

    fn schema(&self) -> &'static ArgumentSchema {
        &SCHEMA
    }

    fn compile(&self, args: &Node, dialect: &dyn Dialect) -> Result<CompiledStatement> {
        let mut w = StatementWriter::new(dialect);
        w.push_str("DELETE FROM ");
        w.push_identifier(required_text(args, "table")?)?;
        write_where(args, &mut w)?;
        Ok(w.finish(StatementKind::Execute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::MySql;
    use sluice_core::{Error, Value};

    fn compile(args: &Node) -> Result<CompiledStatement> {
        SCHEMA.validate(args)?;
        DeleteBuilder.compile(args, &MySql)
    }

    #[test]
    fn test_delete_with_in_list() {
        let args = Node::new("mysql.delete")
            .with_child(Node::with_value("connection", "main"))
            .with_child(Node::with_value("table", "app.sessions"))
            .with_child(
                Node::new("where").with_child(
                    Node::new("in")
                        .with_child(Node::with_value("column", "id"))
                        .with_child(
                            Node::new("value")
                                .with_child(Node::with_value(".", 1i64))
                                .with_child(Node::with_value(".", 2i64)),
                        ),
                ),
            );
        let stmt = compile(&args).unwrap();
        assert_eq!(stmt.text, "DELETE FROM `app`.`sessions` WHERE `id` IN (?, ?)");
        assert_eq!(
            stmt.values().cloned().collect::<Vec<_>>(),
            vec![Value::Int(1), Value::Int(2)]
        );
    }

    #[test]
    fn test_empty_where_deletes_everything() {
        let args = Node::new("mysql.delete")
            .with_child(Node::with_value("connection", "main"))
            .with_child(Node::with_value("table", "t"))
            .with_child(Node::new("where"));
        assert_eq!(compile(&args).unwrap().text, "DELETE FROM `t`");
    }

    #[test]
    fn test_table_subtree_rejected() {
        let args = Node::new("mysql.delete")
            .with_child(Node::with_value("connection", "main"))
            .with_child(Node::with_value("table", "t").with_child(Node::with_value("join", "u")));
        assert!(matches!(
            compile(&args),
            Err(Error::InvalidArgumentShape { ref key, .. }) if key == "table"
        ));
    }
}
