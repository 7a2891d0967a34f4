//! Where-expression compiler.
//!
//! Grammar (children of a `where` node are combined with `AND`):
//!
//! ```text
//! expression := logical | comparison
//! logical    := (and | or | not) { expression+ }
//! comparison := operator { column = <identifier>, value = <scalar> }
//! operator   := eq | neq | gt | gte | lt | lte | like | in | is-null | is-not-null
//! ```
//!
//! `in` takes its list as the children of `value`. `is-null` and
//! `is-not-null` take no `value`. Join conditions use the same grammar with
//! `to = <identifier>` in place of `value`, restricted to the ordering
//! comparisons.
//!
//! Logical groups are always parenthesized, so joining sibling expressions
//! with `AND` never changes their meaning.

use sluice_core::{Error, Node, Result, Value};

use crate::statement::StatementWriter;

/// Logical grouping node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logical {
    /// All children hold
    And,
    /// Any child holds
    Or,
    /// The conjunction of the children does not hold
    Not,
}

impl Logical {
    /// Parse a node name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "and" => Some(Logical::And),
            "or" => Some(Logical::Or),
            "not" => Some(Logical::Not),
            _ => None,
        }
    }
}

/// Comparison operator of a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `=`
    Eq,
    /// `<>`
    Neq,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `LIKE`
    Like,
    /// `IN (...)`
    In,
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
}

impl Comparison {
    /// Parse a node name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(Comparison::Eq),
            "neq" => Some(Comparison::Neq),
            "gt" => Some(Comparison::Gt),
            "gte" => Some(Comparison::Gte),
            "lt" => Some(Comparison::Lt),
            "lte" => Some(Comparison::Lte),
            "like" => Some(Comparison::Like),
            "in" => Some(Comparison::In),
            "is-null" => Some(Comparison::IsNull),
            "is-not-null" => Some(Comparison::IsNotNull),
            _ => None,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Comparison::Eq => " = ",
            Comparison::Neq => " <> ",
            Comparison::Gt => " > ",
            Comparison::Gte => " >= ",
            Comparison::Lt => " < ",
            Comparison::Lte => " <= ",
            Comparison::Like => " LIKE ",
            Comparison::In => " IN (",
            Comparison::IsNull => " IS NULL",
            Comparison::IsNotNull => " IS NOT NULL",
        }
    }

    /// Whether the leaf binds no value.
    pub fn is_null_test(self) -> bool {
        matches!(self, Comparison::IsNull | Comparison::IsNotNull)
    }

    fn compares_columns(self) -> bool {
        matches!(
            self,
            Comparison::Eq
                | Comparison::Neq
                | Comparison::Gt
                | Comparison::Gte
                | Comparison::Lt
                | Comparison::Lte
        )
    }
}

/// What the right-hand side of a leaf is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// `value` child, bound as a parameter
    Parameter,
    /// `to` child, another identifier (join conditions)
    Column,
}

/// Compile the children of `root` as an `AND`-joined condition.
///
/// `key` names the argument in error messages (`where`, `on`). Writes
/// nothing when `root` has no children.
pub fn write_condition(
    root: &Node,
    key: &str,
    operand: Operand,
    w: &mut StatementWriter<'_>,
) -> Result<()> {
    write_joined(&root.children, " AND ", key, operand, w)
}

fn write_joined(
    nodes: &[Node],
    separator: &str,
    key: &str,
    operand: Operand,
    w: &mut StatementWriter<'_>,
) -> Result<()> {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            w.push_str(separator);
        }
        write_expression(node, key, operand, w)?;
    }
    Ok(())
}

fn write_expression(
    node: &Node,
    key: &str,
    operand: Operand,
    w: &mut StatementWriter<'_>,
) -> Result<()> {
    if let Some(logical) = Logical::parse(&node.name) {
        if node.children.is_empty() {
            return Err(Error::EmptyWhereGroup {
                logical: node.name.clone(),
            });
        }
        if node.value.is_some() {
            return Err(Error::shape(key, format!("'{}' takes no value", node.name)));
        }
        let separator = match logical {
            Logical::Or => " OR ",
            Logical::And | Logical::Not => " AND ",
        };
        if logical == Logical::Not {
            w.push_str("NOT ");
        }
        w.push_str("(");
        write_joined(&node.children, separator, key, operand, w)?;
        w.push_str(")");
        return Ok(());
    }

    let comparison = Comparison::parse(&node.name).ok_or_else(|| Error::UnsupportedOperator {
        operator: node.name.clone(),
    })?;
    match operand {
        Operand::Parameter => write_parameter_leaf(node, comparison, key, w),
        Operand::Column => write_column_leaf(node, comparison, key, w),
    }
}

fn leaf_column<'n>(node: &'n Node, key: &str, allowed: &[&str]) -> Result<&'n str> {
    if node.value.is_some() {
        return Err(Error::shape(key, format!("'{}' takes no value", node.name)));
    }
    if let Some(extra) = node.children.iter().find(|c| !allowed.contains(&c.name.as_str())) {
        return Err(Error::shape(
            key,
            format!("unexpected '{}' in '{}'", extra.name, node.name),
        ));
    }
    node.child("column")
        .and_then(Node::value_str)
        .ok_or_else(|| Error::shape(key, format!("'{}' requires a column", node.name)))
}

fn write_parameter_leaf(
    node: &Node,
    comparison: Comparison,
    key: &str,
    w: &mut StatementWriter<'_>,
) -> Result<()> {
    let column = leaf_column(node, key, &["column", "value"])?;
    let value = node.child("value");

    if comparison.is_null_test() {
        if value.is_some() {
            return Err(Error::shape(key, format!("'{}' takes no value", node.name)));
        }
        w.push_identifier(column)?;
        w.push_str(comparison.sql());
        return Ok(());
    }

    let value = value.ok_or_else(|| Error::shape(key, format!("'{}' requires a value", node.name)))?;

    if comparison == Comparison::In {
        let items = in_list(value, key)?;
        w.push_identifier(column)?;
        w.push_str(comparison.sql());
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                w.push_str(", ");
            }
            w.bind(item);
        }
        w.push_str(")");
        return Ok(());
    }

    if !value.children.is_empty() {
        return Err(Error::shape(
            key,
            format!("'{}' expects a scalar value", node.name),
        ));
    }
    let literal = value.value.clone().unwrap_or(Value::Null);
    w.push_identifier(column)?;
    w.push_str(comparison.sql());
    w.bind(literal);
    Ok(())
}

fn in_list(value: &Node, key: &str) -> Result<Vec<Value>> {
    let items: Vec<Value> = if value.children.is_empty() {
        value.value.iter().cloned().collect()
    } else {
        if value.value.is_some() {
            return Err(Error::shape(key, "'in' takes either a value or a list"));
        }
        value
            .children
            .iter()
            .map(|item| {
                if !item.children.is_empty() {
                    return Err(Error::shape(key, "'in' list items must be scalars"));
                }
                Ok(item.value.clone().unwrap_or(Value::Null))
            })
            .collect::<Result<_>>()?
    };
    if items.is_empty() {
        return Err(Error::shape(key, "'in' requires at least one value"));
    }
    Ok(items)
}

fn write_column_leaf(
    node: &Node,
    comparison: Comparison,
    key: &str,
    w: &mut StatementWriter<'_>,
) -> Result<()> {
    if !comparison.compares_columns() {
        return Err(Error::UnsupportedOperator {
            operator: node.name.clone(),
        });
    }
    let column = leaf_column(node, key, &["column", "to"])?;
    let to = node
        .child("to")
        .and_then(Node::value_str)
        .ok_or_else(|| Error::shape(key, format!("'{}' requires a 'to' column", node.name)))?;
    w.push_identifier(column)?;
    w.push_str(comparison.sql());
    w.push_identifier(to)?;
    Ok(())
}
