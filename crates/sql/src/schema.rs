//! Argument schemas.
//!
//! Every operation publishes an [`ArgumentSchema`]: the ordered list of
//! top-level keys it accepts, whether each is required, and the shape its
//! node must have. Validation happens once, up front, so builders can read
//! arguments without re-checking their types.
//!
//! Validation order:
//! 1. Each top-level child is checked in order: unknown keys fail with
//!    `UnknownArgument`, repeated keys and shape mismatches with
//!    `InvalidArgumentShape`.
//! 2. Required keys are checked in schema order and fail with
//!    `MissingArgument`.

use serde::Serialize;
use sluice_core::{Error, Node, Result, Value};

/// Reserved key switching any CRUD operation into build-only mode.
pub const GENERATE_ONLY: &str = "generate-only";

/// Expected form of an argument node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    /// String value, no children
    Text,
    /// Non-negative integer value, no children
    Count,
    /// Boolean value, no children
    Flag,
    /// No value, any number of children
    Subtree,
    /// String value, optional children
    TextTree,
}

fn found(value: &Option<Value>) -> &'static str {
    value.as_ref().map_or("nothing", Value::type_name)
}

impl Shape {
    fn check(self, key: &str, node: &Node) -> Result<()> {
        let expects_children = matches!(self, Shape::Subtree | Shape::TextTree);
        if !expects_children && !node.children.is_empty() {
            return Err(Error::shape(key, "expected a scalar, found a subtree"));
        }

        match (self, &node.value) {
            (Shape::Subtree, None) => Ok(()),
            (Shape::Subtree, Some(_)) => Err(Error::shape(key, "expected a subtree, found a value")),
            (Shape::Text | Shape::TextTree, Some(Value::String(s))) if !s.is_empty() => Ok(()),
            (Shape::Text | Shape::TextTree, _) => {
                Err(Error::shape(key, "expected a non-empty string"))
            }
            (Shape::Count, Some(Value::Int(n))) if *n >= 0 => Ok(()),
            (Shape::Count, value) => Err(Error::shape(
                key,
                format!("expected a non-negative integer, found {}", found(value)),
            )),
            (Shape::Flag, Some(Value::Bool(_))) => Ok(()),
            (Shape::Flag, value) => Err(Error::shape(
                key,
                format!("expected a boolean, found {}", found(value)),
            )),
        }
    }

    /// Whether nodes of this shape carry a value.
    pub fn is_scalar(self) -> bool {
        !matches!(self, Shape::Subtree)
    }
}

/// One accepted top-level key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Argument {
    /// Key name.
    pub key: &'static str,
    /// Whether the key must be present.
    pub required: bool,
    /// Expected form.
    pub shape: Shape,
}

impl Argument {
    /// A required key.
    pub const fn required(key: &'static str, shape: Shape) -> Self {
        Self {
            key,
            required: true,
            shape,
        }
    }

    /// An optional key.
    pub const fn optional(key: &'static str, shape: Shape) -> Self {
        Self {
            key,
            required: false,
            shape,
        }
    }
}

/// The argument contract of one operation.
#[derive(Debug)]
pub struct ArgumentSchema {
    arguments: &'static [Argument],
}

impl ArgumentSchema {
    /// Create a schema from an ordered argument list.
    pub const fn new(arguments: &'static [Argument]) -> Self {
        Self { arguments }
    }

    /// Accepted arguments, in declaration order.
    pub fn arguments(&self) -> &'static [Argument] {
        self.arguments
    }

    /// Owned copy of the argument list for introspection callers.
    pub fn describe(&self) -> Vec<Argument> {
        self.arguments.to_vec()
    }

    /// Look up an accepted key.
    pub fn get(&self, key: &str) -> Option<&'static Argument> {
        self.arguments.iter().find(|a| a.key == key)
    }

    /// Validate the top-level children of `tree`.
    ///
    /// Pure: the same tree and schema always produce the same verdict.
    pub fn validate(&self, tree: &Node) -> Result<()> {
        for (index, child) in tree.children.iter().enumerate() {
            let argument = self.get(&child.name).ok_or_else(|| Error::UnknownArgument {
                key: child.name.clone(),
            })?;
            if tree.children[..index].iter().any(|c| c.name == child.name) {
                return Err(Error::shape(&child.name, "specified more than once"));
            }
            argument.shape.check(argument.key, child)?;
        }

        for argument in self.arguments.iter().filter(|a| a.required) {
            if tree.child(argument.key).is_none() {
                return Err(Error::MissingArgument {
                    key: argument.key.to_string(),
                });
            }
        }

        Ok(())
    }

    /// The schema in node form: scalar keys carry `"*"`, subtree keys no value.
    pub fn as_nodes(&self) -> Vec<Node> {
        self.arguments
            .iter()
            .map(|a| {
                if a.shape.is_scalar() {
                    Node::with_value(a.key, "*")
                } else {
                    Node::new(a.key)
                }
            })
            .collect()
    }
}
