//! The command tree.
//!
//! A [`Node`] is a name, an optional scalar [`Value`], and an ordered list of
//! children. One tree describes one CRUD request; the same tree is rewritten
//! in place with the result once the request has executed.
//!
//! ```text
//! read
//!   connection = "main"
//!   table = "users"
//!   columns
//!     id
//!     name
//!   where
//!     eq
//!       column = "id"
//!       value = 42
//!   limit = 10
//! ```

use serde::{Deserialize, Serialize};

use crate::Value;

/// Name used for anonymous nodes (result rows, list items).
pub const ANONYMOUS: &str = ".";

/// One node of a command tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node name. Top-level names are argument keys.
    pub name: String,
    /// Optional scalar value. `None` means "no value", `Some(Value::Null)`
    /// is an explicit null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Ordered children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node with no value and no children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            children: Vec::new(),
        }
    }

    /// Create a node carrying a value.
    pub fn with_value(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Builder-style append of several children.
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Append a child.
    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// The node's value if it is a string.
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(Value::as_str)
    }
}
