//! Scalar values carried by command tree nodes.
//!
//! The [`Value`] enum is closed: every literal a caller can place in a
//! command tree, and every column value a database hands back, is one of
//! these seven variants.
//!
//! ### Type Rules
//!
//! - No implicit coercions: `Int(1) != Float(1.0)`
//! - `Bytes` are not `String`
//! - Float uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar value in a command tree or a result row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// SQL null
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754)
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Point in time, normalized to UTC
    DateTime(DateTime<Utc>),
    /// Raw bytes
    Bytes(Vec<u8>),
}

// Custom PartialEq implementation for IEEE-754 float semantics
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Variant name, as used in shape errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Bytes(_) => "bytes",
        }
    }

    /// Whether this is SQL null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The flag, for `Bool` only.
    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// The integer, for `Int` only. Floats are not truncated.
    pub fn as_int(&self) -> Option<i64> {
        if let Value::Int(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    /// The text, for `String` only.
    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }
}

/// Human-readable rendering, used for diagnostics and CLI output.
///
/// This is never used to place a value into SQL text.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::DateTime(d) => f.write_str(&d.to_rfc3339()),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

macro_rules! impl_from {
    ($($source:ty => |$v:ident| $convert:expr),* $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from($v: $source) -> Self {
                    $convert
                }
            }
        )*
    };
}

impl_from! {
    bool => |b| Value::Bool(b),
    i32 => |n| Value::Int(i64::from(n)),
    i64 => |n| Value::Int(n),
    f64 => |x| Value::Float(x),
    &str => |s| Value::String(s.to_owned()),
    String => |s| Value::String(s),
    DateTime<Utc> => |d| Value::DateTime(d),
    Vec<u8> => |b| Value::Bytes(b),
    &[u8] => |b| Value::Bytes(b.to_vec()),
    () => |_unit| Value::Null,
}
