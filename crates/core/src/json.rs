//! JSON bridge for command trees.
//!
//! Transport layers exchange command trees as plain JSON. The mapping is:
//!
//! | JSON | Node |
//! |------|------|
//! | scalar | node value |
//! | object | children, one per key, in key order |
//! | array | children; `{"key": {..}}` / `{"key": [..]}` items keep their key as name, others are `.` |
//! | `{"$value": v, ..}` | node value alongside children |
//! | `{"$children": [..]}` | children with repeated names |
//!
//! Scalars without a native JSON form use tagged objects:
//!
//! | Type | JSON Representation |
//! |------|---------------------|
//! | Bytes | `{"$bytes": "<base64>"}` |
//! | DateTime | `{"$datetime": "<rfc3339>"}` |
//! | NaN | `{"$f64": "NaN"}` |
//! | +Infinity | `{"$f64": "+Inf"}` |
//! | -Infinity | `{"$f64": "-Inf"}` |
//!
//! Object key order is preserved, so the children of a parsed tree follow
//! the order the caller wrote them in.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value as JsonValue};

use crate::node::{Node, ANONYMOUS};
use crate::{Error, Result, Value};

const VALUE_KEY: &str = "$value";
const CHILDREN_KEY: &str = "$children";
const BYTES_KEY: &str = "$bytes";
const DATETIME_KEY: &str = "$datetime";
const F64_KEY: &str = "$f64";

/// Convert a scalar value to JSON with special encoding.
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::Number((*i).into()),
        Value::Float(f) => float_to_json(*f),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::DateTime(d) => serde_json::json!({ DATETIME_KEY: d.to_rfc3339() }),
        Value::Bytes(b) => serde_json::json!({ BYTES_KEY: BASE64.encode(b) }),
    }
}

/// Convert a JSON scalar (or tagged scalar object) to a value.
///
/// Returns `None` for arrays and untagged objects.
pub fn json_to_value(json: &JsonValue) -> Option<std::result::Result<Value, String>> {
    match json {
        JsonValue::Null => Some(Ok(Value::Null)),
        JsonValue::Bool(b) => Some(Ok(Value::Bool(*b))),
        JsonValue::Number(n) => Some(if let Some(i) = n.as_i64() {
            Ok(Value::Int(i))
        } else if let Some(f) = n.as_f64() {
            Ok(Value::Float(f))
        } else {
            Err("Invalid number".to_string())
        }),
        JsonValue::String(s) => Some(Ok(Value::String(s.clone()))),
        JsonValue::Array(_) => None,
        JsonValue::Object(obj) => tagged_scalar(obj),
    }
}

fn tagged_scalar(obj: &Map<String, JsonValue>) -> Option<std::result::Result<Value, String>> {
    if obj.len() != 1 {
        return None;
    }
    let (key, inner) = obj.iter().next()?;
    let JsonValue::String(s) = inner else {
        return None;
    };
    match key.as_str() {
        BYTES_KEY => Some(
            BASE64
                .decode(s)
                .map(Value::Bytes)
                .map_err(|e| format!("Invalid base64: {}", e)),
        ),
        DATETIME_KEY => Some(
            DateTime::parse_from_rfc3339(s)
                .map(|d| Value::DateTime(d.with_timezone(&Utc)))
                .map_err(|e| format!("Invalid datetime: {}", e)),
        ),
        F64_KEY => Some(special_float_from_str(s).map(Value::Float)),
        _ => None,
    }
}

fn float_to_json(f: f64) -> JsonValue {
    if f.is_nan() {
        serde_json::json!({ F64_KEY: "NaN" })
    } else if f.is_infinite() {
        if f.is_sign_positive() {
            serde_json::json!({ F64_KEY: "+Inf" })
        } else {
            serde_json::json!({ F64_KEY: "-Inf" })
        }
    } else {
        serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or_else(|| serde_json::json!({ F64_KEY: f.to_string() }))
    }
}

fn special_float_from_str(s: &str) -> std::result::Result<f64, String> {
    match s {
        "NaN" => Ok(f64::NAN),
        "+Inf" => Ok(f64::INFINITY),
        "-Inf" => Ok(f64::NEG_INFINITY),
        other => other
            .parse::<f64>()
            .map_err(|e| format!("Invalid float: {}", e)),
    }
}

/// Parse a JSON document into a node named `name`.
pub fn node_from_json(name: &str, json: &JsonValue) -> Result<Node> {
    if let Some(scalar) = json_to_value(json) {
        let value = scalar.map_err(|reason| Error::shape(name, reason))?;
        return Ok(Node {
            name: name.to_string(),
            value: Some(value),
            children: Vec::new(),
        });
    }

    let mut node = Node::new(name);
    match json {
        JsonValue::Array(items) => {
            node.children = array_children(name, items, false)?;
        }
        JsonValue::Object(obj) => {
            for (key, inner) in obj {
                match key.as_str() {
                    VALUE_KEY => {
                        let value = json_to_value(inner)
                            .ok_or_else(|| Error::shape(name, "$value must be a scalar"))?
                            .map_err(|reason| Error::shape(name, reason))?;
                        node.value = Some(value);
                    }
                    CHILDREN_KEY => {
                        let JsonValue::Array(items) = inner else {
                            return Err(Error::shape(name, "$children must be an array"));
                        };
                        node.children.extend(array_children(name, items, true)?);
                    }
                    _ => node.children.push(node_from_json(key, inner)?),
                }
            }
        }
        _ => unreachable!("scalars handled above"),
    }
    Ok(node)
}

fn array_children(name: &str, items: &[JsonValue], named_scalars: bool) -> Result<Vec<Node>> {
    items
        .iter()
        .map(|item| match named_item(item, named_scalars) {
            Some((key, inner)) => node_from_json(key, inner),
            None => node_from_json(ANONYMOUS, item),
        })
        .collect::<Result<Vec<_>>>()
        .map_err(|e| match e {
            Error::InvalidArgumentShape { reason, .. } => Error::shape(name, reason),
            other => other,
        })
}

/// `{"key": {..}}` and `{"key": [..]}` array items name their node. Inside
/// `$children`, `{"key": scalar}` items do too.
fn named_item(item: &JsonValue, named_scalars: bool) -> Option<(&str, &JsonValue)> {
    let JsonValue::Object(obj) = item else {
        return None;
    };
    if obj.len() != 1 {
        return None;
    }
    let (key, inner) = obj.iter().next()?;
    if key.starts_with('$') {
        return None;
    }
    if named_scalars || json_to_value(inner).is_none() {
        Some((key.as_str(), inner))
    } else {
        None
    }
}

/// Render a node as JSON. The node's own name is not part of the output.
pub fn node_to_json(node: &Node) -> JsonValue {
    if node.children.is_empty() {
        return node.value.as_ref().map(value_to_json).unwrap_or(JsonValue::Null);
    }

    let children = children_to_json(&node.children);
    match (&node.value, children) {
        (None, children) => children,
        (Some(value), JsonValue::Object(map)) => {
            let mut obj = Map::with_capacity(map.len() + 1);
            obj.insert(VALUE_KEY.to_string(), value_to_json(value));
            obj.extend(map);
            JsonValue::Object(obj)
        }
        (Some(value), list) => {
            let mut obj = Map::with_capacity(2);
            obj.insert(VALUE_KEY.to_string(), value_to_json(value));
            obj.insert(CHILDREN_KEY.to_string(), list);
            JsonValue::Object(obj)
        }
    }
}

fn children_to_json(children: &[Node]) -> JsonValue {
    if children.iter().all(|c| c.name == ANONYMOUS) {
        return JsonValue::Array(children.iter().map(node_to_json).collect());
    }

    let unique = children
        .iter()
        .enumerate()
        .all(|(i, c)| c.name != ANONYMOUS && !children[..i].iter().any(|p| p.name == c.name));
    if unique {
        let map = children
            .iter()
            .map(|c| (c.name.clone(), node_to_json(c)))
            .collect::<Map<_, _>>();
        return JsonValue::Object(map);
    }

    JsonValue::Array(
        children
            .iter()
            .map(|c| {
                if c.name == ANONYMOUS {
                    node_to_json(c)
                } else {
                    let mut item = Map::with_capacity(1);
                    item.insert(c.name.clone(), node_to_json(c));
                    JsonValue::Object(item)
                }
            })
            .collect(),
    )
}
