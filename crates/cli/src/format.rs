//! Output formatting for the CLI.

use serde_json::{json, Value as JsonValue};
use sluice_executor::{json::node_to_json, ArgumentInfo, Error, Node};

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputMode {
    /// Single-line JSON instead of pretty-printed.
    pub compact: bool,
    /// Errors as JSON objects instead of `(error) ...` lines.
    pub json_errors: bool,
}

fn render(value: &JsonValue, mode: OutputMode) -> String {
    let rendered = if mode.compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    rendered.unwrap_or_else(|_| value.to_string())
}

/// Format a result tree.
pub fn format_tree(node: &Node, mode: OutputMode) -> String {
    render(&node_to_json(node), mode)
}

/// Format an operation's argument list.
pub fn format_arguments(arguments: &[ArgumentInfo], mode: OutputMode) -> String {
    if mode.json_errors || mode.compact {
        return render(&json!(arguments), mode);
    }
    let width = arguments.iter().map(|a| a.key.len()).max().unwrap_or(0);
    arguments
        .iter()
        .map(|a| {
            let shape = serde_json::to_value(a.shape)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            let required = if a.required { "required" } else { "optional" };
            format!("{:<width$}  {:<9}  {}", a.key, shape, required, width = width)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format an error.
pub fn format_error(err: &Error, mode: OutputMode) -> String {
    if mode.json_errors {
        let detail = serde_json::to_value(err).unwrap_or(JsonValue::Null);
        return render(&json!({ "error": err.to_string(), "detail": detail }), mode);
    }
    format!("(error) {}", err)
}
