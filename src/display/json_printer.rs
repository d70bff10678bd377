//! Colorized JSON pretty-printing for terminal output.
//!
//! Renders JSON values with syntax highlighting:
//! - Field names in cyan
//! - Strings in green
//! - Numbers in yellow
//! - Booleans in magenta
//! - Null in red

use std::fmt::Write;

use serde_json::Value;

const RESET: &str = "\x1b[0m";
const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const MAGENTA: &str = "\x1b[35m";
const RED: &str = "\x1b[31m";

const INDENT: &str = "  ";

/// Render a JSON value with 2-space indentation.
///
/// When `use_color` is false the output is plain JSON, identical to
/// `serde_json::to_string_pretty`.
pub fn render_json(value: &Value, use_color: bool) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0, use_color);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize, use_color: bool) {
    match value {
        Value::Null => paint(out, "null", RED, use_color),
        Value::Bool(b) => paint(out, if *b { "true" } else { "false" }, MAGENTA, use_color),
        Value::Number(n) => paint(out, &n.to_string(), YELLOW, use_color),
        Value::String(_) => paint(out, &value.to_string(), GREEN, use_color),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline(out, depth + 1);
                write_value(out, item, depth + 1, use_color);
            }
            newline(out, depth);
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline(out, depth + 1);
                paint(out, &Value::from(key.as_str()).to_string(), CYAN, use_color);
                out.push_str(": ");
                write_value(out, item, depth + 1, use_color);
            }
            newline(out, depth);
            out.push('}');
        }
    }
}

fn newline(out: &mut String, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn paint(out: &mut String, text: &str, color: &str, use_color: bool) {
    if use_color {
        let _ = write!(out, "{color}{text}{RESET}");
    } else {
        out.push_str(text);
    }
}
