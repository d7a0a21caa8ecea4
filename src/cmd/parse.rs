/*!
`parse.rs` - the argument-ingestion pipeline shared by `connect` and `run`.

One line of human-typed (or shell-split) text becomes a string-keyed
`serde_json::Map` ready to ship as tool-call arguments. Two input grammars
feed the same funnel:

  - JSON5 object literals:   { path: '.', recursive: true, }
  - query-style pairs:       path=. recursive=true user.name="Jo Doe"

`parse_payload` picks the grammar by sniffing the first non-whitespace
character (`{` means JSON5). Every function here returns a `Result`; a bad
line is an error value for the caller to print, never a panic.
*/

use anyhow::{Result, anyhow, bail};
use serde_json::{Map, Value};

/// One interactive line split into a tool name and the raw payload text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub payload_text: String,
}

/// Split a line at its first space: tool name before, payload text after.
/// Without a space the whole line is the tool name and the payload is empty.
pub fn parse_invocation(input: &str) -> Result<ToolInvocation> {
    let (tool_name, payload_text) = match input.split_once(' ') {
        Some((name, rest)) => (name.trim(), rest.trim()),
        None => (input.trim(), ""),
    };
    if tool_name.is_empty() {
        bail!("tool name is required");
    }
    Ok(ToolInvocation {
        tool_name: tool_name.to_string(),
        payload_text: payload_text.to_string(),
    })
}

/// Parse a relaxed-JSON (JSON5) object literal: unquoted identifier keys,
/// single-quoted strings, and trailing commas are all accepted.
///
/// The top-level value must be an object; arrays and scalars are rejected
/// rather than wrapped.
pub fn parse_json5_payload(text: &str, allow_empty: bool) -> Result<Map<String, Value>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        if allow_empty {
            return Ok(Map::new());
        }
        bail!("JSON payload is required");
    }
    let parsed: Value =
        json5::from_str(trimmed).map_err(|e| anyhow!("Failed to parse JSON5: {e}"))?;
    match parsed {
        Value::Object(map) => Ok(map),
        other => bail!("JSON payload must be an object (found {})", value_kind(&other)),
    }
}

/// Parse `key=value` pairs from one line of text, honoring shell quoting.
pub fn parse_query_style(text: &str) -> Result<Map<String, Value>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Map::new());
    }
    if let Some(op) = find_unquoted_operator(trimmed) {
        bail!("Unsupported shell operator '{op}' in arguments");
    }
    let parts = shell_words::split(trimmed).map_err(|e| anyhow!("Invalid arguments: {e}"))?;
    parse_query_parts(parts.iter().map(String::as_str))
}

/// Parse pre-split CLI args (already tokenized by the invoking shell, so no
/// quote handling here). Same key and coercion semantics as `parse_query_style`.
pub fn parse_query_args(args: &[String]) -> Result<Map<String, Value>> {
    parse_query_parts(args.iter().map(String::as_str))
}

/// Auto-detect the payload grammar: `{` routes to JSON5, anything else to
/// query-style pairs.
pub fn parse_payload(input: &str, allow_empty: bool) -> Result<Map<String, Value>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        if allow_empty {
            return Ok(Map::new());
        }
        bail!("payload is required");
    }
    if trimmed.starts_with('{') {
        parse_json5_payload(trimmed, allow_empty)
    } else {
        parse_query_style(trimmed)
    }
}

/// `parse_payload` over an argument vector. Detection runs on the joined
/// text; the query route consumes the vector as-is so values that were quoted
/// on the command line survive intact.
pub fn parse_payload_args(args: &[String], allow_empty: bool) -> Result<Map<String, Value>> {
    let joined = args.join(" ");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        if allow_empty {
            return Ok(Map::new());
        }
        bail!("payload is required");
    }
    if trimmed.starts_with('{') {
        parse_json5_payload(trimmed, allow_empty)
    } else {
        parse_query_args(args)
    }
}

/// Fold the token sequence into a payload map, one insertion per token.
/// On conflicting keys the later token wins outright: a flat assignment
/// replaces a previously built object and a dotted path discards a
/// previously set scalar.
fn parse_query_parts<'a>(parts: impl Iterator<Item = &'a str>) -> Result<Map<String, Value>> {
    let mut payload = Map::new();
    for part in parts {
        let Some((raw_key, raw_value)) = part.split_once('=') else {
            bail!("Invalid argument format: \"{part}\" (expected key=value)");
        };
        if raw_key.is_empty() {
            bail!("Empty key in argument: \"{part}\"");
        }
        let value = coerce_scalar(raw_value);
        match literal_bracket_key(raw_key) {
            // [key.with.dots] keeps the key literal, no nesting
            Some(literal) => {
                payload.insert(literal.to_string(), value);
            }
            None => insert_path(&mut payload, raw_key, value),
        }
    }
    Ok(payload)
}

/// A key wrapped in one pair of square brackets with non-empty content.
fn literal_bracket_key(key: &str) -> Option<&str> {
    key.strip_prefix('[')?
        .strip_suffix(']')
        .filter(|inner| !inner.is_empty())
}

/// Set a value through dot notation: `foo.bar` writes `payload.foo.bar`.
/// Non-terminal segments reuse an existing object or replace whatever else
/// sits there; empty segments (consecutive or edge dots) are kept as
/// empty-string keys.
fn insert_path(payload: &mut Map<String, Value>, key: &str, value: Value) {
    if !key.contains('.') {
        payload.insert(key.to_string(), value);
        return;
    }
    let segments: Vec<&str> = key.split('.').collect();
    let mut current = payload;
    for segment in &segments[..segments.len() - 1] {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(next) = slot else {
            unreachable!()
        };
        current = next;
    }
    current.insert(segments[segments.len() - 1].to_string(), value);
}

/// Coerce one raw token into a typed value: the literals `true`/`false`/
/// `null`, then whole-token integers, then whole-token finite floats,
/// otherwise the string unchanged. `42px` and the empty string stay strings.
fn coerce_scalar(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => {
            if let Ok(int) = raw.parse::<i64>() {
                Value::Number(int.into())
            } else if let Some(num) = raw
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .and_then(serde_json::Number::from_f64)
            {
                Value::Number(num)
            } else {
                Value::String(raw.to_string())
            }
        }
    }
}

/// Scan for shell operators outside quotes. Quoted operators are data;
/// unquoted ones mean the line was meant for a shell, not for this parser.
fn find_unquoted_operator(input: &str) -> Option<char> {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    for c in input.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if !in_single => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '|' | '&' | ';' | '<' | '>' | '(' | ')' if !in_single && !in_double => {
                return Some(c);
            }
            _ => {}
        }
    }
    None
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
