//! JSON-Schema display rendering.
//!
//! Tool input contracts arrive as JSON-Schema-shaped values; listings show
//! them as TypeScript-style type expressions, which read far better than raw
//! schema JSON. Rendering is display-only; nothing here validates payloads.

use serde_json::Value;
use std::collections::HashSet;

/// Render a schema as a multi-line TypeScript-style type, two spaces of
/// indentation per level, `// description` suffixes on object properties.
pub fn to_ts_style(schema: &Value, indent: usize) -> String {
    render(schema, indent, true)
}

/// One-line variant for listings: same shape, descriptions omitted.
pub fn to_ts_style_one_line(schema: &Value) -> String {
    let rendered = render(schema, 0, false);
    rendered
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn render(schema: &Value, indent: usize, with_descriptions: bool) -> String {
    let Some(schema) = schema.as_object() else {
        return "unknown".to_string();
    };

    if let Some(variants) = schema.get("enum").and_then(Value::as_array) {
        return variants
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(" | ");
    }

    if let Some(parts) = schema.get("anyOf").and_then(Value::as_array) {
        return join_variants(parts, indent, with_descriptions, " | ");
    }
    if let Some(parts) = schema.get("oneOf").and_then(Value::as_array) {
        return join_variants(parts, indent, with_descriptions, " | ");
    }
    if let Some(parts) = schema.get("allOf").and_then(Value::as_array) {
        return join_variants(parts, indent, with_descriptions, " & ");
    }

    let types: Vec<&str> = match schema.get("type") {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(list)) => list.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };

    if types.contains(&"array")
        && let Some(items) = schema.get("items")
    {
        return format!("{}[]", render(items, indent, with_descriptions));
    }

    if types.contains(&"object")
        && let Some(props) = schema.get("properties").and_then(Value::as_object)
    {
        let required: HashSet<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let ind = "  ".repeat(indent);
        let inner_ind = "  ".repeat(indent + 1);
        let mut lines = vec!["{".to_string()];
        for (key, prop) in props {
            let optional = if required.contains(key.as_str()) { "" } else { "?" };
            let prop_type = render(prop, indent + 1, with_descriptions);
            let desc = if with_descriptions {
                prop.get("description")
                    .and_then(Value::as_str)
                    .map(|d| format!(" // {d}"))
                    .unwrap_or_default()
            } else {
                String::new()
            };
            lines.push(format!("{inner_ind}{key}{optional}: {prop_type};{desc}"));
        }
        lines.push(format!("{ind}}}"));
        return lines.join("\n");
    }

    for (name, ts) in [
        ("string", "string"),
        ("number", "number"),
        ("integer", "number"),
        ("boolean", "boolean"),
        ("null", "null"),
    ] {
        if types.contains(&name) {
            return ts.to_string();
        }
    }

    "unknown".to_string()
}

fn join_variants(parts: &[Value], indent: usize, with_descriptions: bool, sep: &str) -> String {
    parts
        .iter()
        .map(|part| render(part, indent, with_descriptions))
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn simple_string_property() {
        let schema = json!({
            "type": "object",
            "properties": { "text": { "type": "string" } },
            "required": ["text"]
        });
        assert_eq!(to_ts_style(&schema, 0), "{\n  text: string;\n}");
    }

    #[test]
    fn optional_property() {
        let schema = json!({
            "type": "object",
            "properties": {
                "count": { "type": "number" },
                "text": { "type": "string" }
            },
            "required": ["text"]
        });
        assert_eq!(to_ts_style(&schema, 0), "{\n  count?: number;\n  text: string;\n}");
    }

    #[test]
    fn property_with_description() {
        let schema = json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "The file path" }
            },
            "required": ["path"]
        });
        assert_eq!(
            to_ts_style(&schema, 0),
            "{\n  path: string; // The file path\n}"
        );
    }

    #[test]
    fn nested_object() {
        let schema = json!({
            "type": "object",
            "properties": {
                "config": {
                    "type": "object",
                    "properties": { "enabled": { "type": "boolean" } },
                    "required": ["enabled"]
                }
            },
            "required": ["config"]
        });
        assert_eq!(
            to_ts_style(&schema, 0),
            "{\n  config: {\n    enabled: boolean;\n  };\n}"
        );
    }

    #[test]
    fn array_type() {
        let schema = json!({
            "type": "object",
            "properties": {
                "items": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["items"]
        });
        assert_eq!(to_ts_style(&schema, 0), "{\n  items: string[];\n}");
    }

    #[test]
    fn enum_type() {
        let schema = json!({ "enum": ["active", "inactive", "pending"] });
        assert_eq!(
            to_ts_style(&schema, 0),
            "\"active\" | \"inactive\" | \"pending\""
        );
    }

    #[test]
    fn union_with_any_of() {
        let schema = json!({ "anyOf": [{ "type": "string" }, { "type": "number" }] });
        assert_eq!(to_ts_style(&schema, 0), "string | number");
    }

    #[test]
    fn intersection_with_all_of() {
        let schema = json!({ "allOf": [{ "type": "string" }, { "type": "null" }] });
        assert_eq!(to_ts_style(&schema, 0), "string & null");
    }

    #[test]
    fn mixed_primitives() {
        let schema = json!({
            "type": "object",
            "properties": {
                "active": { "type": "boolean" },
                "age": { "type": "integer" },
                "data": { "type": "null" },
                "name": { "type": "string" }
            },
            "required": ["name", "age"]
        });
        assert_eq!(
            to_ts_style(&schema, 0),
            "{\n  active?: boolean;\n  age: number;\n  data?: null;\n  name: string;\n}"
        );
    }

    #[test]
    fn unknown_fallbacks() {
        assert_eq!(to_ts_style(&json!({}), 0), "unknown");
        assert_eq!(to_ts_style(&json!("not a schema"), 0), "unknown");
    }

    #[test]
    fn one_line_collapses_and_drops_descriptions() {
        let schema = json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "The file path" },
                "recursive": { "type": "boolean" }
            },
            "required": ["path"]
        });
        assert_eq!(
            to_ts_style_one_line(&schema),
            "{ path: string; recursive?: boolean; }"
        );
    }
}
