//! Tool discovery and invocation helpers shared by both subcommands.
//!
//! Descriptors are a snapshot: callers re-fetch whenever they want a fresh
//! view and the last fetch wins. Formatting is split out so the interactive
//! loop and the single-shot path print listings identically.

use anyhow::Result;
use rmcp::RoleClient;
use rmcp::model::{CallToolRequestParam, CallToolResult, Tool};
use rmcp::service::Peer;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema;
use crate::utils::output::{Color, color};

/// Snapshot of one remote tool: name, optional description, and the
/// JSON-Schema-shaped input contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: Value,
}

impl From<Tool> for ToolInfo {
    fn from(tool: Tool) -> Self {
        Self {
            name: tool.name.to_string(),
            description: tool.description.map(|d| d.to_string()),
            input_schema: Value::Object((*tool.input_schema).clone()),
        }
    }
}

/// Fetch the current tool descriptors.
pub async fn list_tools(client: &Peer<RoleClient>) -> Result<Vec<ToolInfo>> {
    let response = client.list_tools(Default::default()).await?;
    Ok(response.tools.into_iter().map(ToolInfo::from).collect())
}

/// `[name]: { input shape }` with a dimmed description line when present.
pub fn format_tool(tool: &ToolInfo) -> String {
    let shape = schema::to_ts_style_one_line(&tool.input_schema);
    let header = format!("{}: {shape}", color(Color::Cyan, format!("[{}]", tool.name)));
    match &tool.description {
        Some(description) => format!("{header}\n  {}", color(Color::Dim, description)),
        None => header,
    }
}

/// Exact-name membership in a descriptor snapshot.
pub fn validate_tool_name(tools: &[ToolInfo], tool_name: &str) -> bool {
    tools.iter().any(|tool| tool.name == tool_name)
}

/// Invoke a tool. An empty payload is sent as no arguments at all.
pub async fn call_tool(
    client: &Peer<RoleClient>,
    tool_name: &str,
    arguments: Map<String, Value>,
) -> Result<CallToolResult> {
    let result = client
        .call_tool(CallToolRequestParam {
            name: tool_name.to_string().into(),
            arguments: if arguments.is_empty() {
                None
            } else {
                Some(arguments)
            },
        })
        .await?;
    Ok(result)
}

/// `< result: {...}` with embedded `\n` escapes expanded so text content
/// blocks stay readable.
pub fn format_call_result(result: &CallToolResult) -> String {
    let value = serde_json::to_value(result).unwrap_or(Value::Null);
    let formatted = serde_json::to_string_pretty(&value)
        .unwrap_or_else(|_| value.to_string())
        .replace("\\n", "\n");
    format!("< result: {formatted}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_tool(description: Option<&str>) -> ToolInfo {
        ToolInfo {
            name: "read_file".to_string(),
            description: description.map(str::to_string),
            input_schema: json!({
                "type": "object",
                "properties": { "path": { "type": "string" } },
                "required": ["path"]
            }),
        }
    }

    #[test]
    fn format_tool_includes_name_and_shape() {
        // force plain output regardless of the test environment
        unsafe { std::env::set_var("NO_COLOR", "1") };
        let rendered = format_tool(&sample_tool(Some("Read a file")));
        assert_eq!(rendered, "[read_file]: { path: string; }\n  Read a file");
        let rendered = format_tool(&sample_tool(None));
        assert_eq!(rendered, "[read_file]: { path: string; }");
    }

    #[test]
    fn validate_tool_name_is_exact() {
        let tools = vec![sample_tool(None)];
        assert!(validate_tool_name(&tools, "read_file"));
        assert!(!validate_tool_name(&tools, "READ_FILE"));
        assert!(!validate_tool_name(&tools, "read"));
    }

    #[test]
    fn descriptor_serializes_camel_case() {
        let rendered = serde_json::to_value(sample_tool(None)).unwrap();
        assert!(rendered.get("inputSchema").is_some());
        assert!(rendered.get("description").is_none());
    }
}
