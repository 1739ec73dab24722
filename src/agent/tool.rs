//! Tool type definitions for function-calling.
//!
//! Provider-agnostic types for tool definitions, calls, and results. Unlike
//! a fixed internal tool table, definitions here arrive at runtime from
//! connected MCP servers and are forwarded to the model verbatim.

use serde::{Deserialize, Serialize};

/// A tool definition that can be sent to an LLM for function-calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match a tool on one of the connected MCP servers).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: serde_json::Value,
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (assigned by the provider).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// The result of executing a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result corresponds to.
    pub tool_call_id: String,
    /// Result content (tool output on success, error message on failure).
    pub content: String,
    /// Whether this result represents an error.
    pub is_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_definition_serialization() {
        let def = ToolDefinition {
            name: "retrieve".to_string(),
            description: "Search the knowledge base for relevant documents.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string" }
                },
                "required": ["query"]
            }),
        };
        let json = serde_json::to_string(&def).unwrap_or_default();
        assert!(json.contains("retrieve"));
        assert!(json.contains("query"));
    }

    #[test]
    fn test_tool_call_serialization() {
        let call = ToolCall {
            id: "call_123".to_string(),
            name: "fetch".to_string(),
            arguments: r#"{"url":"https://example.com/"}"#.to_string(),
        };
        let json = serde_json::to_string(&call).unwrap_or_default();
        assert!(json.contains("call_123"));
        assert!(json.contains("fetch"));
    }

    #[test]
    fn test_tool_result_serialization() {
        let result = ToolResult {
            tool_call_id: "call_123".to_string(),
            content: "3 documents found".to_string(),
            is_error: false,
        };
        let json = serde_json::to_string(&result).unwrap_or_default();
        assert!(json.contains("call_123"));
        assert!(!result.is_error);
    }

    #[test]
    fn test_tool_call_roundtrip() {
        let call = ToolCall {
            id: "call_7".to_string(),
            name: "write_file".to_string(),
            arguments: r##"{"path":"out/summary.md","content":"# Notes"}"##.to_string(),
        };
        let json = serde_json::to_string(&call).unwrap_or_default();
        let back: ToolCall = serde_json::from_str(&json).unwrap_or(ToolCall {
            id: String::new(),
            name: String::new(),
            arguments: String::new(),
        });
        assert_eq!(back.id, "call_7");
        assert_eq!(back.name, "write_file");
    }
}
