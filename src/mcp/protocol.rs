//! MCP wire types: JSON-RPC 2.0 framing and protocol payloads.
//!
//! Covers the subset of the Model Context Protocol this crate speaks as a
//! client: the `initialize` handshake, `tools/list`, and `tools/call`.
//! Protocol revision 2024-11-05.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::tool::ToolDefinition;

/// MCP protocol revision sent during the initialize handshake.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC request (2.0).
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Request ID; the response echoes it back.
    pub id: u64,
    /// Method name (e.g., `"tools/call"`).
    pub method: String,
    /// Method parameters.
    pub params: Value,
}

impl JsonRpcRequest {
    /// Creates a request with the given ID, method, and params.
    #[must_use]
    pub fn new(id: u64, method: &str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC notification (no ID, no response expected).
#[derive(Debug, Serialize)]
pub struct JsonRpcNotification {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Method name (e.g., `"notifications/initialized"`).
    pub method: String,
    /// Method parameters.
    pub params: Value,
}

impl JsonRpcNotification {
    /// Creates a notification with the given method and params.
    #[must_use]
    pub fn new(method: &str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.to_string(),
            params,
        }
    }
}

/// An incoming JSON-RPC frame.
///
/// Server-originated notifications and requests carry a `method`; responses
/// carry `result` or `error` plus the echoed `id`. One lenient shape covers
/// all three so the transport can route or skip frames without guessing.
#[derive(Debug, Deserialize)]
pub struct JsonRpcFrame {
    /// Echoed request ID (absent on notifications).
    pub id: Option<Value>,
    /// Method name (present on notifications and server requests).
    pub method: Option<String>,
    /// Successful result payload.
    pub result: Option<Value>,
    /// Error payload.
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    /// Error code (e.g., -32601 for method-not-found).
    pub code: i64,
    /// Human-readable message.
    pub message: String,
}

// ---------------------------------------------------------------------------
// MCP payload types
// ---------------------------------------------------------------------------

/// Result of the `initialize` request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Protocol revision the server settled on.
    pub protocol_version: String,
    /// Server identity.
    #[serde(default)]
    pub server_info: Option<ServerIdentity>,
}

/// Server name and version from the initialize handshake.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerIdentity {
    /// Server name.
    pub name: String,
    /// Server version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Result of `tools/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListToolsResult {
    /// Tools exposed by the server.
    pub tools: Vec<ToolDescriptor>,
}

/// A tool advertised by an MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// JSON Schema for the tool's arguments.
    #[serde(rename = "inputSchema", default = "empty_schema")]
    pub input_schema: Value,
}

fn empty_schema() -> Value {
    serde_json::json!({})
}

impl From<&ToolDescriptor> for ToolDefinition {
    fn from(tool: &ToolDescriptor) -> Self {
        Self {
            name: tool.name.clone(),
            description: tool.description.clone().unwrap_or_default(),
            parameters: tool.input_schema.clone(),
        }
    }
}

/// Result of `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolResult {
    /// Content items produced by the tool.
    #[serde(default)]
    pub content: Vec<ContentItem>,
    /// Whether the tool reported a failure.
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl CallToolResult {
    /// Flattens all text content items into a single string.
    ///
    /// Non-text items (images, resources) are represented by a placeholder
    /// naming their type, so the model still learns they exist.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|item| match item.text {
                Some(ref t) => t.clone(),
                None => format!("[{} content]", item.kind),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A single content item in a tool result.
///
/// Parsed leniently: only `type` and `text` are interpreted, so servers that
/// return images or embedded resources do not break the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    /// Content type (`"text"`, `"image"`, `"resource"`, …).
    #[serde(rename = "type")]
    pub kind: String,
    /// Text payload for `"text"` items.
    #[serde(default)]
    pub text: Option<String>,
}
