//! MCP client: session lifecycle over a stdio transport.
//!
//! Connecting spawns the server process, performs the `initialize`
//! handshake, and caches the server's tool list. After that the client
//! answers tool lookups synchronously and forwards `tools/call` requests.

use std::sync::RwLock;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::protocol::{
    CallToolResult, InitializeResult, ListToolsResult, PROTOCOL_VERSION, ToolDescriptor,
};
use super::transport::StdioTransport;
use crate::agent::tool::ToolDefinition;
use crate::error::McpError;

/// Output of a tool invocation, flattened to text.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Flattened text content.
    pub text: String,
    /// Whether the server marked the result as a tool failure.
    pub is_error: bool,
}

/// A connected MCP client session.
pub struct McpClient {
    name: String,
    transport: Mutex<Option<StdioTransport>>,
    tools: RwLock<Vec<ToolDescriptor>>,
    server_name: String,
}

impl McpClient {
    /// Spawns an MCP server and establishes a session.
    ///
    /// Performs the `initialize` request, sends `notifications/initialized`,
    /// and fetches the initial tool list.
    ///
    /// # Errors
    ///
    /// Returns [`McpError`] if the process cannot be spawned or the
    /// handshake fails.
    pub async fn connect(
        name: &str,
        command: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<Self, McpError> {
        let mut transport = StdioTransport::spawn(command, args, timeout)?;

        let result = transport
            .request(
                "initialize",
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": "rag-agent",
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            )
            .await?;

        let init: InitializeResult = serde_json::from_value(result)
            .map_err(|e| McpError::Protocol(format!("invalid initialize result: {e}")))?;

        transport.notify("notifications/initialized", json!({})).await?;

        let server_name = init
            .server_info
            .as_ref()
            .map_or_else(|| command.to_string(), |info| info.name.clone());

        debug!(
            client = name,
            server = server_name,
            protocol = init.protocol_version,
            "MCP session established"
        );

        let tools = Self::fetch_tools(&mut transport).await?;
        info!(
            client = name,
            server = server_name,
            tools = tools.len(),
            "connected to MCP server"
        );

        Ok(Self {
            name: name.to_string(),
            transport: Mutex::new(Some(transport)),
            tools: RwLock::new(tools),
            server_name,
        })
    }

    /// Client name (as configured, not the server's self-reported name).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The server's self-reported name from the handshake.
    #[must_use]
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Returns the cached tool definitions in function-calling shape.
    #[must_use]
    pub fn tools(&self) -> Vec<ToolDefinition> {
        self.tools
            .read()
            .map(|tools| tools.iter().map(ToolDefinition::from).collect())
            .unwrap_or_default()
    }

    /// Returns `true` if the server exposes a tool with this name.
    #[must_use]
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools
            .read()
            .map(|tools| tools.iter().any(|t| t.name == name))
            .unwrap_or(false)
    }

    /// Re-fetches the tool list from the server and refreshes the cache.
    ///
    /// # Errors
    ///
    /// Returns [`McpError`] on transport or protocol failures.
    pub async fn refresh_tools(&self) -> Result<Vec<ToolDefinition>, McpError> {
        let mut guard = self.transport.lock().await;
        let transport = guard.as_mut().ok_or(McpError::ServerClosed)?;
        let tools = Self::fetch_tools(transport).await?;
        let definitions = tools.iter().map(ToolDefinition::from).collect();
        if let Ok(mut cache) = self.tools.write() {
            *cache = tools;
        }
        Ok(definitions)
    }

    /// Invokes a tool on the server.
    ///
    /// # Errors
    ///
    /// Returns [`McpError`] on transport failures or JSON-RPC errors.
    /// Tool-level failures come back as [`ToolOutput::is_error`], not as an
    /// `Err`: they are part of the conversation, not a session fault.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolOutput, McpError> {
        let mut guard = self.transport.lock().await;
        let transport = guard.as_mut().ok_or(McpError::ServerClosed)?;

        let result = transport
            .request(
                "tools/call",
                json!({
                    "name": name,
                    "arguments": arguments,
                }),
            )
            .await?;

        let result: CallToolResult = serde_json::from_value(result)
            .map_err(|e| McpError::Protocol(format!("invalid tools/call result: {e}")))?;

        Ok(ToolOutput {
            text: result.text(),
            is_error: result.is_error,
        })
    }

    /// Closes the session and reaps the server process.
    ///
    /// Subsequent calls on this client fail with [`McpError::ServerClosed`].
    ///
    /// # Errors
    ///
    /// Returns [`McpError`] if the process refuses to die.
    pub async fn shutdown(&self) -> Result<(), McpError> {
        let transport = self.transport.lock().await.take();
        match transport {
            Some(transport) => transport.shutdown().await,
            None => Ok(()),
        }
    }

    async fn fetch_tools(transport: &mut StdioTransport) -> Result<Vec<ToolDescriptor>, McpError> {
        let result = transport.request("tools/list", json!({})).await?;
        let list: ListToolsResult = serde_json::from_value(result)
            .map_err(|e| McpError::Protocol(format!("invalid tools/list result: {e}")))?;
        Ok(list.tools)
    }
}

impl std::fmt::Debug for McpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpClient")
            .field("name", &self.name)
            .field("server_name", &self.server_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;

    /// Builds a shell script that answers initialize, the initialized
    /// notification, and tools/list, then handles one optional tools/call.
    fn scripted_server(call_response: &str) -> String {
        format!(
            r#"
read line
printf '%s\n' '{{"jsonrpc":"2.0","id":1,"result":{{"protocolVersion":"2024-11-05","capabilities":{{"tools":{{}}}},"serverInfo":{{"name":"scripted","version":"0.1.0"}}}}}}'
read line
read line
printf '%s\n' '{{"jsonrpc":"2.0","id":2,"result":{{"tools":[{{"name":"echo","description":"Echo text back","inputSchema":{{"type":"object","properties":{{"text":{{"type":"string"}}}},"required":["text"]}}}}]}}}}'
read line
printf '%s\n' '{call_response}'
"#
        )
    }

    async fn connect_scripted(call_response: &str) -> McpClient {
        let script = scripted_server(call_response);
        McpClient::connect(
            "test",
            "sh",
            &["-c".to_string(), script],
            Duration::from_secs(5),
        )
        .await
        .unwrap_or_else(|e| panic!("connect failed: {e}"))
    }

    #[tokio::test]
    async fn test_connect_and_list_tools() {
        let client =
            connect_scripted(r#"{"jsonrpc":"2.0","id":3,"result":{"content":[]}}"#).await;

        assert_eq!(client.server_name(), "scripted");
        let tools = client.tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "echo");
        assert!(client.has_tool("echo"));
        assert!(!client.has_tool("missing"));

        client
            .shutdown()
            .await
            .unwrap_or_else(|e| panic!("shutdown failed: {e}"));
    }

    #[tokio::test]
    async fn test_call_tool_success() {
        let client = connect_scripted(
            r#"{"jsonrpc":"2.0","id":3,"result":{"content":[{"type":"text","text":"hello back"}]}}"#,
        )
        .await;

        let output = client
            .call_tool("echo", serde_json::json!({"text": "hello"}))
            .await
            .unwrap_or_else(|e| panic!("call_tool failed: {e}"));
        assert!(!output.is_error);
        assert_eq!(output.text, "hello back");

        client
            .shutdown()
            .await
            .unwrap_or_else(|e| panic!("shutdown failed: {e}"));
    }

    #[tokio::test]
    async fn test_call_tool_error_flag() {
        let client = connect_scripted(
            r#"{"jsonrpc":"2.0","id":3,"result":{"content":[{"type":"text","text":"no such file"}],"isError":true}}"#,
        )
        .await;

        let output = client
            .call_tool("echo", serde_json::json!({"text": "x"}))
            .await
            .unwrap_or_else(|e| panic!("call_tool failed: {e}"));
        assert!(output.is_error);
        assert_eq!(output.text, "no such file");

        client
            .shutdown()
            .await
            .unwrap_or_else(|e| panic!("shutdown failed: {e}"));
    }

    #[tokio::test]
    async fn test_call_tool_rpc_error() {
        let client = connect_scripted(
            r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32602,"message":"invalid params"}}"#,
        )
        .await;

        let result = client.call_tool("echo", serde_json::json!({})).await;
        match result {
            Err(McpError::Rpc { code, .. }) => assert_eq!(code, -32602),
            other => panic!("expected Rpc error, got: {other:?}"),
        }

        client
            .shutdown()
            .await
            .unwrap_or_else(|e| panic!("shutdown failed: {e}"));
    }

    #[tokio::test]
    async fn test_call_after_shutdown() {
        let client =
            connect_scripted(r#"{"jsonrpc":"2.0","id":3,"result":{"content":[]}}"#).await;
        client
            .shutdown()
            .await
            .unwrap_or_else(|e| panic!("shutdown failed: {e}"));

        let result = client.call_tool("echo", serde_json::json!({})).await;
        assert!(matches!(result, Err(McpError::ServerClosed)));
    }

    #[tokio::test]
    async fn test_server_exits_without_response() {
        // Server answers the handshake, then exits before tools/list.
        let script = r#"
read line
printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2024-11-05","capabilities":{},"serverInfo":{"name":"flaky"}}}'
read line
read line
exit 0
"#;
        let result = McpClient::connect(
            "test",
            "sh",
            &["-c".to_string(), script.to_string()],
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(result, Err(McpError::ServerClosed)));
    }

    #[tokio::test]
    async fn test_noise_on_stdout_is_skipped() {
        // Server logs a plain line and a notification before each response.
        let script = r#"
read line
printf '%s\n' 'starting up...'
printf '%s\n' '{"jsonrpc":"2.0","method":"notifications/progress","params":{}}'
printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2024-11-05","capabilities":{},"serverInfo":{"name":"noisy"}}}'
read line
read line
printf '%s\n' '{"jsonrpc":"2.0","id":2,"result":{"tools":[]}}'
"#;
        let client = McpClient::connect(
            "test",
            "sh",
            &["-c".to_string(), script.to_string()],
            Duration::from_secs(5),
        )
        .await
        .unwrap_or_else(|e| panic!("connect failed: {e}"));
        assert_eq!(client.server_name(), "noisy");
        assert!(client.tools().is_empty());

        client
            .shutdown()
            .await
            .unwrap_or_else(|e| panic!("shutdown failed: {e}"));
    }
}
