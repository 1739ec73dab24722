//! Tool routing across connected MCP servers.
//!
//! Collects the union of tool definitions from every connected client and
//! dispatches tool calls from the model to whichever server owns the tool.
//! Failures become error [`ToolResult`]s fed back to the model, never a
//! crash of the agent loop.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::client::McpClient;
use crate::agent::tool::{ToolCall, ToolDefinition, ToolResult};
use crate::error::{AgentError, McpError};

/// Maximum raw byte length of tool argument JSON from the LLM.
const MAX_TOOL_ARGS_LEN: usize = 100_000;

/// Routes tool calls to the MCP server that owns each tool.
///
/// When two servers expose the same tool name, the first connected server
/// wins and the collision is logged.
pub struct ToolRouter {
    clients: Vec<Arc<McpClient>>,
}

impl ToolRouter {
    /// Creates a router over the given connected clients.
    #[must_use]
    pub fn new(clients: Vec<Arc<McpClient>>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        for client in &clients {
            for tool in client.tools() {
                if !seen.insert(tool.name.clone()) {
                    warn!(
                        tool = tool.name,
                        client = client.name(),
                        "duplicate tool name, earlier server wins"
                    );
                }
            }
        }
        Self { clients }
    }

    /// Returns the union of tool definitions, first server winning on
    /// name collisions.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut definitions = Vec::new();
        for client in &self.clients {
            for def in client.tools() {
                if seen.insert(def.name.clone()) {
                    definitions.push(def);
                }
            }
        }
        definitions
    }

    /// Returns `true` if no connected server exposes any tool.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions().is_empty()
    }

    /// Executes a tool call, converting any failure into an error result.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        match self.try_execute(call).await {
            Ok(content) => ToolResult {
                tool_call_id: call.id.clone(),
                content,
                is_error: false,
            },
            Err(e) => ToolResult {
                tool_call_id: call.id.clone(),
                content: e.to_string(),
                is_error: true,
            },
        }
    }

    /// Shuts down every connected client.
    ///
    /// # Errors
    ///
    /// Returns the first [`McpError`] encountered; remaining clients are
    /// still shut down.
    pub async fn shutdown(&self) -> Result<(), McpError> {
        let mut first_err = None;
        for client in &self.clients {
            if let Err(e) = client.shutdown().await {
                warn!(client = client.name(), error = %e, "MCP shutdown failed");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn try_execute(&self, call: &ToolCall) -> Result<String, AgentError> {
        if call.arguments.len() > MAX_TOOL_ARGS_LEN {
            return Err(AgentError::ToolExecution {
                name: call.name.clone(),
                message: format!(
                    "tool arguments too large ({} bytes, max {MAX_TOOL_ARGS_LEN})",
                    call.arguments.len()
                ),
            });
        }

        // Models occasionally emit an empty arguments string for
        // parameterless tools; MCP requires an object either way.
        let arguments: Value = if call.arguments.trim().is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&call.arguments).map_err(|e| AgentError::ToolExecution {
                name: call.name.clone(),
                message: format!("invalid arguments: {e}"),
            })?
        };

        if !arguments.is_object() {
            return Err(AgentError::ToolExecution {
                name: call.name.clone(),
                message: "arguments must be a JSON object".to_string(),
            });
        }

        let client = self
            .clients
            .iter()
            .find(|c| c.has_tool(&call.name))
            .ok_or_else(|| AgentError::ToolExecution {
                name: call.name.clone(),
                message: "unknown tool".to_string(),
            })?;

        debug!(tool = call.name, client = client.name(), "dispatching tool call");

        let output =
            client
                .call_tool(&call.name, arguments)
                .await
                .map_err(|e| AgentError::ToolExecution {
                    name: call.name.clone(),
                    message: e.to_string(),
                })?;

        if output.is_error {
            return Err(AgentError::ToolExecution {
                name: call.name.clone(),
                message: output.text,
            });
        }

        Ok(output.text)
    }
}

impl std::fmt::Debug for ToolRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRouter")
            .field("clients", &self.clients.len())
            .finish()
    }
}
