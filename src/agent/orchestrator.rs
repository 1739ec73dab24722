//! The agent: MCP servers + LLM + tool-calling loop.
//!
//! Ties the pieces together: connects the configured MCP servers, offers
//! their tools to the model, and drives the conversation until the model
//! answers in plain text.

use std::sync::Arc;

use tracing::{debug, info};

use super::agentic_loop::agentic_loop;
use super::config::AgentConfig;
use super::message::{ChatRequest, TokenUsage, system_message, user_message};
use super::provider::LlmProvider;
use super::tool::ToolDefinition;
use crate::error::{Error, McpError};
use crate::mcp::{McpClient, ToolRouter};

/// Launch specification for one MCP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpServerSpec {
    /// Client name used in logs and diagnostics.
    pub name: String,
    /// Command to launch (e.g., `"uvx"`, `"npx"`).
    pub command: String,
    /// Arguments passed to the command.
    pub args: Vec<String>,
}

impl McpServerSpec {
    /// Parses a whitespace-separated command line, e.g.
    /// `"uvx mcp-server-fetch"` or `"npx -y @modelcontextprotocol/server-filesystem ./out"`.
    ///
    /// The client name is derived from the last path segment of the command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Command`] if the command line is empty.
    pub fn parse(cmdline: &str) -> Result<Self, Error> {
        let mut parts = cmdline.split_whitespace().map(str::to_string);
        let command = parts
            .next()
            .ok_or_else(|| Error::Command(format!("empty MCP server command: '{cmdline}'")))?;
        let name = command
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(command.as_str())
            .to_string();
        Ok(Self {
            name,
            command,
            args: parts.collect(),
        })
    }
}

/// Outcome of a completed agent run.
#[derive(Debug, Clone)]
pub struct AgentRunResult {
    /// The model's final text answer.
    pub content: String,
    /// Token usage of the final completion.
    pub usage: TokenUsage,
}

/// An agent wired to a set of MCP servers.
///
/// Lifecycle mirrors the sessions it owns: [`Agent::connect`] spawns and
/// initializes every server, [`Agent::run`] executes one task, and
/// [`Agent::shutdown`] reaps the server processes.
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
    system_prompt: String,
    context: String,
    router: ToolRouter,
}

impl Agent {
    /// Connects all configured MCP servers and builds the agent.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if any server fails to spawn or complete its
    /// handshake. Servers connected before the failure are shut down.
    pub async fn connect(
        provider: Arc<dyn LlmProvider>,
        config: AgentConfig,
        system_prompt: impl Into<String>,
        context: impl Into<String>,
        servers: &[McpServerSpec],
    ) -> Result<Self, Error> {
        let mut clients: Vec<Arc<McpClient>> = Vec::with_capacity(servers.len());

        for spec in servers {
            let client =
                match McpClient::connect(&spec.name, &spec.command, &spec.args, config.timeout)
                    .await
                {
                    Ok(client) => client,
                    Err(e) => {
                        // Don't leak already-spawned server processes.
                        for connected in &clients {
                            let _ = connected.shutdown().await;
                        }
                        return Err(e.into());
                    }
                };
            clients.push(Arc::new(client));
        }

        let router = ToolRouter::new(clients);
        let tools = router.definitions();
        info!(tool_count = tools.len(), "agent connected");
        for tool in &tools {
            debug!(tool = tool.name, "available tool");
        }

        Ok(Self {
            provider,
            config,
            system_prompt: system_prompt.into(),
            context: context.into(),
            router,
        })
    }

    /// Tool definitions collected from all connected servers.
    #[must_use]
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.router.definitions()
    }

    /// Runs one task through the tool-calling loop.
    ///
    /// The conversation starts with the system prompt (if any), the
    /// retrieved context as a user message (if any), and the task itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] on provider failures or if the tool loop exceeds
    /// its iteration limit.
    pub async fn run(&self, task: &str) -> Result<AgentRunResult, Error> {
        let mut messages = Vec::new();
        if !self.system_prompt.is_empty() {
            messages.push(system_message(&self.system_prompt));
        }
        if !self.context.is_empty() {
            messages.push(user_message(&self.context));
        }
        messages.push(user_message(task));

        let mut request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: None,
            max_tokens: self.config.max_tokens,
            stream: false,
            tools: self.router.definitions(),
        };

        let response = agentic_loop(
            self.provider.as_ref(),
            &mut request,
            &self.router,
            self.config.max_tool_iterations,
        )
        .await?;

        Ok(AgentRunResult {
            content: response.content,
            usage: response.usage,
        })
    }

    /// Shuts down all connected MCP servers.
    ///
    /// # Errors
    ///
    /// Returns the first [`McpError`] encountered; remaining servers are
    /// still shut down.
    pub async fn shutdown(&self) -> Result<(), McpError> {
        self.router.shutdown().await
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("model", &self.config.model)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_parse_simple() {
        let spec = McpServerSpec::parse("uvx mcp-server-fetch")
            .unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(spec.name, "uvx");
        assert_eq!(spec.command, "uvx");
        assert_eq!(spec.args, vec!["mcp-server-fetch"]);
    }

    #[test]
    fn test_spec_parse_with_path_command() {
        let spec = McpServerSpec::parse("/usr/local/bin/python -m my_server")
            .unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(spec.name, "python");
        assert_eq!(spec.command, "/usr/local/bin/python");
        assert_eq!(spec.args, vec!["-m", "my_server"]);
    }

    #[test]
    fn test_spec_parse_filesystem_server() {
        let spec =
            McpServerSpec::parse("npx -y @modelcontextprotocol/server-filesystem ./output")
                .unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(spec.command, "npx");
        assert_eq!(
            spec.args,
            vec!["-y", "@modelcontextprotocol/server-filesystem", "./output"]
        );
    }

    #[test]
    fn test_spec_parse_empty() {
        assert!(McpServerSpec::parse("   ").is_err());
    }
}
