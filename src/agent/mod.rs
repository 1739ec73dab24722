//! Agent system for rag-agent.
//!
//! Combines an OpenAI-compatible chat model with tools served by MCP
//! servers. Uses a pluggable provider abstraction so the loop logic is
//! independent of any particular LLM vendor.
//!
//! # Architecture
//!
//! ```text
//! Task (+ retrieved context) → Agent
//!   ├── ChatRequest with MCP tool definitions
//!   ├── agentic_loop: model → tool calls → ToolRouter → results → model …
//!   └── Final text response
//! ```

pub mod agentic_loop;
pub mod client;
pub mod config;
pub mod message;
pub mod orchestrator;
pub mod provider;
pub mod providers;
pub mod tool;

// Re-export key types
pub use client::create_provider;
pub use config::AgentConfig;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use orchestrator::{Agent, AgentRunResult, McpServerSpec};
pub use provider::LlmProvider;
pub use tool::{ToolCall, ToolDefinition, ToolResult};
