//! # rag-agent
//!
//! A retrieval-augmented agent that combines three pieces:
//!
//! - **Chat completion** against any OpenAI-compatible API, with
//!   function-calling ([`agent`]).
//! - **MCP tool access**: tool servers are spawned as child processes and
//!   driven over the Model Context Protocol's stdio transport ([`mcp`]).
//! - **RAG**: a small corpus of markdown documents is embedded via an
//!   OpenAI-compatible embeddings endpoint and ranked by cosine similarity;
//!   the best matches are injected into the prompt as context ([`rag`]).
//!
//! The pipeline is a single pass: embed the task, pick the top documents,
//! hand the model the MCP tools, and loop model → tool calls → results
//! until it answers in text.
//!
//! The same retrieval pipeline is also exposed as an MCP *server*
//! ([`mcp::RetrievalServer`]), so other agents can use the knowledge base
//! as a tool.

pub mod agent;
pub mod cli;
pub mod error;
pub mod mcp;
pub mod rag;

pub use agent::{Agent, AgentConfig, AgentRunResult, LlmProvider, McpServerSpec};
pub use error::{AgentError, Error, McpError, Result, RetrievalError};
pub use mcp::{McpClient, ToolRouter};
pub use rag::{Document, Retriever, VectorStore};
