//! MCP (Model Context Protocol) support.
//!
//! Both sides of the protocol live here:
//!
//! - **Client** ([`McpClient`]): spawns tool servers as child processes,
//!   speaks JSON-RPC over their stdin/stdout, and forwards tool calls from
//!   the model. [`ToolRouter`] dispatches across several servers at once.
//! - **Server** ([`RetrievalServer`]): exposes this crate's own retrieval
//!   pipeline as an MCP tool over stdio, via `rmcp`.
//!
//! # Architecture
//!
//! ```text
//! Agent loop
//!   ↓ ToolCall
//! ToolRouter ──► McpClient ──► StdioTransport ──► child process (tools/call)
//!
//! External agent ──► RetrievalServer (stdio) ──► Retriever (retrieve)
//! ```

pub mod client;
pub mod params;
pub mod protocol;
pub mod router;
pub mod server;
pub mod transport;

pub use client::{McpClient, ToolOutput};
pub use params::RetrieveParams;
pub use router::ToolRouter;
pub use server::{RetrievalServer, serve_stdio};
pub use transport::StdioTransport;
