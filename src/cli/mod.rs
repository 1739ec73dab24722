//! CLI layer for rag-agent.
//!
//! Provides the command-line interface using clap, with commands for
//! running agent tasks, querying the knowledge base, plain chat, and
//! serving retrieval over MCP.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use parser::{Cli, Commands, McpCommands};
