//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rag-agent: retrieval-augmented agent with MCP tool access.
///
/// Retrieves context from a local knowledge directory by embedding
/// similarity, then lets an OpenAI-compatible model solve a task using
/// tools served over the Model Context Protocol.
#[derive(Parser, Debug)]
#[command(name = "rag-agent")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a task through the agent.
    ///
    /// Optionally retrieves context from a knowledge directory first, then
    /// drives the tool-calling loop against the configured MCP servers.
    #[command(after_help = r#"Examples:
  rag-agent run "Summarize https://example.com/" --mcp "uvx mcp-server-fetch"
  rag-agent run "Who is Karianne?" --knowledge ./knowledge
  rag-agent run "Save notes on Antonette to out/antonette.md" \
      --knowledge ./knowledge \
      --mcp "uvx mcp-server-fetch" \
      --mcp "npx -y @modelcontextprotocol/server-filesystem ./out"
  OPENAI_API_KEY=sk-... rag-agent run "hello" --model gpt-4o-mini
"#)]
    Run {
        /// The task for the agent to perform.
        task: String,

        /// Knowledge directory to retrieve context from.
        #[arg(short = 'K', long, env = "RAG_KNOWLEDGE_DIR")]
        knowledge: Option<PathBuf>,

        /// Number of documents to inject as context.
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// MCP server command line (repeatable), e.g. "uvx mcp-server-fetch".
        #[arg(long = "mcp", value_name = "CMDLINE")]
        mcp: Vec<String>,

        /// Chat model override.
        #[arg(short, long)]
        model: Option<String>,

        /// System prompt for the agent.
        #[arg(long)]
        system_prompt: Option<String>,

        /// Skip context retrieval even when a knowledge directory is set.
        #[arg(long)]
        no_context: bool,
    },

    /// Rank knowledge-base documents against a query.
    ///
    /// Runs only the retrieval half of the pipeline and prints the ranked
    /// documents with their similarity scores.
    #[command(after_help = r#"Examples:
  rag-agent retrieve "vector databases" --knowledge ./knowledge
  rag-agent retrieve "deep learning" -K ./knowledge -k 5
  rag-agent retrieve "Karianne" -K ./knowledge --full
"#)]
    Retrieve {
        /// The search query.
        query: String,

        /// Knowledge directory to search.
        #[arg(short = 'K', long, env = "RAG_KNOWLEDGE_DIR")]
        knowledge: PathBuf,

        /// Maximum number of documents to return.
        #[arg(short = 'k', long, default_value = "3")]
        top_k: usize,

        /// Print full document text instead of a preview.
        #[arg(long)]
        full: bool,
    },

    /// Send a single prompt to the chat model (no tools, no retrieval).
    #[command(after_help = r#"Examples:
  rag-agent chat "Explain cosine similarity in one paragraph"
  rag-agent chat "hello" --no-stream
  OPENAI_BASE_URL=http://localhost:8000/v1 rag-agent chat "hi" --model Qwen/Qwen3-8B
"#)]
    Chat {
        /// The prompt to send.
        prompt: String,

        /// Chat model override.
        #[arg(short, long)]
        model: Option<String>,

        /// Print the complete response at once instead of streaming.
        #[arg(long)]
        no_stream: bool,
    },

    /// Start MCP (Model Context Protocol) server.
    #[command(subcommand)]
    Mcp(McpCommands),
}

/// MCP server subcommands.
#[derive(Subcommand, Debug)]
pub enum McpCommands {
    /// Start MCP server with stdio transport.
    ///
    /// Embeds the knowledge directory at startup, then reads JSON-RPC
    /// messages from stdin and writes responses to stdout. Exposes a
    /// `retrieve` tool to connected clients.
    #[command(after_help = r#"Examples:
  rag-agent mcp stdio --knowledge ./knowledge
  EMBEDDING_BASE_URL=... EMBEDDING_KEY=... rag-agent mcp stdio -K ./knowledge
"#)]
    Stdio {
        /// Knowledge directory to serve.
        #[arg(short = 'K', long, env = "RAG_KNOWLEDGE_DIR")]
        knowledge: PathBuf,

        /// Default number of documents returned per query.
        #[arg(short = 'k', long, default_value = "3")]
        top_k: usize,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_with_repeated_mcp() {
        let cli = Cli::try_parse_from([
            "rag-agent",
            "run",
            "do the thing",
            "--mcp",
            "uvx mcp-server-fetch",
            "--mcp",
            "npx -y @modelcontextprotocol/server-filesystem ./out",
        ])
        .unwrap_or_else(|e| panic!("parse failed: {e}"));

        match cli.command {
            Commands::Run { task, mcp, .. } => {
                assert_eq!(task, "do the thing");
                assert_eq!(mcp.len(), 2);
            }
            other => panic!("expected Run, got: {other:?}"),
        }
    }

    #[test]
    fn test_retrieve_defaults() {
        let cli = Cli::try_parse_from([
            "rag-agent",
            "retrieve",
            "vector databases",
            "--knowledge",
            "./knowledge",
        ])
        .unwrap_or_else(|e| panic!("parse failed: {e}"));

        match cli.command {
            Commands::Retrieve { top_k, full, .. } => {
                assert_eq!(top_k, 3);
                assert!(!full);
            }
            other => panic!("expected Retrieve, got: {other:?}"),
        }
    }

    #[test]
    fn test_mcp_stdio() {
        let cli = Cli::try_parse_from(["rag-agent", "mcp", "stdio", "-K", "./knowledge"])
            .unwrap_or_else(|e| panic!("parse failed: {e}"));

        assert!(matches!(
            cli.command,
            Commands::Mcp(McpCommands::Stdio { .. })
        ));
    }
}
