//! Error types for rag-agent.
//!
//! Each subsystem has its own `thiserror` enum; the crate-level [`Error`]
//! unifies them for the CLI boundary.

use thiserror::Error;

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error wrapping all subsystem errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Agent / LLM provider failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// MCP client or transport failure.
    #[error(transparent)]
    Mcp(#[from] McpError),

    /// Retrieval pipeline failure.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// Filesystem I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CLI-level failure (bad arguments, missing inputs).
    #[error("{0}")]
    Command(String),
}

/// Errors from the agent system and LLM providers.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was configured.
    #[error("no API key configured (set OPENAI_API_KEY)")]
    ApiKeyMissing,

    /// Unknown provider name requested.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// The requested provider name.
        name: String,
    },

    /// API request failed.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Error description from the provider or transport.
        message: String,
        /// HTTP status code, if one was received.
        status: Option<u16>,
    },

    /// Streaming response failed mid-stream.
    #[error("stream error: {message}")]
    Stream {
        /// Error description.
        message: String,
    },

    /// The model kept requesting tools beyond the iteration limit.
    #[error("tool loop exceeded {max_iterations} iterations")]
    ToolLoopExceeded {
        /// The configured iteration limit.
        max_iterations: usize,
    },

    /// A tool call failed to execute.
    #[error("tool '{name}' failed: {message}")]
    ToolExecution {
        /// Name of the tool that failed.
        name: String,
        /// Failure description.
        message: String,
    },
}

/// Errors from the MCP client and stdio transport.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to spawn the server process.
    #[error("failed to spawn MCP server '{command}': {message}")]
    Spawn {
        /// The command that was launched.
        command: String,
        /// OS-level failure description.
        message: String,
    },

    /// The server process closed its stdout or exited.
    #[error("MCP server closed the connection")]
    ServerClosed,

    /// Reading or writing the transport failed.
    #[error("MCP transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// No response arrived within the request timeout.
    #[error("MCP request timed out after {secs}s")]
    Timeout {
        /// The configured timeout in seconds.
        secs: u64,
    },

    /// The server returned a JSON-RPC error.
    #[error("MCP server error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },

    /// A response violated the expected protocol shape.
    #[error("MCP protocol error: {0}")]
    Protocol(String),
}

/// Errors from the embedding and retrieval pipeline.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Embedding API call failed.
    #[error("embedding request failed: {message}")]
    Embedding {
        /// Error description from the provider or transport.
        message: String,
    },

    /// The embedding endpoint returned no vector.
    #[error("embedding response contained no data")]
    EmptyResponse,

    /// A vector's dimension does not match the store.
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimension of the first stored vector.
        expected: usize,
        /// Dimension of the rejected vector.
        got: usize,
    },

    /// Reading the knowledge directory failed.
    #[error("failed to read knowledge directory '{path}': {message}")]
    Corpus {
        /// The directory that was being read.
        path: String,
        /// Failure description.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgentError::ToolLoopExceeded { max_iterations: 10 };
        assert_eq!(err.to_string(), "tool loop exceeded 10 iterations");

        let err = McpError::Rpc {
            code: -32601,
            message: "method not found".to_string(),
        };
        assert!(err.to_string().contains("-32601"));

        let err = RetrievalError::DimensionMismatch {
            expected: 1024,
            got: 768,
        };
        assert!(err.to_string().contains("1024"));
        assert!(err.to_string().contains("768"));
    }

    #[test]
    fn test_error_conversion() {
        let agent_err: Error = AgentError::ApiKeyMissing.into();
        assert!(matches!(agent_err, Error::Agent(_)));

        let mcp_err: Error = McpError::ServerClosed.into();
        assert!(matches!(mcp_err, Error::Mcp(_)));
    }
}
