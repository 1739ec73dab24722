//! MCP server exposing the retrieval pipeline.
//!
//! Serves the knowledge base over the Model Context Protocol so external
//! agents can call `retrieve` as a tool. The corpus is embedded once at
//! startup; queries only embed the query text.

use std::sync::Arc;

use rmcp::ServiceExt;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::transport::io::stdio;
use rmcp::{ErrorData as ServerError, ServerHandler, tool, tool_handler, tool_router};

use super::params::RetrieveParams;
use crate::rag::Retriever;

/// Upper bound on `top_k` accepted from clients.
const MAX_TOP_K: usize = 20;

/// MCP server answering retrieval queries over the knowledge base.
#[derive(Clone)]
pub struct RetrievalServer {
    tool_router: ToolRouter<Self>,
    retriever: Arc<Retriever>,
    default_top_k: usize,
}

#[tool_router]
impl RetrievalServer {
    /// Rank knowledge-base documents against a query.
    #[tool(
        name = "retrieve",
        description = "Search the knowledge base for documents relevant to a query. Ranks documents by embedding similarity and returns the best matches as JSON, each with its name, full text, and similarity score."
    )]
    async fn retrieve(
        &self,
        Parameters(params): Parameters<RetrieveParams>,
    ) -> Result<CallToolResult, ServerError> {
        let top_k = params
            .top_k
            .unwrap_or(self.default_top_k)
            .clamp(1, MAX_TOP_K);

        let hits = self
            .retriever
            .retrieve(&params.query, top_k)
            .await
            .map_err(|e| ServerError::internal_error(format!("Retrieval failed: {e}"), None))?;

        let json = serde_json::to_string_pretty(&hits)
            .map_err(|e| ServerError::internal_error(format!("Serialization error: {e}"), None))?;

        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

impl RetrievalServer {
    /// Creates a server over an already-embedded retriever.
    #[must_use]
    pub fn new(retriever: Arc<Retriever>, default_top_k: usize) -> Self {
        Self {
            tool_router: Self::tool_router(),
            retriever,
            default_top_k,
        }
    }
}

#[tool_handler]
impl ServerHandler for RetrievalServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "rag-agent".to_string(),
                title: Some("rag-agent retrieval server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: Some("https://github.com/zircote/rag-agent".to_string()),
            },
            instructions: Some(
                "Retrieval over a local knowledge base. Use the `retrieve` tool to find \
                 documents relevant to a query; results are ranked by embedding similarity."
                    .to_string(),
            ),
        }
    }
}

/// Starts the MCP server with stdio transport.
///
/// The server reads JSON-RPC messages from stdin and writes responses to
/// stdout; logging must go to stderr.
///
/// # Errors
///
/// Returns an error if the server fails to start or encounters a runtime error.
pub async fn serve_stdio(server: RetrievalServer) -> anyhow::Result<()> {
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}
