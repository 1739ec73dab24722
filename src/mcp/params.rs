//! MCP tool parameter types.
//!
//! Defines the input schemas for MCP tools using `schemars` for automatic
//! JSON Schema generation required by the MCP protocol.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `retrieve` MCP tool.
///
/// Ranks the knowledge-base documents against the query by embedding
/// similarity and returns the best matches.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RetrieveParams {
    /// The search query.
    pub query: String,

    /// Maximum number of documents to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}
