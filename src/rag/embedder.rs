//! Embedding generation over an OpenAI-compatible `/embeddings` endpoint.
//!
//! The embedding endpoint is configured independently of the chat endpoint
//! (see [`AgentConfig`]), since hosted embedding models frequently live on a
//! different service than the chat model.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput, EncodingFormat};
use async_trait::async_trait;
use tracing::debug;

use crate::agent::config::AgentConfig;
use crate::error::RetrievalError;

/// Trait for embedding backends.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embedding model identifier.
    fn model(&self) -> &str;

    /// Embeds a single text into a vector.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] on API or response-shape failures.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
}

/// Embedder backed by an OpenAI-compatible embeddings API.
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEmbedder {
    /// Creates an embedder from agent configuration.
    ///
    /// Uses the embedding endpoint credentials, falling back to the chat
    /// endpoint credentials when the embedding ones are unset.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.embedding_key());
        if let Some(base_url) = config.embedding_url() {
            openai_config = openai_config.with_api_base(base_url);
        }

        Self {
            client: Client::with_config(openai_config),
            model: config.embedding_model.clone(),
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.as_str())
            .input(EmbeddingInput::String(text.to_string()))
            .encoding_format(EncodingFormat::Float)
            .build()
            .map_err(|e| RetrievalError::Embedding {
                message: e.to_string(),
            })?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| RetrievalError::Embedding {
                message: e.to_string(),
            })?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .ok_or(RetrievalError::EmptyResponse)?
            .embedding;

        debug!(model = self.model, dims = embedding.len(), "embedded text");

        Ok(embedding)
    }
}

impl std::fmt::Debug for OpenAiEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbedder")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> AgentConfig {
        AgentConfig::builder()
            .api_key("test-key")
            .embedding_base_url(base_url)
            .embedding_model("BAAI/bge-m3")
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn test_embed_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(body_partial_json(json!({
                "model": "BAAI/bge-m3",
                "input": "what is deep learning?"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "model": "BAAI/bge-m3",
                "data": [{
                    "object": "embedding",
                    "index": 0,
                    "embedding": [0.1, 0.2, 0.3]
                }],
                "usage": { "prompt_tokens": 5, "total_tokens": 5 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let embedder = OpenAiEmbedder::new(&test_config(&server.uri()));
        let embedding = embedder
            .embed("what is deep learning?")
            .await
            .unwrap_or_else(|e| panic!("embed failed: {e}"));

        assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embed_empty_data() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "model": "BAAI/bge-m3",
                "data": [],
                "usage": { "prompt_tokens": 0, "total_tokens": 0 }
            })))
            .mount(&server)
            .await;

        let embedder = OpenAiEmbedder::new(&test_config(&server.uri()));
        let result = embedder.embed("query").await;
        assert!(matches!(result, Err(RetrievalError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_embed_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "message": "invalid api key",
                    "type": "invalid_request_error",
                    "param": null,
                    "code": null
                }
            })))
            .mount(&server)
            .await;

        let embedder = OpenAiEmbedder::new(&test_config(&server.uri()));
        let result = embedder.embed("query").await;
        assert!(matches!(result, Err(RetrievalError::Embedding { .. })));
    }
}
