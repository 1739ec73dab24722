//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.
//!
//! The chat and embedding endpoints are configured independently so the two
//! can point at different OpenAI-compatible services (a common setup when
//! embeddings come from a cheaper hosted model). The embedding credentials
//! fall back to the chat credentials when unset.

use std::time::Duration;

use crate::error::AgentError;

/// Default chat model.
const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default embedding model.
const DEFAULT_EMBEDDING_MODEL: &str = "BAAI/bge-m3";
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Default maximum tool-calling loop iterations.
const DEFAULT_MAX_TOOL_ITERATIONS: usize = 10;
/// Default number of documents injected as context.
const DEFAULT_TOP_K: usize = 3;

/// Configuration for the agent system.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the chat endpoint.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Chat model identifier.
    pub model: String,
    /// API key for the embedding endpoint. Falls back to [`Self::api_key`].
    pub embedding_api_key: Option<String>,
    /// Base URL for the embedding endpoint. Falls back to [`Self::base_url`].
    pub embedding_base_url: Option<String>,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Maximum tokens for chat responses (provider default when `None`).
    pub max_tokens: Option<u32>,
    /// Request timeout for MCP tool calls.
    pub timeout: Duration,
    /// Maximum tool-calling loop iterations before aborting.
    pub max_tool_iterations: usize,
    /// Number of documents to retrieve as context.
    pub top_k: usize,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }

    /// Returns the API key to use for embedding requests.
    #[must_use]
    pub fn embedding_key(&self) -> &str {
        self.embedding_api_key.as_deref().unwrap_or(&self.api_key)
    }

    /// Returns the base URL to use for embedding requests, if any.
    #[must_use]
    pub fn embedding_url(&self) -> Option<&str> {
        self.embedding_base_url
            .as_deref()
            .or(self.base_url.as_deref())
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    embedding_api_key: Option<String>,
    embedding_base_url: Option<String>,
    embedding_model: Option<String>,
    max_tokens: Option<u32>,
    timeout: Option<Duration>,
    max_tool_iterations: Option<usize>,
    top_k: Option<usize>,
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL").ok();
        }
        if self.model.is_none() {
            self.model = std::env::var("RAG_MODEL").ok();
        }
        if self.embedding_api_key.is_none() {
            self.embedding_api_key = std::env::var("EMBEDDING_KEY").ok();
        }
        if self.embedding_base_url.is_none() {
            self.embedding_base_url = std::env::var("EMBEDDING_BASE_URL").ok();
        }
        if self.embedding_model.is_none() {
            self.embedding_model = std::env::var("EMBEDDING_MODEL").ok();
        }
        if self.top_k.is_none() {
            self.top_k = std::env::var("RAG_TOP_K").ok().and_then(|v| v.parse().ok());
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the chat model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the embedding API key.
    #[must_use]
    pub fn embedding_api_key(mut self, key: impl Into<String>) -> Self {
        self.embedding_api_key = Some(key.into());
        self
    }

    /// Sets the embedding base URL.
    #[must_use]
    pub fn embedding_base_url(mut self, url: impl Into<String>) -> Self {
        self.embedding_base_url = Some(url.into());
        self
    }

    /// Sets the embedding model.
    #[must_use]
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    /// Sets the maximum tokens for chat responses.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the maximum tool-calling loop iterations.
    #[must_use]
    pub const fn max_tool_iterations(mut self, n: usize) -> Self {
        self.max_tool_iterations = Some(n);
        self
    }

    /// Sets the retrieval top-k (documents injected as context).
    #[must_use]
    pub const fn top_k(mut self, n: usize) -> Self {
        self.top_k = Some(n);
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let api_key = self.api_key.ok_or(AgentError::ApiKeyMissing)?;

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: self.base_url,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            embedding_api_key: self.embedding_api_key,
            embedding_base_url: self.embedding_base_url,
            embedding_model: self
                .embedding_model
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            max_tokens: self.max_tokens,
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_tool_iterations: self
                .max_tool_iterations
                .unwrap_or(DEFAULT_MAX_TOOL_ITERATIONS),
            top_k: self.top_k.unwrap_or(DEFAULT_TOP_K),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = AgentConfig::builder()
            .api_key("test-key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.embedding_model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(config.max_tool_iterations, DEFAULT_MAX_TOOL_ITERATIONS);
        assert_eq!(config.top_k, DEFAULT_TOP_K);
    }

    #[test]
    fn test_builder_missing_api_key() {
        let result = AgentConfig::builder().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AgentConfig::builder()
            .api_key("key")
            .model("Qwen/Qwen3-8B")
            .embedding_model("text-embedding-3-small")
            .max_tool_iterations(5)
            .top_k(5)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.model, "Qwen/Qwen3-8B");
        assert_eq!(config.embedding_model, "text-embedding-3-small");
        assert_eq!(config.max_tool_iterations, 5);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_embedding_credentials_fall_back_to_chat() {
        let config = AgentConfig::builder()
            .api_key("chat-key")
            .base_url("https://chat.example.com/v1")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.embedding_key(), "chat-key");
        assert_eq!(config.embedding_url(), Some("https://chat.example.com/v1"));
    }

    #[test]
    fn test_embedding_credentials_override() {
        let config = AgentConfig::builder()
            .api_key("chat-key")
            .embedding_api_key("embed-key")
            .embedding_base_url("https://embed.example.com/v1")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.embedding_key(), "embed-key");
        assert_eq!(config.embedding_url(), Some("https://embed.example.com/v1"));
    }
}
