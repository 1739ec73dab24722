//! Retrieval-augmented generation pipeline.
//!
//! Embeds a small corpus of documents via an OpenAI-compatible embeddings
//! API, holds the vectors in memory, and ranks documents against a query by
//! cosine similarity. The top results are injected into the chat prompt as
//! context before the agent runs.

pub mod corpus;
pub mod embedder;
pub mod retriever;
pub mod store;

pub use embedder::{Embedder, OpenAiEmbedder};
pub use retriever::Retriever;
pub use store::{Document, SearchHit, VectorStore};
