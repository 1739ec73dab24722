//! Embedding-based document retrieval.
//!
//! Embeds documents into the in-memory [`VectorStore`] and answers queries
//! by embedding the query text and ranking documents by cosine similarity.

use tracing::{debug, info};

use super::embedder::Embedder;
use super::store::{Document, SearchHit, VectorStore};
use crate::error::RetrievalError;

/// Embeds documents and retrieves the most similar ones for a query.
pub struct Retriever {
    embedder: Box<dyn Embedder>,
    store: VectorStore,
}

impl Retriever {
    /// Creates a retriever over an empty store.
    #[must_use]
    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        Self {
            embedder,
            store: VectorStore::new(),
        }
    }

    /// Embeds a document and adds it to the store.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] on embedding failures or dimension
    /// mismatches.
    pub async fn embed_document(&mut self, document: Document) -> Result<(), RetrievalError> {
        debug!(document = document.name, "embedding document");
        let embedding = self.embedder.embed(&document.text).await?;
        self.store.add(embedding, document)
    }

    /// Embeds every document in the corpus.
    ///
    /// Returns the number of documents embedded.
    ///
    /// # Errors
    ///
    /// Returns the first [`RetrievalError`] encountered; documents embedded
    /// before the failure remain in the store.
    pub async fn embed_corpus(&mut self, documents: Vec<Document>) -> Result<usize, RetrievalError> {
        let count = documents.len();
        for document in documents {
            self.embed_document(document).await?;
        }
        info!(
            documents = count,
            model = self.embedder.model(),
            "corpus embedded"
        );
        Ok(count)
    }

    /// Retrieves the `top_k` documents most similar to the query.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] if the query cannot be embedded.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, RetrievalError> {
        let query_embedding = self.embedder.embed(query).await?;
        let hits = self.store.search(&query_embedding, top_k);
        debug!(query_len = query.len(), hits = hits.len(), "retrieved documents");
        Ok(hits)
    }

    /// Number of documents in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Removes all documents from the store.
    pub fn clear(&mut self) {
        self.store.clear();
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("model", &self.embedder.model())
            .field("documents", &self.store.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Deterministic embedder for tests: maps known keywords to fixed axes.
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        fn model(&self) -> &str {
            "keyword-test"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
            let mut v = vec![0.0_f32; 3];
            if text.contains("rust") {
                v[0] = 1.0;
            }
            if text.contains("music") {
                v[1] = 1.0;
            }
            if text.contains("cooking") {
                v[2] = 1.0;
            }
            Ok(v)
        }
    }

    /// Embedder that always fails, for error-path tests.
    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        fn model(&self) -> &str {
            "failing-test"
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
            Err(RetrievalError::Embedding {
                message: "backend unavailable".to_string(),
            })
        }
    }

    fn corpus() -> Vec<Document> {
        vec![
            Document::new("rust.md", "notes about rust programming"),
            Document::new("music.md", "notes about music theory"),
            Document::new("cooking.md", "notes about cooking pasta"),
        ]
    }

    #[tokio::test]
    async fn test_embed_and_retrieve() {
        let mut retriever = Retriever::new(Box::new(KeywordEmbedder));
        let count = retriever
            .embed_corpus(corpus())
            .await
            .unwrap_or_else(|e| panic!("embed_corpus failed: {e}"));
        assert_eq!(count, 3);
        assert_eq!(retriever.len(), 3);

        let hits = retriever
            .retrieve("tell me about rust", 2)
            .await
            .unwrap_or_else(|e| panic!("retrieve failed: {e}"));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.name, "rust.md");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_retrieve_from_empty_store() {
        let retriever = Retriever::new(Box::new(KeywordEmbedder));
        let hits = retriever
            .retrieve("anything", 3)
            .await
            .unwrap_or_else(|e| panic!("retrieve failed: {e}"));
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_embed_failure_propagates() {
        let mut retriever = Retriever::new(Box::new(FailingEmbedder));
        let result = retriever
            .embed_document(Document::new("a.md", "text"))
            .await;
        assert!(matches!(result, Err(RetrievalError::Embedding { .. })));
        assert!(retriever.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let mut retriever = Retriever::new(Box::new(KeywordEmbedder));
        retriever
            .embed_corpus(corpus())
            .await
            .unwrap_or_else(|e| panic!("embed_corpus failed: {e}"));
        retriever.clear();
        assert!(retriever.is_empty());
    }
}
