//! In-memory vector store with cosine-similarity search.
//!
//! Holds the full corpus in memory; the store is small by design (a handful
//! of documents), so search is an exact scan rather than an index.

use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// A document held in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// Document name (typically the source file name).
    pub name: String,
    /// Full document text.
    pub text: String,
}

impl Document {
    /// Creates a document from a name and text.
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// A search result: a document and its similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// The matched document.
    pub document: Document,
    /// Cosine similarity to the query (-1.0 to 1.0).
    pub score: f32,
}

struct Entry {
    embedding: Vec<f32>,
    document: Document,
}

/// In-memory vector store.
#[derive(Default)]
pub struct VectorStore {
    entries: Vec<Entry>,
}

impl VectorStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document with its embedding.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::DimensionMismatch`] if the embedding's
    /// dimension differs from the first stored vector.
    pub fn add(&mut self, embedding: Vec<f32>, document: Document) -> Result<(), RetrievalError> {
        if let Some(first) = self.entries.first()
            && first.embedding.len() != embedding.len()
        {
            return Err(RetrievalError::DimensionMismatch {
                expected: first.embedding.len(),
                got: embedding.len(),
            });
        }
        self.entries.push(Entry {
            embedding,
            document,
        });
        Ok(())
    }

    /// Returns the `top_k` documents most similar to the query embedding,
    /// highest score first.
    #[must_use]
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<SearchHit> {
        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .map(|entry| SearchHit {
                document: entry.document.clone(),
                score: cosine_similarity(query, &entry.embedding),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);
        hits
    }

    /// Returns all stored documents, in insertion order.
    #[must_use]
    pub fn documents(&self) -> Vec<&Document> {
        self.entries.iter().map(|e| &e.document).collect()
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes all stored documents.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Cosine similarity of two vectors.
///
/// Returns 0.0 when either vector has zero norm. Callers guarantee equal
/// dimensions; the store enforces this at insert.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
