//! Retrieval: embed a question, query the index, assemble a grounding
//! context.

use std::sync::Arc;

use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

/// Retrieves the documents nearest to a question and joins them into a
/// single context string.
///
/// Given the same collection state, question, and `k`, the returned
/// context is identical across repeated calls: embeddings are
/// deterministic and the index breaks distance ties by id.
pub struct RetrievalService {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    separator: String,
}

impl RetrievalService {
    /// Create a retrieval service joining document texts with `separator`.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        separator: impl Into<String>,
    ) -> Self {
        Self { embedder, index, separator: separator.into() }
    }

    /// Retrieve the `k` documents nearest to `question` from `collection`
    /// and join their texts, in rank order, into a context string.
    ///
    /// `k` is clamped to the collection size.
    ///
    /// # Errors
    ///
    /// [`RagError::EmptyCollection`](crate::RagError::EmptyCollection) if
    /// the collection holds zero documents; embedding and index failures
    /// propagate unchanged.
    pub async fn retrieve(&self, collection: &str, question: &str, k: usize) -> Result<String> {
        let count = self.index.count(collection).await?;
        if count == 0 {
            return Err(RagError::EmptyCollection { collection: collection.to_string() });
        }
        let k = k.min(count);

        let query_vector = self.embedder.embed(question).await?;
        let matches = self.index.query(collection, &query_vector, k).await?;

        let context = matches
            .iter()
            .map(|m| m.document.text.as_str())
            .collect::<Vec<_>>()
            .join(&self.separator);

        debug!(collection, k, matches = matches.len(), "assembled grounding context");
        Ok(context)
    }
}
