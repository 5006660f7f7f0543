//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::{RagError, Result};

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends (Ollama, etc.) behind
/// a unified async interface. [`embed_batch`](EmbeddingProvider::embed_batch)
/// is the primary operation: the pipeline embeds an entire corpus in one
/// call. The batch contract is atomic; one vector per input, in input
/// order, at a fixed dimension, and on failure no partial vectors are
/// returned.
///
/// Embeddings must be deterministic: identical text and model version
/// yield identical vectors.
///
/// # Example
///
/// ```rust,ignore
/// use ragpipe::EmbeddingProvider;
///
/// let provider = MyEmbeddingProvider::new();
/// let vectors = provider.embed_batch(&["hello", "world"]).await?;
/// assert_eq!(vectors.len(), 2);
/// assert_eq!(vectors[0].len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// Returns one vector per input, in input order. The batch fails
    /// atomically: on error, no vectors are returned.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding vector for a single text input.
    ///
    /// The default implementation is a single-element batch.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vectors = self.embed_batch(&[text]).await?;
        vectors.into_iter().next().ok_or_else(|| RagError::Embedding {
            provider: "embed_batch".into(),
            message: "no vector returned for input".into(),
        })
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}
