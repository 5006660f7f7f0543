//! Deterministic test doubles for the embedding and generation
//! capabilities.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::generation::LanguageModel;

/// A deterministic hash-based [`EmbeddingProvider`].
///
/// Hashes the text bytes and fills a vector whose direction depends on
/// the content, then L2-normalizes it so cosine similarity is just the
/// dot product. Identical text always yields a bit-identical vector,
/// which makes retrieval tests reproducible.
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    /// Create a mock embedder producing vectors of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut embedding = vec![0.0f32; self.dimensions];
        for (i, v) in embedding.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|x| *x /= norm);
        }
        embedding
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// A [`LanguageModel`] that returns a canned reply and records the last
/// prompt it was given.
pub struct MockLanguageModel {
    reply: String,
    last_prompt: Mutex<Option<String>>,
}

impl MockLanguageModel {
    /// Create a mock model that answers every prompt with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), last_prompt: Mutex::new(None) }
    }

    /// Return the most recent prompt passed to
    /// [`generate`](LanguageModel::generate), if any.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().map(|guard| guard.clone()).unwrap_or(None)
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn generate(&self, _model: &str, prompt: &str) -> Result<String> {
        if let Ok(mut guard) = self.last_prompt.lock() {
            *guard = Some(prompt.to_string());
        }
        Ok(self.reply.clone())
    }
}
