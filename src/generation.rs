//! Generation: build a grounded prompt and invoke the generative model.

use std::sync::Arc;

use async_trait::async_trait;

use tracing::debug;

use crate::error::Result;

/// A generative language model capability.
///
/// Single-shot request/response; no streaming. Implementations wrap a
/// concrete backend (Ollama, etc.) and map unavailability, timeouts, and
/// malformed responses to
/// [`RagError::Generation`](crate::RagError::Generation).
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a free-text response to `prompt` using the named model.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}

/// Build the generation prompt from a grounding context and a question.
///
/// Pure and total: a fixed template, never fails, never mutated after
/// construction.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!("Using this data: {context}. Answer this question: {question}")
}

/// Invokes the generative model with a grounded prompt.
///
/// The model's response text is passed through unmodified: no
/// post-processing and no validation of factual correctness. This layer
/// only guarantees that the retrieved context is included verbatim in the
/// prompt.
pub struct GenerationService {
    model: Arc<dyn LanguageModel>,
    model_name: String,
}

impl GenerationService {
    /// Create a generation service bound to one model name for its
    /// lifetime.
    pub fn new(model: Arc<dyn LanguageModel>, model_name: impl Into<String>) -> Self {
        Self { model, model_name: model_name.into() }
    }

    /// Build the prompt from `context` and `question`, then invoke the
    /// model.
    ///
    /// # Errors
    ///
    /// [`RagError::Generation`](crate::RagError::Generation) on
    /// model-unavailable, timeout, or malformed-response conditions.
    pub async fn generate(&self, context: &str, question: &str) -> Result<String> {
        let prompt = build_prompt(context, question);
        debug!(model = %self.model_name, prompt_len = prompt.len(), "invoking language model");
        self.model.generate(&self.model_name, &prompt).await
    }
}
