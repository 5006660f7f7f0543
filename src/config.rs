//! Configuration for the pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Name of the collection the run owns.
    pub collection: String,
    /// Maximum number of nearest documents to retrieve for the question.
    pub top_k: usize,
    /// Name of the generative model to invoke.
    pub model: String,
    /// Separator used to join retrieved document texts into the context.
    pub separator: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            collection: "docs".to_string(),
            top_k: 2,
            model: "llama3".to_string(),
            separator: ", ".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a new builder for constructing a [`PipelineConfig`].
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = name.into();
        self
    }

    /// Set the number of nearest documents to retrieve.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the generative model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the separator used when joining retrieved texts.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.config.separator = separator.into();
        self
    }

    /// Build the [`PipelineConfig`], validating that parameters are
    /// consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `collection` is empty
    /// - `model` is empty
    /// - `top_k == 0`
    pub fn build(self) -> Result<PipelineConfig> {
        if self.config.collection.is_empty() {
            return Err(RagError::Config("collection name must not be empty".to_string()));
        }
        if self.config.model.is_empty() {
            return Err(RagError::Config("model name must not be empty".to_string()));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
