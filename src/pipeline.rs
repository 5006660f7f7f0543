//! Pipeline orchestrator.
//!
//! The [`Pipeline`] sequences one run of the full grounded-answer
//! workflow: reset the collection, ingest the corpus, retrieve a context
//! for the question, generate the answer. Stages execute strictly in
//! order; the first failing stage aborts the run with a typed error
//! naming the stage.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragpipe::{Pipeline, PipelineConfig, InMemoryVectorIndex, Document};
//!
//! let pipeline = Pipeline::builder()
//!     .config(PipelineConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_index(Arc::new(InMemoryVectorIndex::new()))
//!     .language_model(Arc::new(my_model))
//!     .build()?;
//!
//! let corpus = Document::from_texts(["Minou est un chat"]);
//! let answer = pipeline.run(&corpus, "Que fait le chat ?").await?;
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::document::Document;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::{GenerationService, LanguageModel};
use crate::index::VectorIndex;
use crate::lifecycle::CollectionLifecycle;
use crate::retrieval::RetrievalService;

/// A stage of the pipeline's linear run sequence.
///
/// Used to tag a failure with the stage that produced it; the run aborts
/// at the first failing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Resetting the collection to a known-empty state.
    Reset,
    /// Embedding the corpus and upserting it into the fresh collection.
    Ingest,
    /// Embedding the question and assembling the grounding context.
    Retrieve,
    /// Building the prompt and invoking the generative model.
    Generate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Reset => "reset",
            Stage::Ingest => "ingest",
            Stage::Retrieve => "retrieve",
            Stage::Generate => "generate",
        };
        f.write_str(name)
    }
}

/// The pipeline orchestrator.
///
/// Composes an [`EmbeddingProvider`], a [`VectorIndex`], and a
/// [`LanguageModel`] into one strictly sequential run. Each run owns its
/// collection exclusively: concurrent runs sharing a collection name race
/// on reset-then-create and are unsupported. Construct one via
/// [`Pipeline::builder()`].
pub struct Pipeline {
    config: PipelineConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    lifecycle: CollectionLifecycle,
    retrieval: RetrievalService,
    generation: GenerationService,
}

impl Pipeline {
    /// Create a new [`PipelineBuilder`].
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Execute one run: reset → ingest → retrieve → generate.
    ///
    /// The corpus is embedded in a single batch call and upserted into
    /// the freshly reset collection; the question's nearest `top_k`
    /// documents become the grounding context for the generated answer.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Stage`] wrapping the originating typed error.
    /// No stage is retried and no later stage executes after a failure.
    pub async fn run(&self, corpus: &[Document], question: &str) -> Result<String> {
        let collection = self.config.collection.as_str();
        info!(collection, documents = corpus.len(), "starting pipeline run");

        self.lifecycle
            .reset(collection)
            .await
            .map_err(|e| stage_failure(Stage::Reset, e))?;

        self.ingest(collection, corpus)
            .await
            .map_err(|e| stage_failure(Stage::Ingest, e))?;

        let context = self
            .retrieval
            .retrieve(collection, question, self.config.top_k)
            .await
            .map_err(|e| stage_failure(Stage::Retrieve, e))?;

        let answer = self
            .generation
            .generate(&context, question)
            .await
            .map_err(|e| stage_failure(Stage::Generate, e))?;

        info!(collection, answer_len = answer.len(), "pipeline run complete");
        Ok(answer)
    }

    /// Embed the whole corpus in one batch call and upsert it.
    async fn ingest(&self, collection: &str, corpus: &[Document]) -> Result<()> {
        if corpus.is_empty() {
            info!(collection, documents = 0, "ingested corpus (empty)");
            return Ok(());
        }

        let texts: Vec<&str> = corpus.iter().map(|d| d.text.as_str()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;
        self.index.upsert(collection, corpus, &vectors).await?;

        info!(collection, documents = corpus.len(), "ingested corpus");
        Ok(())
    }
}

/// Wrap a stage's error, logging the aborted run.
fn stage_failure(stage: Stage, source: RagError) -> RagError {
    error!(%stage, error = %source, "pipeline stage failed");
    RagError::Stage { stage, source: Box::new(source) }
}

/// Builder for constructing a [`Pipeline`].
///
/// All fields are required. Call [`build()`](PipelineBuilder::build) to
/// validate and produce the pipeline.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = Pipeline::builder()
///     .config(PipelineConfig::default())
///     .embedding_provider(Arc::new(embedder))
///     .vector_index(Arc::new(index))
///     .language_model(Arc::new(model))
///     .build()?;
/// ```
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
    model: Option<Arc<dyn LanguageModel>>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index backend.
    pub fn vector_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the generative model capability.
    pub fn language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Build the [`Pipeline`], validating that all required fields are
    /// set.
    ///
    /// The collection lifecycle is bound to the embedding provider's
    /// dimensionality; every collection the pipeline creates matches the
    /// vectors it stores.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required field is missing.
    pub fn build(self) -> Result<Pipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let index =
            self.index.ok_or_else(|| RagError::Config("vector_index is required".to_string()))?;
        let model = self
            .model
            .ok_or_else(|| RagError::Config("language_model is required".to_string()))?;

        let lifecycle = CollectionLifecycle::new(index.clone(), embedder.dimensions());
        let retrieval =
            RetrievalService::new(embedder.clone(), index.clone(), config.separator.clone());
        let generation = GenerationService::new(model, config.model.clone());

        Ok(Pipeline { config, embedder, index, lifecycle, retrieval, generation })
    }
}
