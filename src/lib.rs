//! # ragpipe
//!
//! A retrieval-augmented generation (RAG) pipeline: rebuild a semantic
//! index over a document corpus, retrieve the k nearest documents to a
//! question by embedding similarity, assemble them into a grounding
//! context, and invoke a generative model with that context plus the
//! question.
//!
//! ## Overview
//!
//! The pipeline composes three external capabilities behind narrow
//! traits:
//!
//! - [`EmbeddingProvider`] — text → fixed-dimension vectors
//! - [`VectorIndex`] — named collections of `(id, text, vector)` triples
//!   with nearest-neighbor queries
//! - [`LanguageModel`] — single-shot prompt → response
//!
//! A [`Pipeline`] run is strictly sequential: reset the collection,
//! ingest the corpus (one batch embedding call), retrieve the question's
//! grounding context, generate the answer. The first failing stage
//! aborts the run with a typed [`RagError::Stage`] naming the stage;
//! no stage is retried and no later stage executes on corrupted input.
//!
//! Each run owns its collection exclusively; concurrent runs sharing a
//! collection name race on reset-then-create and are unsupported.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragpipe::{Document, InMemoryVectorIndex, MockEmbedder, MockLanguageModel,
//!               Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::builder()
//!     .config(PipelineConfig::default())
//!     .embedding_provider(Arc::new(MockEmbedder::new(64)))
//!     .vector_index(Arc::new(InMemoryVectorIndex::new()))
//!     .language_model(Arc::new(MockLanguageModel::new("…")))
//!     .build()?;
//!
//! let corpus = Document::from_texts(["Minou est un chat"]);
//! let answer = pipeline.run(&corpus, "Que fait le chat ?").await?;
//! ```
//!
//! ## Backends
//!
//! [`InMemoryVectorIndex`] and the mocks run with zero external services.
//! Real adapters are feature-gated:
//!
//! - `ollama` — [`ollama::OllamaEmbedder`] and [`ollama::OllamaGenerator`]
//!   over the local Ollama HTTP API
//! - `qdrant` — [`qdrant::QdrantVectorIndex`] over gRPC

pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod inmemory;
pub mod lifecycle;
pub mod mock;
#[cfg(feature = "ollama")]
pub mod ollama;
pub mod pipeline;
#[cfg(feature = "qdrant")]
pub mod qdrant;
pub mod retrieval;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use document::{Document, RankedMatch};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generation::{GenerationService, LanguageModel, build_prompt};
pub use index::VectorIndex;
pub use inmemory::InMemoryVectorIndex;
pub use lifecycle::CollectionLifecycle;
pub use mock::{MockEmbedder, MockLanguageModel};
#[cfg(feature = "ollama")]
pub use ollama::{OllamaEmbedder, OllamaGenerator};
pub use pipeline::{Pipeline, PipelineBuilder, Stage};
#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorIndex;
pub use retrieval::RetrievalService;
