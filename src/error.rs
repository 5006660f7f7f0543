//! Error types for the `ragpipe` crate.

use thiserror::Error;

use crate::pipeline::Stage;

/// Errors that can occur in pipeline operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation. The whole batch
    /// fails atomically; no partial vectors are returned.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The backing vector index is unreachable or rejected the request.
    #[error("Vector index unavailable ({backend}): {message}")]
    StoreUnavailable {
        /// The vector index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// Collection creation raced another writer using the same name.
    #[error("Collection '{collection}' already exists")]
    CreationConflict {
        /// The contested collection name.
        collection: String,
    },

    /// A vector dimension or parallel-sequence length did not match the
    /// collection's contract. Detected before any write.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension or length required by the collection.
        expected: usize,
        /// The dimension or length that was supplied.
        actual: usize,
    },

    /// A caller-supplied argument was out of range (e.g. `k == 0`).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Retrieval was attempted against a collection with zero documents.
    #[error("Collection '{collection}' contains no documents")]
    EmptyCollection {
        /// The empty collection's name.
        collection: String,
    },

    /// The generative model failed: unavailable, timed out, or returned
    /// a malformed response.
    #[error("Generation error ({model}): {message}")]
    Generation {
        /// The model that produced the error.
        model: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A pipeline stage failed; the run was aborted at that stage.
    #[error("{stage} stage failed: {source}")]
    Stage {
        /// The stage that was executing when the failure occurred.
        stage: Stage,
        /// The originating typed error.
        #[source]
        source: Box<RagError>,
    },
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;
