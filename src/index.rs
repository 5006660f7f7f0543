//! Vector index trait for storing and searching embedded documents.

use async_trait::async_trait;

use crate::document::{Document, RankedMatch};
use crate::error::Result;

/// A storage backend holding named collections of `(id, text, vector)`
/// triples with nearest-neighbor similarity queries.
///
/// A collection is bound to one vector dimension and one distance metric
/// for its whole lifetime; every stored document has exactly one vector
/// of that dimension.
///
/// # Example
///
/// ```rust,ignore
/// use ragpipe::{VectorIndex, InMemoryVectorIndex};
///
/// let index = InMemoryVectorIndex::new();
/// index.create_collection("docs", 384).await?;
/// index.upsert("docs", &documents, &vectors).await?;
/// let matches = index.query("docs", &query_vector, 2).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create a named collection bound to the given vector dimension.
    ///
    /// Fails with [`RagError::CreationConflict`](crate::RagError::CreationConflict)
    /// if a collection with this name already exists: creation is only
    /// valid against a name freed by [`delete_collection`](Self::delete_collection).
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a named collection and all its data.
    ///
    /// Deleting an absent collection is not an error; the call is an
    /// idempotent no-op.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Return the number of documents stored in a collection.
    async fn count(&self, name: &str) -> Result<usize>;

    /// Upsert documents with their embedding vectors into a collection.
    ///
    /// `documents` and `vectors` are parallel sequences. They must have
    /// equal length and every vector must match the collection's
    /// dimension; otherwise the call fails with
    /// [`RagError::DimensionMismatch`](crate::RagError::DimensionMismatch)
    /// before any write; no partial mutation.
    async fn upsert(
        &self,
        collection: &str,
        documents: &[Document],
        vectors: &[Vec<f32>],
    ) -> Result<()>;

    /// Return up to `k` stored documents nearest to `vector`, ordered by
    /// ascending distance with ties broken by ascending document id.
    ///
    /// `k` is clamped to the collection size: asking for more documents
    /// than are stored returns all of them. `k == 0` fails with
    /// [`RagError::InvalidArgument`](crate::RagError::InvalidArgument).
    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<RankedMatch>>;
}
