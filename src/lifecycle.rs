//! Collection lifecycle: resetting a named collection to a known-empty
//! state before ingestion.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::index::VectorIndex;

/// Ensures a named collection exists in a known-empty state.
///
/// A pipeline run owns its collection exclusively: [`reset`](Self::reset)
/// deletes any previous contents and recreates the collection bound to
/// the run's embedding dimension. Two concurrent runs sharing a
/// collection name can race on reset-then-create; callers that need
/// concurrent runs must serialize them per collection name.
pub struct CollectionLifecycle {
    index: Arc<dyn VectorIndex>,
    dimensions: usize,
}

impl CollectionLifecycle {
    /// Create a lifecycle manager for collections of the given dimension.
    pub fn new(index: Arc<dyn VectorIndex>, dimensions: usize) -> Self {
        Self { index, dimensions }
    }

    /// Delete the named collection if present (absence is a no-op), then
    /// create it empty.
    ///
    /// After a successful `reset`, the collection exists and holds zero
    /// documents.
    ///
    /// # Errors
    ///
    /// [`RagError::StoreUnavailable`](crate::RagError::StoreUnavailable)
    /// if the backing index is unreachable, or
    /// [`RagError::CreationConflict`](crate::RagError::CreationConflict)
    /// if creation races another writer using the same name.
    pub async fn reset(&self, name: &str) -> Result<()> {
        self.index.delete_collection(name).await?;
        self.index.create_collection(name, self.dimensions).await?;
        debug!(collection = name, dimensions = self.dimensions, "collection reset");
        Ok(())
    }
}
