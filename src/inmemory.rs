//! In-memory vector index using cosine distance.
//!
//! This module provides [`InMemoryVectorIndex`], a zero-dependency index
//! backed by a `HashMap` protected by a `tokio::sync::RwLock`. It is
//! suitable for development, testing, and small corpora.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Document, RankedMatch};
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

/// A document's stored form: its text plus its embedding vector.
#[derive(Debug, Clone)]
struct StoredDocument {
    text: String,
    embedding: Vec<f32>,
}

/// A named collection bound to a fixed vector dimension.
///
/// Documents live in a `BTreeMap` keyed by id; iteration order, and
/// therefore distance-tie ordering, is deterministic.
#[derive(Debug)]
struct Collection {
    dimensions: usize,
    documents: BTreeMap<String, StoredDocument>,
}

/// An in-memory [`VectorIndex`] using cosine distance for queries.
///
/// Collections are stored as nested maps: collection name → document id
/// → stored document. All operations are async-safe via
/// `tokio::sync::RwLock`.
///
/// # Example
///
/// ```rust,ignore
/// use ragpipe::{InMemoryVectorIndex, VectorIndex};
///
/// let index = InMemoryVectorIndex::new();
/// index.create_collection("docs", 384).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorIndex {
    /// Create a new empty in-memory vector index.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compute cosine distance (`1 − cosine similarity`) between two vectors.
///
/// Both vectors are L2-normalized before computing the dot product.
/// A zero-magnitude vector has no direction, so its distance to anything
/// is 1.0.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

fn missing_collection(name: &str) -> RagError {
    RagError::StoreUnavailable {
        backend: "inmemory".to_string(),
        message: format!("collection '{name}' does not exist"),
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(name) {
            return Err(RagError::CreationConflict { collection: name.to_string() });
        }
        collections
            .insert(name.to_string(), Collection { dimensions, documents: BTreeMap::new() });
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn count(&self, name: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        let collection = collections.get(name).ok_or_else(|| missing_collection(name))?;
        Ok(collection.documents.len())
    }

    async fn upsert(
        &self,
        collection: &str,
        documents: &[Document],
        vectors: &[Vec<f32>],
    ) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| missing_collection(collection))?;

        // Validate the whole batch before touching the map.
        if documents.len() != vectors.len() {
            return Err(RagError::DimensionMismatch {
                expected: documents.len(),
                actual: vectors.len(),
            });
        }
        for vector in vectors {
            if vector.len() != store.dimensions {
                return Err(RagError::DimensionMismatch {
                    expected: store.dimensions,
                    actual: vector.len(),
                });
            }
        }

        for (document, vector) in documents.iter().zip(vectors) {
            store.documents.insert(
                document.id.clone(),
                StoredDocument { text: document.text.clone(), embedding: vector.clone() },
            );
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<RankedMatch>> {
        if k == 0 {
            return Err(RagError::InvalidArgument("k must be greater than zero".to_string()));
        }

        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| missing_collection(collection))?;

        if vector.len() != store.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: store.dimensions,
                actual: vector.len(),
            });
        }

        let mut matches: Vec<RankedMatch> = store
            .documents
            .iter()
            .map(|(id, stored)| RankedMatch {
                document: Document::new(id.clone(), stored.text.clone()),
                distance: cosine_distance(&stored.embedding, vector),
            })
            .collect();

        matches.sort_by(|a, b| a.ranking_cmp(b));
        matches.truncate(k);
        Ok(matches)
    }
}
