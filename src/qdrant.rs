//! Qdrant vector index backend.
//!
//! Provides [`QdrantVectorIndex`] which implements [`VectorIndex`] using
//! the [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC.
//! Collections use cosine distance; document text is stored as point
//! payload.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragpipe::qdrant::QdrantVectorIndex;
//!
//! let index = QdrantVectorIndex::new("http://localhost:6334")?;
//! index.create_collection("docs", 768).await?;
//! index.upsert("docs", &documents, &vectors).await?;
//! let matches = index.query("docs", &query_vector, 2).await?;
//! ```

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::vectors_config::Config as VectorsConfigKind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::debug;

use crate::document::{Document, RankedMatch};
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

/// A [`VectorIndex`] backed by [Qdrant](https://qdrant.tech/).
///
/// Qdrant reports cosine similarity scores; this adapter converts them
/// to cosine distance (`1 − score`), lower is more similar. Numeric-string
/// document ids are stored as numeric point ids since Qdrant rejects
/// non-UUID string ids.
pub struct QdrantVectorIndex {
    client: Qdrant,
}

impl QdrantVectorIndex {
    /// Create a new Qdrant index connecting to the given URL.
    pub fn new(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        Ok(Self { client })
    }

    /// Create a new Qdrant index with the default URL (`http://localhost:6334`).
    pub fn default_url() -> Result<Self> {
        Self::new("http://localhost:6334")
    }

    /// Create a new Qdrant index from an existing client.
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        RagError::StoreUnavailable { backend: "qdrant".to_string(), message: e.to_string() }
    }

    /// Extract a string from a Qdrant payload value.
    fn extract_string(value: &QdrantValue) -> Option<String> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        Ok(collections.collections.iter().any(|c| c.name == name))
    }

    /// Look up the vector dimension a collection was created with.
    ///
    /// Returns `None` when the collection uses a named-vectors map, which
    /// this adapter never creates.
    async fn collection_dimensions(&self, name: &str) -> Result<Option<usize>> {
        let info = self.client.collection_info(name).await.map_err(Self::map_err)?;
        Ok(info
            .result
            .and_then(|i| i.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config)
            .and_then(|config| match config {
                VectorsConfigKind::Params(params) => Some(params.size as usize),
                VectorsConfigKind::ParamsMap(_) => None,
            }))
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        if self.collection_exists(name).await? {
            return Err(RagError::CreationConflict { collection: name.to_string() });
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = name, dimensions, "created qdrant collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        if !self.collection_exists(name).await? {
            debug!(collection = name, "qdrant collection absent, nothing to delete");
            return Ok(());
        }

        self.client.delete_collection(name).await.map_err(Self::map_err)?;
        debug!(collection = name, "deleted qdrant collection");
        Ok(())
    }

    async fn count(&self, name: &str) -> Result<usize> {
        let info = self.client.collection_info(name).await.map_err(Self::map_err)?;
        Ok(info.result.and_then(|i| i.points_count).unwrap_or(0) as usize)
    }

    async fn upsert(
        &self,
        collection: &str,
        documents: &[Document],
        vectors: &[Vec<f32>],
    ) -> Result<()> {
        if documents.len() != vectors.len() {
            return Err(RagError::DimensionMismatch {
                expected: documents.len(),
                actual: vectors.len(),
            });
        }
        if let Some(dimensions) = self.collection_dimensions(collection).await? {
            for vector in vectors {
                if vector.len() != dimensions {
                    return Err(RagError::DimensionMismatch {
                        expected: dimensions,
                        actual: vector.len(),
                    });
                }
            }
        }
        if documents.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = documents
            .iter()
            .zip(vectors)
            .map(|(document, vector)| {
                let mut payload_map = serde_json::Map::new();
                payload_map
                    .insert("text".to_string(), serde_json::Value::String(document.text.clone()));
                let payload =
                    Payload::try_from(serde_json::Value::Object(payload_map)).unwrap_or_default();

                match document.id.parse::<u64>() {
                    Ok(n) => PointStruct::new(n, vector.clone(), payload),
                    Err(_) => PointStruct::new(document.id.clone(), vector.clone(), payload),
                }
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection, count = documents.len(), "upserted documents to qdrant");
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

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, vector.to_vec(), k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        let mut matches: Vec<RankedMatch> = response
            .result
            .into_iter()
            .map(|scored| {
                let id = scored
                    .id
                    .as_ref()
                    .and_then(|pid| match &pid.point_id_options {
                        Some(PointIdOptions::Uuid(s)) => Some(s.clone()),
                        Some(PointIdOptions::Num(n)) => Some(n.to_string()),
                        None => None,
                    })
                    .unwrap_or_default();

                let text =
                    scored.payload.get("text").and_then(Self::extract_string).unwrap_or_default();

                RankedMatch { document: Document::new(id, text), distance: 1.0 - scored.score }
            })
            .collect();

        matches.sort_by(|a, b| a.ranking_cmp(b));
        Ok(matches)
    }
}
