//! Collection-scoped adapter over a [`VectorStore`].
//!
//! [`VectorIndex`] binds one store to one collection and adds what the
//! pipeline needs on top of the raw backend: idempotent collection creation,
//! shape checks before upsert, point-id assignment and a stats call that
//! never fails.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use super::filter::MetadataFilter;
use super::vectorstore::{DistanceMetric, VectorStore};
use crate::types::{AppError, CollectionInfo, Metadata, Result, SearchResult, StoredPoint};

/// How ids are assigned to stored points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointIdStrategy {
    /// Fresh UUIDv4 per point; re-ingesting the same text duplicates it.
    #[default]
    Random,
    /// UUID derived from a SHA-256 of text and metadata; re-ingesting
    /// replaces the existing point.
    ContentHash,
}

impl PointIdStrategy {
    pub fn point_id(&self, text: &str, metadata: &Metadata) -> String {
        match self {
            PointIdStrategy::Random => Uuid::new_v4().to_string(),
            PointIdStrategy::ContentHash => content_hash_id(text, metadata),
        }
    }
}

fn content_hash_id(text: &str, metadata: &Metadata) -> String {
    let mut entries: Vec<(&String, String)> =
        metadata.iter().map(|(k, v)| (k, v.to_string())).collect();
    entries.sort();

    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    for (key, value) in entries {
        hasher.update([0u8]);
        hasher.update(key.as_bytes());
        hasher.update([b'=']);
        hasher.update(value.as_bytes());
    }
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes).to_string()
}

#[derive(Clone)]
pub struct VectorIndex {
    store: Arc<dyn VectorStore>,
    collection: String,
    id_strategy: PointIdStrategy,
}

impl VectorIndex {
    pub fn new(store: Arc<dyn VectorStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            id_strategy: PointIdStrategy::default(),
        }
    }

    pub fn with_id_strategy(mut self, id_strategy: PointIdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub fn id_strategy(&self) -> PointIdStrategy {
        self.id_strategy
    }

    /// Create the collection unless one with this name already exists.
    ///
    /// An existing collection is left untouched even if its vector size or
    /// metric differ.
    pub async fn create_collection(&self, vector_size: usize, distance: DistanceMetric) -> Result<()> {
        if self.store.collection_exists(&self.collection).await? {
            tracing::info!(collection = %self.collection, "Collection already exists");
            return Ok(());
        }

        self.store
            .create_collection(&self.collection, vector_size, distance)
            .await?;
        tracing::info!(
            collection = %self.collection,
            vector_size,
            distance = distance.as_str(),
            "Created collection"
        );
        Ok(())
    }

    /// Store `texts` with their `vectors` and optional index-aligned metadata.
    ///
    /// Returns the number of points written.
    pub async fn upsert(
        &self,
        texts: &[String],
        vectors: &[Vec<f32>],
        metadata: Option<&[Metadata]>,
    ) -> Result<usize> {
        if texts.len() != vectors.len() {
            return Err(AppError::ShapeMismatch(format!(
                "{} texts but {} vectors",
                texts.len(),
                vectors.len()
            )));
        }
        if let Some(metadata) = metadata {
            if metadata.len() != texts.len() {
                return Err(AppError::ShapeMismatch(format!(
                    "{} texts but {} metadata entries",
                    texts.len(),
                    metadata.len()
                )));
            }
        }
        if texts.is_empty() {
            return Ok(0);
        }

        let empty = Metadata::new();
        let points: Vec<StoredPoint> = texts
            .iter()
            .zip(vectors)
            .enumerate()
            .map(|(i, (text, vector))| {
                let metadata = metadata.map_or(&empty, |m| &m[i]);
                StoredPoint {
                    id: self.id_strategy.point_id(text, metadata),
                    vector: vector.clone(),
                    text: text.clone(),
                    metadata: metadata.clone(),
                }
            })
            .collect();

        let count = self.store.upsert(&self.collection, &points).await?;
        tracing::info!(collection = %self.collection, count, "Added documents to collection");
        Ok(count)
    }

    /// Up to `top_k` nearest chunks, optionally restricted by `filter`.
    pub async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>> {
        let results = self
            .store
            .search(&self.collection, query_vector, top_k, filter)
            .await?;

        tracing::debug!(collection = %self.collection, count = results.len(), "Search completed");
        Ok(results)
    }

    /// Collection statistics, or `None` when they cannot be read.
    pub async fn get_collection_info(&self) -> Option<CollectionInfo> {
        match self.store.collection_info(&self.collection).await {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::error!(collection = %self.collection, error = %e, "Failed to get collection info");
                None
            }
        }
    }
}
