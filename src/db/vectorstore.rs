//! Vector Store Abstraction Layer
//!
//! This module provides a unified interface for the collection-oriented
//! vector engines the pipeline stores chunks in. Backends implement the
//! [`VectorStore`] trait; [`VectorStoreProvider`] selects and connects one.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      VectorStore Trait                      │
//! ├────────────────────────────────────────────────────────────┤
//! │ create_collection │ upsert │ search │ collection_info │ ... │
//! └────────────────────────────────────────────────────────────┘
//!            ▲                                ▲
//!            │                                │
//!      ┌─────┴────┐                    ┌──────┴──────┐
//!      │  Qdrant  │                    │  In-memory  │
//!      │ (server) │                    │ (dev/tests) │
//!      └──────────┘                    └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use ragline::db::vectorstore::{DistanceMetric, VectorStoreProvider};
//!
//! let store = VectorStoreProvider::InMemory.create_store().await?;
//! store.create_collection("documents", 1536, DistanceMetric::Cosine).await?;
//! store.upsert("documents", &points).await?;
//! let results = store.search("documents", &query_vector, 5, None).await?;
//! ```

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::filter::MetadataFilter;
use crate::types::{AppError, CollectionInfo, Result, SearchResult, StoredPoint};
use crate::utils::config::{RagConfig, VectorStoreKind};

// ============================================================================
// Distance Metric
// ============================================================================

/// Similarity metric a collection is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Dot,
    Euclid,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Dot => "dot",
            DistanceMetric::Euclid => "euclid",
        }
    }

    /// Score of `b` against `a` under this metric.
    ///
    /// For `Euclid` the score is a distance, so lower ranks first.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::Cosine => cosine_similarity(a, b),
            DistanceMetric::Dot => a.iter().zip(b.iter()).map(|(x, y)| x * y).sum(),
            DistanceMetric::Euclid => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
        }
    }

    pub fn higher_is_better(&self) -> bool {
        !matches!(self, DistanceMetric::Euclid)
    }
}

/// Calculate cosine similarity between two vectors.
///
/// Zero vectors have no direction and score 0 against everything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

// ============================================================================
// Vector Store Provider Configuration
// ============================================================================

/// Configuration for vector store providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum VectorStoreProvider {
    /// Qdrant - High-performance vector search engine.
    ///
    /// Requires a running Qdrant server reachable over gRPC.
    #[cfg(feature = "qdrant")]
    Qdrant {
        /// Qdrant server URL (e.g., "http://localhost:6334").
        url: String,
        /// Optional API key for authentication.
        api_key: Option<String>,
    },

    /// Process-local store with brute-force scoring.
    ///
    /// Data is not persisted and will be lost when the process exits.
    InMemory,
}

impl VectorStoreProvider {
    /// Select the provider named in `[vector_store]`.
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        match config.vector_store.provider {
            VectorStoreKind::Memory => Ok(VectorStoreProvider::InMemory),
            #[cfg(feature = "qdrant")]
            VectorStoreKind::Qdrant => Ok(VectorStoreProvider::Qdrant {
                url: config.vector_store.url.clone(),
                api_key: config.vector_store_api_key()?,
            }),
            #[cfg(not(feature = "qdrant"))]
            VectorStoreKind::Qdrant => Err(AppError::Configuration(
                "vector store 'qdrant' requires the 'qdrant' feature".to_string(),
            )),
        }
    }

    /// Create a vector store instance from this provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub async fn create_store(&self) -> Result<Box<dyn VectorStore>> {
        match self {
            #[cfg(feature = "qdrant")]
            VectorStoreProvider::Qdrant { url, api_key } => {
                let store = super::qdrant::QdrantVectorStore::new(url, api_key.clone())?;
                Ok(Box::new(store))
            }

            VectorStoreProvider::InMemory => Ok(Box::new(InMemoryVectorStore::new())),
        }
    }
}

// ============================================================================
// Vector Store Trait
// ============================================================================

/// Abstract trait for vector database operations.
///
/// # Implementors
///
/// - `QdrantVectorStore` - Qdrant server over gRPC
/// - `InMemoryVectorStore` - development and tests
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Get the name of this vector store provider.
    fn provider_name(&self) -> &'static str;

    /// Check if a collection exists.
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Create a new collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection already exists or creation fails.
    async fn create_collection(
        &self,
        name: &str,
        dimensions: usize,
        distance: DistanceMetric,
    ) -> Result<()>;

    /// Delete a collection and all its points.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Names of all collections in the store.
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Point counts and status of a collection.
    async fn collection_info(&self, name: &str) -> Result<CollectionInfo>;

    /// Insert or replace points by id. Returns the number written.
    async fn upsert(&self, collection: &str, points: &[StoredPoint]) -> Result<usize>;

    /// Nearest neighbours of `vector`, best first, at most `limit` of them.
    ///
    /// When `filter` is given only points whose metadata matches every
    /// condition are considered.
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>>;
}

// ============================================================================
// In-Memory Vector Store
// ============================================================================

/// In-memory vector store for development and tests.
///
/// Scores every point of a collection on each search; there is no index.
pub struct InMemoryVectorStore {
    collections: Arc<RwLock<HashMap<String, InMemoryCollection>>>,
}

struct InMemoryCollection {
    dimensions: usize,
    distance: DistanceMetric,
    points: HashMap<String, StoredPoint>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn collection_not_found(name: &str) -> AppError {
    AppError::VectorStore(format!("Collection '{}' not found", name))
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn provider_name(&self) -> &'static str {
        "in-memory"
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.collections.read().contains_key(name))
    }

    async fn create_collection(
        &self,
        name: &str,
        dimensions: usize,
        distance: DistanceMetric,
    ) -> Result<()> {
        let mut collections = self.collections.write();
        if collections.contains_key(name) {
            return Err(AppError::VectorStore(format!(
                "Collection '{}' already exists",
                name
            )));
        }
        collections.insert(
            name.to_string(),
            InMemoryCollection {
                dimensions,
                distance,
                points: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections
            .write()
            .remove(name)
            .ok_or_else(|| collection_not_found(name))?;
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionInfo> {
        let collections = self.collections.read();
        let col = collections
            .get(name)
            .ok_or_else(|| collection_not_found(name))?;

        let count = col.points.len() as u64;
        Ok(CollectionInfo {
            name: name.to_string(),
            vectors_count: count,
            points_count: count,
            status: "green".to_string(),
        })
    }

    async fn upsert(&self, collection: &str, points: &[StoredPoint]) -> Result<usize> {
        let mut collections = self.collections.write();
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| collection_not_found(collection))?;

        if let Some(bad) = points.iter().find(|p| p.vector.len() != col.dimensions) {
            return Err(AppError::VectorStore(format!(
                "point '{}' has dimension {}, collection '{}' expects {}",
                bad.id,
                bad.vector.len(),
                collection,
                col.dimensions
            )));
        }

        for point in points {
            col.points.insert(point.id.clone(), point.clone());
        }

        Ok(points.len())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>> {
        if let Some(filter) = filter {
            filter.validate()?;
        }

        let collections = self.collections.read();
        let col = collections
            .get(collection)
            .ok_or_else(|| collection_not_found(collection))?;

        if vector.len() != col.dimensions {
            return Err(AppError::VectorStore(format!(
                "query has dimension {}, collection '{}' expects {}",
                vector.len(),
                collection,
                col.dimensions
            )));
        }

        let mut results: Vec<SearchResult> = col
            .points
            .values()
            .filter(|p| filter.map_or(true, |f| f.matches(&p.metadata)))
            .map(|p| SearchResult {
                text: p.text.clone(),
                score: col.distance.score(vector, &p.vector),
                metadata: p.metadata.clone(),
            })
            .collect();

        // Best first under the collection's metric
        let descending = col.distance.higher_is_better();
        results.sort_by(|a, b| {
            let ord = a
                .score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });

        results.truncate(limit);

        Ok(results)
    }
}

// ============================================================================
// Tests
// ============================================================================
