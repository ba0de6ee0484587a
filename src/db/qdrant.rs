use async_trait::async_trait;
use qdrant_client::{
    qdrant::{
        Condition, CreateCollectionBuilder, Distance, Filter, PointStruct, ScoredPoint,
        SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
    },
    Qdrant,
};
use serde_json::Value;
use std::collections::HashMap;

use super::filter::MetadataFilter;
use super::vectorstore::{DistanceMetric, VectorStore};
use crate::types::{AppError, CollectionInfo, Metadata, Result, SearchResult, StoredPoint};

/// Qdrant vector store implementation.
///
/// Each point's payload holds `text` and a nested `metadata` object, so
/// filters address fields as `metadata.<key>`.
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    pub fn new(url: &str, api_key: Option<String>) -> Result<Self> {
        let mut builder = Qdrant::from_url(url);
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }

        let client = builder
            .build()
            .map_err(|e| AppError::VectorStore(format!("Failed to create Qdrant client: {}", e)))?;

        tracing::debug!(url, "Qdrant client created");
        Ok(Self { client })
    }

    fn distance(metric: DistanceMetric) -> Distance {
        match metric {
            DistanceMetric::Cosine => Distance::Cosine,
            DistanceMetric::Dot => Distance::Dot,
            DistanceMetric::Euclid => Distance::Euclid,
        }
    }

    /// Translate a validated filter into Qdrant `must` conditions.
    fn build_filter(filter: &MetadataFilter) -> Result<Filter> {
        let mut conditions = Vec::with_capacity(filter.conditions().len());

        for (key, value) in filter.conditions() {
            let field = format!("metadata.{}", key);
            let condition = match value {
                Value::String(s) => Condition::matches(field, s.clone()),
                Value::Bool(b) => Condition::matches(field, *b),
                Value::Number(n) => {
                    let n = n.as_i64().ok_or_else(|| {
                        AppError::VectorStore(format!(
                            "filter value for '{}' does not fit a 64-bit integer",
                            key
                        ))
                    })?;
                    Condition::matches(field, n)
                }
                other => {
                    return Err(AppError::VectorStore(format!(
                        "unsupported filter value for '{}': {}",
                        key, other
                    )))
                }
            };
            conditions.push(condition);
        }

        Ok(Filter::must(conditions))
    }

    /// Parse search results from a Qdrant response.
    fn parse_scored_point(point: ScoredPoint) -> SearchResult {
        let mut payload = point.payload;

        let text = payload
            .get("text")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let metadata = match payload.remove("metadata").map(Value::from) {
            Some(Value::Object(map)) => map,
            _ => Metadata::new(),
        };

        SearchResult {
            text,
            score: point.score,
            metadata,
        }
    }
}

// ============================================================================
// VectorStore Trait Implementation
// ============================================================================

#[async_trait]
impl VectorStore for QdrantVectorStore {
    fn provider_name(&self) -> &'static str {
        "qdrant"
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to list collections: {}", e)))?;

        Ok(collections.collections.iter().any(|c| c.name == name))
    }

    async fn create_collection(
        &self,
        name: &str,
        dimensions: usize,
        distance: DistanceMetric,
    ) -> Result<()> {
        self.client
            .create_collection(
                CreateCollectionBuilder::new(name).vectors_config(VectorParamsBuilder::new(
                    dimensions as u64,
                    Self::distance(distance),
                )),
            )
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to create collection: {}", e)))?;

        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.client
            .delete_collection(name)
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to delete collection: {}", e)))?;
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to list collections: {}", e)))?;

        Ok(collections.collections.into_iter().map(|c| c.name).collect())
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionInfo> {
        let info = self
            .client
            .collection_info(name)
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to get collection info: {}", e)))?;

        let result = info
            .result
            .ok_or_else(|| AppError::VectorStore(format!("Collection '{}' not found", name)))?;

        Ok(CollectionInfo {
            name: name.to_string(),
            vectors_count: result.indexed_vectors_count.unwrap_or(0),
            points_count: result.points_count.unwrap_or(0),
            status: result.status().as_str_name().to_lowercase(),
        })
    }

    async fn upsert(&self, collection: &str, points: &[StoredPoint]) -> Result<usize> {
        let qdrant_points: Vec<PointStruct> = points
            .iter()
            .map(|point| {
                let mut payload: HashMap<String, qdrant_client::qdrant::Value> = HashMap::new();
                payload.insert("text".to_string(), point.text.clone().into());
                payload.insert(
                    "metadata".to_string(),
                    Value::Object(point.metadata.clone()).into(),
                );
                PointStruct::new(point.id.clone(), point.vector.clone(), payload)
            })
            .collect();

        let count = qdrant_points.len();
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, qdrant_points).wait(true))
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to upsert points: {}", e)))?;

        tracing::debug!(collection, count, "Upserted points");
        Ok(count)
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>> {
        let mut search_builder =
            SearchPointsBuilder::new(collection, vector.to_vec(), limit as u64).with_payload(true);

        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            filter.validate()?;
            search_builder = search_builder.filter(Self::build_filter(filter)?);
        }

        let response = self
            .client
            .search_points(search_builder)
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to search: {}", e)))?;

        Ok(response
            .result
            .into_iter()
            .map(Self::parse_scored_point)
            .collect())
    }
}
