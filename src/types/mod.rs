use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============= Metadata =============

/// Free-form chunk metadata: caller-defined keys mapped to scalar values.
///
/// Backed by `serde_json::Map`, which keeps keys sorted so hashing and
/// display are deterministic.
pub type Metadata = serde_json::Map<String, Value>;

// ============= Pipeline Types =============

/// A bounded slice of source text prepared for embedding and storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub token_count: usize,
    pub metadata: Metadata,
}

/// A point as handed to a vector store: id, vector and payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: Metadata,
}

/// One ranked hit returned from similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub text: String,
    /// Score reported by the store. Higher is more relevant except under
    /// [`DistanceMetric::Euclid`](crate::db::DistanceMetric::Euclid), where
    /// it is a distance and lower ranks first.
    pub score: f32,
    pub metadata: Metadata,
}

/// Read-only statistics about the active collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub vectors_count: u64,
    pub points_count: u64,
    pub status: String,
}

/// Answer produced by a full retrieve-then-generate round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<SearchResult>,
    pub query: String,
    pub num_sources: usize,
}

impl QueryResponse {
    /// Distinct `source` metadata values of the cited chunks, in rank order.
    pub fn unique_sources(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for result in &self.sources {
            if let Some(source) = result.metadata.get("source") {
                let source = match source {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                if !seen.contains(&source) {
                    seen.push(source);
                }
            }
        }
        seen
    }
}

/// Inputs for one `ingest` call.
#[derive(Debug, Clone, Default)]
pub struct IngestRequest {
    pub file_paths: Vec<std::path::PathBuf>,
    pub texts: Vec<String>,
    /// Index-aligned with `texts`; missing entries default to empty metadata.
    pub metadata: Vec<Metadata>,
}

impl IngestRequest {
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn from_files<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<std::path::PathBuf>,
    {
        Self {
            file_paths: paths.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, metadata: Vec<Metadata>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// What one `ingest` call actually stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub files_processed: usize,
    pub files_failed: usize,
    pub texts_processed: usize,
    pub chunks_ingested: usize,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    #[error("Generation provider error: {0}")]
    GenerationProvider(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<crate::utils::config::ConfigError> for AppError {
    fn from(err: crate::utils::config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
