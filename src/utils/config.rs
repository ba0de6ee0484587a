//! TOML-based configuration for ragline
//!
//! All tunables of the pipeline live in one explicit [`RagConfig`] value that
//! is loaded once (usually from `ragline.toml`) and passed into each
//! component's constructor. Secrets are never written to the file: provider
//! sections name the environment variable that holds the key.
//!
//! ```toml
//! [chunking]
//! chunk_size = 1000
//! chunk_overlap = 200
//! overlap = "sentences"
//!
//! [embedding]
//! provider = "openai"
//! model = "text-embedding-3-small"
//!
//! [vector_store]
//! provider = "qdrant"
//! url = "http://localhost:6334"
//! collection = "capstone_docs"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::index::PointIdStrategy;
use crate::db::vectorstore::DistanceMetric;
use crate::rag::chunker::OverlapStrategy;

/// Root configuration structure loaded from ragline.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============= Chunking Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapMode {
    /// Seed each new chunk with the trailing sentences of the previous one
    #[default]
    Sentences,
    /// Seed each new chunk with trailing sentences fitting `chunk_overlap` tokens
    Tokens,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in tokens
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Token budget for overlap; only consumed in `tokens` mode
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    #[serde(default)]
    pub overlap: OverlapMode,

    /// Number of trailing sentences carried over in `sentences` mode
    #[serde(default = "default_overlap_sentences")]
    pub overlap_sentences: usize,

    /// Model whose tokenizer gates the chunk size
    #[serde(default = "default_generation_model")]
    pub tokenizer_model: String,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_overlap_sentences() -> usize {
    2
}

impl ChunkingConfig {
    pub fn overlap_strategy(&self) -> OverlapStrategy {
        match self.overlap {
            OverlapMode::Sentences => OverlapStrategy::Sentences(self.overlap_sentences),
            OverlapMode::Tokens => OverlapStrategy::Tokens(self.chunk_overlap),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            overlap: OverlapMode::default(),
            overlap_sentences: default_overlap_sentences(),
            tokenizer_model: default_generation_model(),
        }
    }
}

// ============= Provider Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    #[default]
    OpenAI,
    /// Ollama through its OpenAI-compatible `/v1` endpoint
    Ollama,
    /// Offline feature-hashing embedder, for development and tests
    Hashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProviderKind {
    #[default]
    OpenAI,
    Ollama,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProviderKind,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector dimension produced by `model`
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Override for the provider's base URL
    #[serde(default)]
    pub api_base: Option<String>,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_dimensions() -> usize {
    1536
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            api_key_env: default_api_key_env(),
            api_base: None,
        }
    }
}

impl EmbeddingConfig {
    pub fn resolved_api_base(&self) -> String {
        match (&self.api_base, self.provider) {
            (Some(base), _) => base.clone(),
            (None, EmbeddingProviderKind::Ollama) => default_ollama_base(),
            (None, _) => default_openai_base(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub provider: GenerationProviderKind,

    #[serde(default = "default_generation_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default)]
    pub api_base: Option<String>,
}

fn default_generation_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ollama_base() -> String {
    "http://localhost:11434/v1".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: GenerationProviderKind::default(),
            model: default_generation_model(),
            temperature: default_temperature(),
            api_key_env: default_api_key_env(),
            api_base: None,
        }
    }
}

impl GenerationConfig {
    pub fn resolved_api_base(&self) -> String {
        match (&self.api_base, self.provider) {
            (Some(base), _) => base.clone(),
            (None, GenerationProviderKind::Ollama) => default_ollama_base(),
            (None, GenerationProviderKind::OpenAI) => default_openai_base(),
        }
    }
}

// ============= Vector Store Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreKind {
    #[default]
    Qdrant,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(default)]
    pub provider: VectorStoreKind,

    #[serde(default = "default_qdrant_url")]
    pub url: String,

    /// Environment variable for the Qdrant API key
    #[serde(default)]
    pub api_key_env: Option<String>,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default)]
    pub distance: DistanceMetric,

    #[serde(default)]
    pub point_ids: PointIdStrategy,
}

fn default_qdrant_url() -> String {
    "http://localhost:6334".to_string()
}

fn default_collection() -> String {
    "capstone_docs".to_string()
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            provider: VectorStoreKind::default(),
            url: default_qdrant_url(),
            api_key_env: None,
            collection: default_collection(),
            distance: DistanceMetric::default(),
            point_ids: PointIdStrategy::default(),
        }
    }
}

// ============= Retrieval Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Replaces the built-in grounding system prompt when set
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_top_k() -> usize {
    5
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            system_prompt: None,
        }
    }
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl RagConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RagConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration back to TOML (used by `ragline init`)
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let chunking = &self.chunking;
        if chunking.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "chunking.chunk_size must be greater than zero".to_string(),
            ));
        }
        // Only the token strategy reads chunk_overlap
        if chunking.overlap == OverlapMode::Tokens
            && chunking.chunk_overlap >= chunking.chunk_size
        {
            return Err(ConfigError::ValidationError(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunking.chunk_overlap, chunking.chunk_size
            )));
        }
        if chunking.overlap == OverlapMode::Sentences && chunking.overlap_sentences == 0 {
            return Err(ConfigError::ValidationError(
                "chunking.overlap_sentences must be at least 1 in sentences mode".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.dimensions must be greater than zero".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "generation.temperature must be within 0.0..=2.0, got {}",
                self.generation.temperature
            )));
        }

        if self.vector_store.collection.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "vector_store.collection must not be empty".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Check that every environment variable the selected providers need is set
    pub fn validate_env(&self) -> Result<(), ConfigError> {
        if self.embedding.provider == EmbeddingProviderKind::OpenAI {
            self.validate_env_var(&self.embedding.api_key_env)?;
        }
        if self.generation.provider == GenerationProviderKind::OpenAI {
            self.validate_env_var(&self.generation.api_key_env)?;
        }
        if self.vector_store.provider == VectorStoreKind::Qdrant {
            if let Some(ref env) = self.vector_store.api_key_env {
                self.validate_env_var(env)?;
            }
        }
        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    /// API key for the embedding provider, if it needs one
    pub fn embedding_api_key(&self) -> Result<Option<String>, ConfigError> {
        match self.embedding.provider {
            EmbeddingProviderKind::OpenAI => self
                .resolve_env(&self.embedding.api_key_env)
                .map(Some)
                .ok_or_else(|| ConfigError::MissingEnvVar(self.embedding.api_key_env.clone())),
            EmbeddingProviderKind::Ollama => Ok(self.resolve_env(&self.embedding.api_key_env)),
            EmbeddingProviderKind::Hashed => Ok(None),
        }
    }

    /// API key for the generation provider, if it needs one
    pub fn generation_api_key(&self) -> Result<Option<String>, ConfigError> {
        match self.generation.provider {
            GenerationProviderKind::OpenAI => self
                .resolve_env(&self.generation.api_key_env)
                .map(Some)
                .ok_or_else(|| ConfigError::MissingEnvVar(self.generation.api_key_env.clone())),
            GenerationProviderKind::Ollama => Ok(self.resolve_env(&self.generation.api_key_env)),
        }
    }

    /// API key for the Qdrant server, if one is configured
    pub fn vector_store_api_key(&self) -> Result<Option<String>, ConfigError> {
        match self.vector_store.api_key_env {
            Some(ref env) => self
                .resolve_env(env)
                .map(Some)
                .ok_or_else(|| ConfigError::MissingEnvVar(env.clone())),
            None => Ok(None),
        }
    }
}
