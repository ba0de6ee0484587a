//! Embedding providers and the gateway the pipeline talks to.
//!
//! The [`EmbeddingGateway`] validates inputs and batches them into a single
//! provider call. Providers sit behind the [`EmbeddingProvider`] trait:
//!
//! - [`OpenAIEmbedder`] - any OpenAI-compatible `/embeddings` endpoint
//!   (OpenAI itself, Ollama's `/v1`, proxies). Requires the `openai` feature.
//! - [`HashedEmbedder`] - deterministic bag-of-words feature hashing. Needs no
//!   network and is meant for development and tests.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::types::{AppError, Result};
use crate::utils::config::{EmbeddingProviderKind, RagConfig};

#[cfg(feature = "openai")]
use async_openai::{config::OpenAIConfig, types::CreateEmbeddingRequestArgs, Client};

/// Turns text into dense vectors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `texts`, returning one vector per input in the same order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn model_name(&self) -> &str;

    /// Dimension of the produced vectors.
    fn dimensions(&self) -> usize;
}

/// Validation and batching in front of an [`EmbeddingProvider`].
///
/// Provider failures are surfaced as-is. Nothing is retried or cached.
#[derive(Clone)]
pub struct EmbeddingGateway {
    provider: Arc<dyn EmbeddingProvider>,
}

impl EmbeddingGateway {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    /// Build the configured provider and wrap it.
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        let embedding = &config.embedding;

        let provider: Arc<dyn EmbeddingProvider> = match embedding.provider {
            EmbeddingProviderKind::Hashed => Arc::new(HashedEmbedder::new(embedding.dimensions)),
            #[cfg(feature = "openai")]
            EmbeddingProviderKind::OpenAI | EmbeddingProviderKind::Ollama => {
                let api_key = config.embedding_api_key()?;
                Arc::new(OpenAIEmbedder::new(
                    api_key.as_deref(),
                    &embedding.resolved_api_base(),
                    &embedding.model,
                    embedding.dimensions,
                ))
            }
            #[cfg(not(feature = "openai"))]
            EmbeddingProviderKind::OpenAI | EmbeddingProviderKind::Ollama => {
                return Err(AppError::Configuration(
                    "embedding provider requires the 'openai' feature".to_string(),
                ))
            }
        };

        tracing::info!(
            provider = ?embedding.provider,
            model = %embedding.model,
            dimensions = embedding.dimensions,
            "Embedding provider configured"
        );

        Ok(Self::new(provider))
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    pub fn dimensions(&self) -> usize {
        self.provider.dimensions()
    }

    /// Embed a single non-empty text.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "cannot embed empty text".to_string(),
            ));
        }

        let mut vectors = self.provider.embed(&[text.to_string()]).await?;
        if vectors.len() != 1 {
            return Err(AppError::EmbeddingProvider(format!(
                "expected 1 embedding, provider returned {}",
                vectors.len()
            )));
        }
        Ok(vectors.remove(0))
    }

    /// Embed many texts in one provider call.
    ///
    /// Empty input returns an empty result without calling the provider.
    /// Blank strings are dropped before the call, so the output aligns with
    /// the filtered input rather than `texts`.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let valid: Vec<String> = texts
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect();

        let dropped = texts.len() - valid.len();
        if dropped > 0 {
            tracing::warn!(dropped, "Skipping empty texts in embedding batch");
        }
        if valid.is_empty() {
            return Err(AppError::InvalidInput(
                "no valid texts to embed".to_string(),
            ));
        }

        let vectors = self.provider.embed(&valid).await?;
        if vectors.len() != valid.len() {
            return Err(AppError::EmbeddingProvider(format!(
                "expected {} embeddings, provider returned {}",
                valid.len(),
                vectors.len()
            )));
        }

        tracing::debug!(count = vectors.len(), "Generated embeddings");
        Ok(vectors)
    }
}

// ============= OpenAI-compatible provider =============

/// Embeddings over the OpenAI `/embeddings` API or a compatible endpoint.
#[cfg(feature = "openai")]
pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
}

#[cfg(feature = "openai")]
impl OpenAIEmbedder {
    pub fn new(api_key: Option<&str>, api_base: &str, model: &str, dimensions: usize) -> Self {
        let mut config = OpenAIConfig::new().with_api_base(api_base);
        if let Some(key) = api_key {
            config = config.with_api_key(key);
        }

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            dimensions,
        }
    }
}

#[cfg(feature = "openai")]
#[async_trait]
impl EmbeddingProvider for OpenAIEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(texts.to_vec())
            .build()
            .map_err(|e| AppError::EmbeddingProvider(e.to_string()))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| AppError::EmbeddingProvider(e.to_string()))?;

        let mut data = response.data;
        data.sort_by_key(|item| item.index);

        Ok(data.into_iter().map(|item| item.embedding).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ============= Hashed provider =============

/// Feature-hashing embedder: each lowercase alphanumeric token increments
/// one bucket, and the vector is L2-normalized.
///
/// Texts sharing words land close together under cosine similarity, which
/// is enough to exercise the pipeline end to end without a model.
#[derive(Debug, Clone, Copy)]
pub struct HashedEmbedder {
    dimensions: usize,
}

impl HashedEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in tokens(text) {
            vector[bucket(&token, self.dimensions)] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn model_name(&self) -> &str {
        "hashed"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

fn bucket(token: &str, dimensions: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    (hasher.finish() % dimensions as u64) as usize
}
