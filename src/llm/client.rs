//! LLM Client abstractions and provider selection
//!
//! Generation goes through the [`LLMClient`] trait. Two providers are
//! supported, both over the OpenAI chat-completions wire format:
//! - **OpenAI**: the OpenAI API or any compatible endpoint
//! - **Ollama**: a local Ollama server through its `/v1` compatibility layer

use crate::types::{AppError, Result};
use crate::utils::config::{GenerationProviderKind, RagConfig};
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing application code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion for `prompt` under the given system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
#[derive(Debug, Clone, PartialEq)]
pub enum Provider {
    /// OpenAI API provider (including Azure OpenAI and compatible APIs)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-3.5-turbo".to_string(),
    ///     temperature: 0.7,
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
        temperature: f32,
    },

    /// Ollama local LLM provider
    ///
    /// `api_base` points at the OpenAI-compatible endpoint,
    /// e.g. `http://localhost:11434/v1`.
    Ollama {
        api_base: String,
        model: String,
        temperature: f32,
    },
}

impl Provider {
    /// Build the provider described by `[generation]`.
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        let generation = &config.generation;
        let provider = match generation.provider {
            GenerationProviderKind::OpenAI => Provider::OpenAI {
                api_key: config.generation_api_key()?.unwrap_or_default(),
                api_base: generation.resolved_api_base(),
                model: generation.model.clone(),
                temperature: generation.temperature,
            },
            GenerationProviderKind::Ollama => Provider::Ollama {
                api_base: generation.resolved_api_base(),
                model: generation.model.clone(),
                temperature: generation.temperature,
            },
        };
        Ok(provider)
    }

    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the crate was built without the `openai` feature.
    pub fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
                temperature,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                Some(api_key.as_str()),
                api_base,
                model,
                *temperature,
            ))),

            #[cfg(feature = "openai")]
            Provider::Ollama {
                api_base,
                model,
                temperature,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                None,
                api_base,
                model,
                *temperature,
            ))),

            #[cfg(not(feature = "openai"))]
            _ => Err(AppError::Configuration(format!(
                "{} provider requires the 'openai' feature",
                self.name()
            ))),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}

/// Map any provider-side failure into the generation error variant.
#[cfg(feature = "openai")]
pub(crate) fn generation_error(context: &str, err: impl std::fmt::Display) -> AppError {
    AppError::GenerationProvider(format!("{}: {}", context, err))
}
