use crate::llm::client::{generation_error, LLMClient};
use crate::types::{AppError, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

/// Chat-completions client for OpenAI and compatible servers.
///
/// Every request is a single non-streaming completion at the client's
/// temperature.
pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIClient {
    pub fn new(api_key: Option<&str>, api_base: &str, model: &str, temperature: f32) -> Self {
        let mut config = OpenAIConfig::new().with_api_base(api_base);
        if let Some(key) = api_key {
            config = config.with_api_key(key);
        }

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            temperature,
        }
    }

    async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| generation_error("Failed to build request", e))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| generation_error("OpenAI API error", e))?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion finished"
            );
        }

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::GenerationProvider("No response from OpenAI".to_string()))
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.complete(vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage::from(
                system.to_string(),
            )),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage::from(
                prompt.to_string(),
            )),
        ])
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
