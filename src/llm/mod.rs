//! LLM Provider Clients and Abstractions
//!
//! This module provides a unified interface for the chat-completion
//! collaborator. The pipeline only ever sees [`LLMClient`]; [`Provider`]
//! picks the concrete client from configuration.
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `openai` - OpenAI API and OpenAI-compatible servers, including Ollama
//!
//! # Example
//!
//! ```ignore
//! use ragline::llm::Provider;
//!
//! let provider = Provider::from_config(&config)?;
//! let client = provider.create_client()?;
//!
//! let answer = client.generate_with_system("Be brief.", "What is 2+2?").await?;
//! println!("{}", answer);
//! ```

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, Provider};

#[cfg(test)]
pub use client::MockLLMClient;
