//! # ragline
//!
//! A retrieval-augmented generation pipeline in Rust: token-aware chunking,
//! batched embeddings, vector search with metadata filters and grounded
//! prompt assembly for a chat model.
//!
//! ## Overview
//!
//! ragline can be used in two ways:
//!
//! 1. **As a command-line tool** - Run the `ragline` binary
//! 2. **As a library** - Assemble a [`RagRetriever`] in your own project
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use ragline::{IngestRequest, RagConfig, RagRetriever};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RagConfig::load("ragline.toml")?;
//!     let retriever = RagRetriever::from_config(&config).await?;
//!
//!     retriever
//!         .ingest(IngestRequest::from_files(["docs/intro.md"]))
//!         .await?;
//!
//!     let response = retriever.query("What is machine learning?", None, None).await?;
//!     println!("{}", response.answer);
//!     Ok(())
//! }
//! ```
//!
//! ### Offline Setup
//!
//! Every component can be injected, which is how the tests run without a
//! network:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragline::db::{InMemoryVectorStore, VectorIndex};
//! use ragline::rag::{DocumentProcessor, EmbeddingGateway, HashedEmbedder, OverlapStrategy};
//! use ragline::rag::RetrieverOptions;
//!
//! let retriever = RagRetriever::new(
//!     DocumentProcessor::new(1000, OverlapStrategy::default(), "gpt-3.5-turbo")?,
//!     EmbeddingGateway::new(Arc::new(HashedEmbedder::new(512))),
//!     VectorIndex::new(Arc::new(InMemoryVectorStore::new()), "docs"),
//!     llm,
//!     RetrieverOptions::default(),
//! )
//! .await?;
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `openai` | OpenAI-compatible embeddings and chat, also used for Ollama (default) |
//! | `qdrant` | Qdrant vector database (default) |
//! | `minimal` | No network backends; in-memory store and hashed embeddings |
//!
//! ## Modules
//!
//! - [`cli`] - Argument parsing and terminal output for the binary
//! - [`db`] - Vector store backends, filters and the collection index
//! - [`llm`] - Chat model clients
//! - [`rag`] - Loaders, chunker, embeddings, prompts and the retriever
//! - [`types`] - Shared data types and errors
//! - [`utils`] - Configuration and logging

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Command-line interface for the `ragline` binary.
pub mod cli;
/// Vector storage backends and the collection index.
pub mod db;
/// LLM provider clients and abstractions.
pub mod llm;
/// Retrieval Augmented Generation (RAG) components.
pub mod rag;
/// Core types (chunks, results, errors).
pub mod types;
/// Configuration and logging utilities.
pub mod utils;

// Re-export commonly used types
pub use db::{MetadataFilter, VectorIndex, VectorStore};
pub use llm::{LLMClient, Provider};
pub use rag::{DocumentProcessor, EmbeddingGateway, RagRetriever};
pub use types::{AppError, IngestReport, IngestRequest, QueryResponse, Result, SearchResult};
pub use utils::config::RagConfig;
