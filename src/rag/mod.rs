//! Retrieval Augmented Generation (RAG) Pipeline
//!
//! This module provides the core pipeline components for answering questions
//! from your own documents.
//!
//! # Module Structure
//!
//! - [`rag::loader`](crate::rag::loader) - Extension-dispatched file loaders
//! - [`rag::chunker`](crate::rag::chunker) - Token-bounded sentence chunking
//! - [`rag::embeddings`](crate::rag::embeddings) - Embedding gateway and providers
//! - [`rag::prompt`](crate::rag::prompt) - Grounded prompt assembly
//! - [`rag::retriever`](crate::rag::retriever) - Ingest and query orchestration
//!
//! # RAG Pipeline
//!
//! 1. **Loading** - Files are read through the loader registry
//! 2. **Chunking** - Text is split into overlapping, token-bounded chunks
//! 3. **Embedding** - All chunks are embedded in one batch
//! 4. **Storage** - Vectors and payloads are upserted into the collection
//! 5. **Retrieval** - The query is embedded and similar chunks retrieved
//! 6. **Generation** - The LLM answers from the numbered context
//!
//! # Example
//!
//! ```ignore
//! use ragline::rag::retriever::RagRetriever;
//! use ragline::types::IngestRequest;
//!
//! let retriever = RagRetriever::from_config(&config).await?;
//! retriever
//!     .ingest(IngestRequest::from_texts(["Machine learning is a subset of AI."]))
//!     .await?;
//!
//! let response = retriever.query("What is machine learning?", None, None).await?;
//! println!("{}", response.answer);
//! ```

pub mod chunker;
pub mod embeddings;
pub mod loader;
pub mod prompt;
pub mod retriever;

pub use chunker::{DocumentProcessor, OverlapStrategy};
pub use embeddings::{EmbeddingGateway, EmbeddingProvider, HashedEmbedder};
pub use loader::{
    DocumentLoader, DocumentSummary, LoadedDirectory, LoadedDocument, LoaderRegistry, TextLoader,
};
pub use retriever::{RagRetriever, RetrieverOptions};

#[cfg(feature = "openai")]
pub use embeddings::OpenAIEmbedder;
