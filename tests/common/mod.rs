//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod mocks;

use std::sync::Arc;

use ragline::db::{InMemoryVectorStore, VectorIndex};
use ragline::rag::{
    DocumentProcessor, EmbeddingGateway, HashedEmbedder, OverlapStrategy, RagRetriever,
    RetrieverOptions,
};
use ragline::LLMClient;

/// Offline retriever: hashed embeddings, in-memory store, the given LLM.
pub async fn offline_retriever(llm: Arc<dyn LLMClient>, index: VectorIndex) -> RagRetriever {
    RagRetriever::new(
        DocumentProcessor::new(1000, OverlapStrategy::default(), "gpt-3.5-turbo")
            .expect("tokenizer should load"),
        EmbeddingGateway::new(Arc::new(HashedEmbedder::new(512))),
        index,
        llm,
        RetrieverOptions::default(),
    )
    .await
    .expect("retriever should build")
}

pub fn memory_index(collection: &str) -> VectorIndex {
    VectorIndex::new(Arc::new(InMemoryVectorStore::new()), collection)
}
