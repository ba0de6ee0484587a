//! End-to-end pipeline tests over the public API.
//!
//! Everything runs offline: hashed embeddings, the in-memory store and the
//! recording mock LLM from `common::mocks`.

mod common;

use std::fs;
use std::sync::Arc;

use common::mocks::{CountingEmbedder, MockLLMClient};
use common::{memory_index, offline_retriever};
use ragline::db::PointIdStrategy;
use ragline::rag::prompt::{DEFAULT_SYSTEM_PROMPT, NO_CONTEXT_ANSWER};
use ragline::rag::{
    DocumentProcessor, EmbeddingGateway, OverlapStrategy, RagRetriever, RetrieverOptions,
};
use ragline::types::{AppError, Metadata};
use ragline::{IngestRequest, MetadataFilter};
use serde_json::json;
use tempfile::TempDir;

fn topic(value: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("topic".to_string(), json!(value));
    metadata
}

// =============================================================================
// Query flow
// =============================================================================

#[tokio::test]
async fn test_ask_answers_from_retrieved_context() {
    let llm = Arc::new(MockLLMClient::new("It is a subset of AI [Document 1]."));
    let retriever = offline_retriever(llm.clone(), memory_index("e2e")).await;

    retriever
        .ingest(IngestRequest::from_texts([
            "Machine learning is a subset of AI.",
            "The borrow checker enforces ownership rules.",
        ]))
        .await
        .expect("ingest should succeed");

    let response = retriever
        .query("What is machine learning?", Some(1), None)
        .await
        .expect("query should succeed");

    assert_eq!(response.answer, "It is a subset of AI [Document 1].");
    assert_eq!(response.query, "What is machine learning?");
    assert_eq!(response.num_sources, 1);
    assert_eq!(response.sources[0].text, "Machine learning is a subset of AI.");

    assert_eq!(llm.call_count(), 1);
    let prompt = llm.last_prompt().expect("prompt recorded");
    assert!(prompt.starts_with("Context:\nDocument 1 (score: "));
    assert!(prompt.contains("Machine learning is a subset of AI."));
    assert!(prompt.contains("Question: What is machine learning?"));
    assert!(!prompt.contains("borrow checker"));
    assert_eq!(llm.last_system().as_deref(), Some(DEFAULT_SYSTEM_PROMPT));
}

#[tokio::test]
async fn test_empty_collection_short_circuits() {
    let llm = Arc::new(MockLLMClient::new("should not be used"));
    let retriever = offline_retriever(llm.clone(), memory_index("empty")).await;

    let response = retriever
        .query("Anything at all?", None, None)
        .await
        .expect("query should succeed");

    assert_eq!(response.answer, NO_CONTEXT_ANSWER);
    assert!(response.sources.is_empty());
    assert_eq!(response.num_sources, 0);
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_filter_restricts_sources() {
    let llm = Arc::new(MockLLMClient::new("answer"));
    let retriever = offline_retriever(llm.clone(), memory_index("filtered")).await;

    retriever
        .ingest(
            IngestRequest::from_texts([
                "Machine learning is a subset of AI.",
                "Rust programs compile to machine code.",
            ])
            .with_metadata(vec![topic("AI"), topic("Programming")]),
        )
        .await
        .expect("ingest should succeed");

    let filter = MetadataFilter::parse_all(&["topic=Programming"]).expect("valid filter");
    let response = retriever
        .query("What is machine learning?", Some(5), Some(&filter))
        .await
        .expect("query should succeed");

    assert_eq!(response.num_sources, 1);
    assert_eq!(response.sources[0].metadata["topic"], json!("Programming"));
}

#[tokio::test]
async fn test_configured_system_prompt_is_used() {
    let llm = Arc::new(MockLLMClient::new("answer"));
    let options = RetrieverOptions {
        system_prompt: Some("Answer in one word.".to_string()),
        ..Default::default()
    };
    let retriever = RagRetriever::new(
        DocumentProcessor::new(1000, OverlapStrategy::default(), "gpt-3.5-turbo")
            .expect("tokenizer should load"),
        EmbeddingGateway::new(Arc::new(ragline::rag::HashedEmbedder::new(128))),
        memory_index("prompted"),
        llm.clone(),
        options,
    )
    .await
    .expect("retriever should build");

    retriever
        .ingest(IngestRequest::from_texts(["Tokio is an async runtime."]))
        .await
        .expect("ingest should succeed");
    retriever
        .query("What is Tokio?", None, None)
        .await
        .expect("query should succeed");

    assert_eq!(llm.last_system().as_deref(), Some("Answer in one word."));
}

#[tokio::test]
async fn test_exact_chunk_text_ranks_first() {
    let retriever =
        offline_retriever(Arc::new(MockLLMClient::new("x")), memory_index("exact")).await;
    let texts = [
        "Tokio schedules tasks on a work-stealing runtime.",
        "Serde derives serializers for plain structs.",
        "Qdrant stores vectors with JSON payloads.",
        "Clap turns a struct into a command-line parser.",
    ];

    retriever
        .ingest(IngestRequest::from_texts(texts))
        .await
        .expect("ingest should succeed");

    for text in texts {
        let results = retriever
            .retrieve(text, Some(texts.len()), None)
            .await
            .expect("retrieve should succeed");
        assert_eq!(results[0].text, text);
        assert!((results[0].score - 1.0).abs() < 1e-5);
    }
}

#[tokio::test]
async fn test_generation_failure_propagates() {
    let llm = Arc::new(MockLLMClient::failing());
    let retriever = offline_retriever(llm.clone(), memory_index("failing")).await;

    retriever
        .ingest(IngestRequest::from_texts(["Vectors live in collections."]))
        .await
        .expect("ingest should succeed");

    let err = retriever
        .query("Where do vectors live?", None, None)
        .await
        .expect_err("generation failure must surface");
    assert!(matches!(err, AppError::GenerationProvider(_)));
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_blank_query_is_invalid_input() {
    let retriever = offline_retriever(Arc::new(MockLLMClient::new("x")), memory_index("blank")).await;

    let err = retriever
        .retrieve("   ", None, None)
        .await
        .expect_err("blank query must be rejected");
    assert!(matches!(err, AppError::InvalidInput(_)));
}

// =============================================================================
// Ingest flow
// =============================================================================

#[tokio::test]
async fn test_files_and_texts_share_one_embedding_batch() {
    let dir = TempDir::new().expect("temp dir");
    let notes = dir.path().join("notes.md");
    fs::write(&notes, "# Notes\nQdrant stores vectors. Payloads hold metadata.").expect("write");

    let embedder = Arc::new(CountingEmbedder::new(4));
    let retriever = RagRetriever::new(
        DocumentProcessor::new(1000, OverlapStrategy::default(), "gpt-3.5-turbo")
            .expect("tokenizer should load"),
        EmbeddingGateway::new(embedder.clone()),
        memory_index("batched"),
        Arc::new(MockLLMClient::new("x")),
        RetrieverOptions::default(),
    )
    .await
    .expect("retriever should build");

    let request = IngestRequest {
        file_paths: vec![notes],
        texts: vec!["First text.".to_string(), "Second text.".to_string()],
        metadata: Vec::new(),
    };
    let report = retriever.ingest(request).await.expect("ingest should succeed");

    assert_eq!(report.files_processed, 1);
    assert_eq!(report.texts_processed, 2);
    assert_eq!(report.chunks_ingested, 3);
    assert_eq!(embedder.requests(), 1);
    assert_eq!(embedder.texts_seen(), 3);
}

#[tokio::test]
async fn test_directory_ingest_reports_summary() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("a.txt"), "Alpha is the first letter.").expect("write");
    fs::write(dir.path().join("b.md"), "Beta is the second letter.").expect("write");
    fs::write(dir.path().join("c.pdf"), "not loadable").expect("write");
    fs::create_dir(dir.path().join("nested")).expect("mkdir");
    fs::write(dir.path().join("nested/d.txt"), "Not visited.").expect("write");

    let retriever = offline_retriever(Arc::new(MockLLMClient::new("x")), memory_index("dir")).await;
    let (report, summary) = retriever
        .ingest_directory(dir.path())
        .await
        .expect("directory ingest should succeed");

    assert_eq!(summary.total_documents, 2);
    assert_eq!(summary.by_type.get("text"), Some(&2));
    assert_eq!(report.files_processed, 2);
    assert_eq!(report.files_failed, 0);
    assert_eq!(report.chunks_ingested, 2);

    let stats = retriever.get_stats().await.expect("stats available");
    assert_eq!(stats.points_count, 2);
}

#[tokio::test]
async fn test_content_hash_ids_make_reingest_idempotent() {
    let index = memory_index("hashed_ids").with_id_strategy(PointIdStrategy::ContentHash);
    let retriever = offline_retriever(Arc::new(MockLLMClient::new("x")), index).await;

    for _ in 0..3 {
        retriever
            .ingest(IngestRequest::from_texts(["Same sentence every time."]))
            .await
            .expect("ingest should succeed");
    }

    let stats = retriever.get_stats().await.expect("stats available");
    assert_eq!(stats.points_count, 1);
}

#[tokio::test]
async fn test_long_text_is_chunked_with_overlap() {
    let retriever = RagRetriever::new(
        DocumentProcessor::new(20, OverlapStrategy::Sentences(1), "gpt-3.5-turbo")
            .expect("tokenizer should load"),
        EmbeddingGateway::new(Arc::new(ragline::rag::HashedEmbedder::new(64))),
        memory_index("chunked"),
        Arc::new(MockLLMClient::new("x")),
        RetrieverOptions::default(),
    )
    .await
    .expect("retriever should build");

    let text = (1..=12)
        .map(|i| format!("Sentence number {} talks about chunking", i))
        .collect::<Vec<_>>()
        .join(". ");
    let report = retriever
        .ingest(IngestRequest::from_texts([text]))
        .await
        .expect("ingest should succeed");

    assert!(report.chunks_ingested > 1);
    let results = retriever
        .retrieve("chunking", Some(50), None)
        .await
        .expect("retrieve should succeed");
    for result in &results {
        assert!(retriever.processor().count_tokens(&result.text) <= 20);
    }
}
