//! OpenAI-compatible provider tests with mocked network responses.
//!
//! These tests use wiremock to stand in for the `/v1/embeddings` and
//! `/v1/chat/completions` endpoints and validate:
//! - Request shape (auth header, model, batched inputs)
//! - Response parsing, including out-of-order embedding indices
//! - Error mapping to the provider error variants
//! - A full ingest and query round trip over HTTP

#![cfg(feature = "openai")]

mod common;

use std::sync::Arc;

use common::memory_index;
use ragline::llm::openai::OpenAIClient;
use ragline::rag::{
    DocumentProcessor, EmbeddingGateway, EmbeddingProvider, OpenAIEmbedder, OverlapStrategy,
    RagRetriever, RetrieverOptions,
};
use ragline::types::AppError;
use ragline::{IngestRequest, LLMClient};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============= Helper Functions =============

/// Create a mock embeddings response; `vectors[i]` is reported at index `i`.
fn mock_embeddings_response(vectors: &[Vec<f32>]) -> serde_json::Value {
    let data: Vec<serde_json::Value> = vectors
        .iter()
        .enumerate()
        .map(|(i, v)| json!({ "object": "embedding", "index": i, "embedding": v }))
        .collect();

    json!({
        "object": "list",
        "data": data,
        "model": "text-embedding-3-small",
        "usage": { "prompt_tokens": 8, "total_tokens": 8 }
    })
}

/// Create a mock chat completion response
fn mock_chat_response(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gpt-3.5-turbo",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop",
            "logprobs": null
        }],
        "usage": { "prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49 }
    })
}

fn mock_error_response(message: &str) -> serde_json::Value {
    json!({
        "error": {
            "message": message,
            "type": "invalid_request_error",
            "param": null,
            "code": "invalid_api_key"
        }
    })
}

fn api_base(server: &MockServer) -> String {
    format!("{}/v1", server.uri())
}

// ============= Embeddings =============

#[tokio::test]
async fn test_embeddings_batch_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_string_contains("text-embedding-3-small"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(mock_embeddings_response(&[vec![1.0, 0.0], vec![0.0, 1.0]])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let embedder = OpenAIEmbedder::new(
        Some("test-key"),
        &api_base(&server),
        "text-embedding-3-small",
        2,
    );
    let gateway = EmbeddingGateway::new(Arc::new(embedder));

    let vectors = gateway
        .embed_batch(&["first".to_string(), "second".to_string()])
        .await
        .expect("embedding should succeed");

    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[tokio::test]
async fn test_embeddings_are_reordered_by_index() {
    let server = MockServer::start().await;
    let body = json!({
        "object": "list",
        "data": [
            { "object": "embedding", "index": 1, "embedding": [0.0, 1.0] },
            { "object": "embedding", "index": 0, "embedding": [1.0, 0.0] }
        ],
        "model": "text-embedding-3-small",
        "usage": { "prompt_tokens": 2, "total_tokens": 2 }
    });
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let embedder = OpenAIEmbedder::new(Some("k"), &api_base(&server), "text-embedding-3-small", 2);
    let vectors = embedder
        .embed(&["a".to_string(), "b".to_string()])
        .await
        .expect("embedding should succeed");

    assert_eq!(vectors[0], vec![1.0, 0.0]);
    assert_eq!(vectors[1], vec![0.0, 1.0]);
}

#[tokio::test]
async fn test_embeddings_count_mismatch_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mock_embeddings_response(&[vec![1.0, 0.0]])),
        )
        .mount(&server)
        .await;

    let embedder = OpenAIEmbedder::new(Some("k"), &api_base(&server), "text-embedding-3-small", 2);
    let gateway = EmbeddingGateway::new(Arc::new(embedder));

    let err = gateway
        .embed_batch(&["a".to_string(), "b".to_string()])
        .await
        .expect_err("short response must be rejected");
    assert!(matches!(err, AppError::EmbeddingProvider(_)));
}

#[tokio::test]
async fn test_embeddings_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(mock_error_response("Incorrect API key")),
        )
        .mount(&server)
        .await;

    let embedder = OpenAIEmbedder::new(Some("bad"), &api_base(&server), "text-embedding-3-small", 2);
    let gateway = EmbeddingGateway::new(Arc::new(embedder));

    let err = gateway
        .embed_one("hello")
        .await
        .expect_err("401 must surface");
    assert!(matches!(err, AppError::EmbeddingProvider(_)));
    assert!(err.to_string().contains("Incorrect API key"));
}

// ============= Chat =============

#[tokio::test]
async fn test_chat_with_system_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_string_contains("\"role\":\"system\""))
        .and(body_string_contains("Be brief."))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_chat_response("Hi there")))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAIClient::new(Some("test-key"), &api_base(&server), "gpt-3.5-turbo", 0.7);
    let answer = client
        .generate_with_system("Be brief.", "Say hello")
        .await
        .expect("chat should succeed");

    assert_eq!(answer, "Hi there");
    assert_eq!(client.model_name(), "gpt-3.5-turbo");
}

#[tokio::test]
async fn test_chat_without_choices_is_error() {
    let server = MockServer::start().await;
    let body = json!({
        "id": "chatcmpl-empty",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gpt-3.5-turbo",
        "choices": []
    });
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = OpenAIClient::new(Some("k"), &api_base(&server), "gpt-3.5-turbo", 0.7);
    let err = client
        .generate_with_system("Be brief.", "hello")
        .await
        .expect_err("no choices");
    assert!(matches!(err, AppError::GenerationProvider(_)));
}

#[tokio::test]
async fn test_chat_bad_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(mock_error_response("model not found")),
        )
        .mount(&server)
        .await;

    let client = OpenAIClient::new(None, &api_base(&server), "missing-model", 0.7);
    let err = client
        .generate_with_system("Be brief.", "hello")
        .await
        .expect_err("400 must surface");
    assert!(matches!(err, AppError::GenerationProvider(_)));
    assert!(err.to_string().contains("model not found"));
}

// ============= Full Round Trip =============

#[tokio::test]
async fn test_ingest_and_query_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_string_contains("Cats purr."))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_embeddings_response(&[
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_string_contains("Which animal purrs?"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(mock_embeddings_response(&[vec![0.9, 0.1, 0.0]])),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Question: Which animal purrs?"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mock_chat_response("Cats [Document 1].")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let base = api_base(&server);
    let retriever = RagRetriever::new(
        DocumentProcessor::new(1000, OverlapStrategy::default(), "gpt-3.5-turbo")
            .expect("tokenizer should load"),
        EmbeddingGateway::new(Arc::new(OpenAIEmbedder::new(
            Some("k"),
            &base,
            "text-embedding-3-small",
            3,
        ))),
        memory_index("http_docs"),
        Arc::new(OpenAIClient::new(Some("k"), &base, "gpt-3.5-turbo", 0.7)),
        RetrieverOptions::default(),
    )
    .await
    .expect("retriever should build");

    let report = retriever
        .ingest(IngestRequest::from_texts(["Cats purr.", "Dogs bark."]))
        .await
        .expect("ingest should succeed");
    assert_eq!(report.chunks_ingested, 2);

    let response = retriever
        .query("Which animal purrs?", Some(1), None)
        .await
        .expect("query should succeed");

    assert_eq!(response.answer, "Cats [Document 1].");
    assert_eq!(response.sources[0].text, "Cats purr.");
}
