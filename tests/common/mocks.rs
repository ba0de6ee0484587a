//! Mock implementations for testing.
//!
//! Hand-written doubles shared by the integration tests. Unit tests inside
//! the crate use the `mockall` automocks instead.

use async_trait::async_trait;
use parking_lot::Mutex;
use ragline::rag::EmbeddingProvider;
use ragline::types::{AppError, Result};
use ragline::LLMClient;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock LLM client with a canned answer.
///
/// Every call records the system and user prompt so tests can assert on
/// what the pipeline sent.
///
/// ```ignore
/// let client = MockLLMClient::new("Machine learning is a subset of AI.");
/// let client = MockLLMClient::failing();
/// ```
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            should_fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// User prompt of the most recent call
    pub fn last_prompt(&self) -> Option<String> {
        self.calls.lock().last().map(|(_, prompt)| prompt.clone())
    }

    /// System prompt of the most recent call
    pub fn last_system(&self) -> Option<String> {
        self.calls.lock().last().map(|(system, _)| system.clone())
    }

    fn record(&self, system: &str, prompt: &str) -> Result<String> {
        self.calls.lock().push((system.to_string(), prompt.to_string()));
        if self.should_fail {
            return Err(AppError::GenerationProvider("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.record(system, prompt)
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Embedding provider that returns a fixed vector per text and counts
/// requests, for asserting batching behavior.
pub struct CountingEmbedder {
    dimensions: usize,
    requests: AtomicUsize,
    texts_seen: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            requests: AtomicUsize::new(0),
            texts_seen: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn texts_seen(&self) -> usize {
        self.texts_seen.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.texts_seen.fetch_add(texts.len(), Ordering::SeqCst);

        let mut vector = vec![0.0; self.dimensions];
        vector[0] = 1.0;
        Ok(texts.iter().map(|_| vector.clone()).collect())
    }

    fn model_name(&self) -> &str {
        "counting"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
