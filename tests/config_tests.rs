//! Integration tests for TOML configuration
//!
//! These tests verify that configuration works end-to-end:
//! - Loading and validating files on disk
//! - Environment variable checks for provider credentials
//! - Building a working retriever from config alone

use std::fs;

use ragline::db::{DistanceMetric, PointIdStrategy};
use ragline::rag::OverlapStrategy;
use ragline::utils::config::{
    ConfigError, EmbeddingProviderKind, GenerationProviderKind, LogFormat, RagConfig,
    VectorStoreKind,
};
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("ragline.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

#[test]
fn test_load_full_config() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        r#"
[chunking]
chunk_size = 500
chunk_overlap = 50
overlap = "tokens"

[embedding]
provider = "ollama"
model = "nomic-embed-text"
dimensions = 768

[generation]
provider = "ollama"
model = "llama3.2"
temperature = 0.2

[vector_store]
provider = "qdrant"
url = "http://qdrant:6334"
collection = "handbook"
distance = "dot"
point_ids = "content-hash"

[retrieval]
top_k = 8
system_prompt = "Answer tersely."

[logging]
level = "debug"
format = "json"
"#,
    );

    let config = RagConfig::load(&path).expect("config should load");

    assert_eq!(config.chunking.overlap_strategy(), OverlapStrategy::Tokens(50));
    assert_eq!(config.embedding.provider, EmbeddingProviderKind::Ollama);
    assert_eq!(config.embedding.dimensions, 768);
    assert_eq!(config.embedding.resolved_api_base(), "http://localhost:11434/v1");
    assert_eq!(config.generation.provider, GenerationProviderKind::Ollama);
    assert_eq!(config.vector_store.provider, VectorStoreKind::Qdrant);
    assert_eq!(config.vector_store.distance, DistanceMetric::Dot);
    assert_eq!(config.vector_store.point_ids, PointIdStrategy::ContentHash);
    assert_eq!(config.retrieval.top_k, 8);
    assert_eq!(config.retrieval.system_prompt.as_deref(), Some("Answer tersely."));
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let err = RagConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));
}

#[test]
fn test_malformed_toml() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "[chunking\nchunk_size = ");
    let err = RagConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn test_overlap_not_smaller_than_chunk_size() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        "[chunking]\nchunk_size = 100\nchunk_overlap = 100\noverlap = \"tokens\"\n",
    );
    let err = RagConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn test_small_chunk_size_in_sentences_mode() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "[chunking]\nchunk_size = 100\n");

    let config = RagConfig::load(&path).expect("sentence overlap ignores chunk_overlap");
    assert_eq!(config.chunking.chunk_size, 100);
}

#[test]
fn test_written_defaults_load_back() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let rendered = RagConfig::default().to_toml().expect("render");
    let path = write_config(&dir, &rendered);

    assert_eq!(RagConfig::load(&path).expect("load"), RagConfig::default());
}

#[test]
fn test_validate_env_names_missing_variable() {
    let mut config = RagConfig::default();
    config.embedding.api_key_env = "RAGLINE_IT_MISSING_EMBED_KEY".to_string();

    let err = config.validate_env().unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(ref name) if name == "RAGLINE_IT_MISSING_EMBED_KEY"));
}

#[test]
fn test_validate_env_passes_when_set() {
    std::env::set_var("RAGLINE_IT_PRESENT_KEY", "sk-test");

    let mut config = RagConfig::default();
    config.embedding.api_key_env = "RAGLINE_IT_PRESENT_KEY".to_string();
    config.generation.api_key_env = "RAGLINE_IT_PRESENT_KEY".to_string();

    assert!(config.validate_env().is_ok());
    assert_eq!(
        config.embedding_api_key().expect("key resolves").as_deref(),
        Some("sk-test")
    );
}

#[test]
fn test_offline_config_needs_no_env() {
    let mut config = RagConfig::default();
    config.embedding.provider = EmbeddingProviderKind::Hashed;
    config.generation.provider = GenerationProviderKind::Ollama;
    config.vector_store.provider = VectorStoreKind::Memory;
    config.embedding.api_key_env = "RAGLINE_IT_NEVER_SET".to_string();
    config.generation.api_key_env = "RAGLINE_IT_NEVER_SET".to_string();

    assert!(config.validate_env().is_ok());
}

#[cfg(feature = "openai")]
#[tokio::test]
async fn test_retriever_from_offline_config() {
    use ragline::{IngestRequest, RagRetriever};

    let config = RagConfig::from_toml(
        r#"
[embedding]
provider = "hashed"
dimensions = 32

[generation]
provider = "ollama"

[vector_store]
provider = "memory"
collection = "from_config"
"#,
    )
    .expect("config should parse");

    let retriever = RagRetriever::from_config(&config)
        .await
        .expect("retriever should build");
    assert_eq!(retriever.index().collection(), "from_config");

    let report = retriever
        .ingest(IngestRequest::from_texts(["Config drives every component."]))
        .await
        .expect("ingest should succeed");
    assert_eq!(report.chunks_ingested, 1);

    let stats = retriever.get_stats().await.expect("stats available");
    assert_eq!(stats.points_count, 1);
}
