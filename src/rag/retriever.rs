//! Retrieve-then-generate orchestration.
//!
//! [`RagRetriever`] owns one of each pipeline component and runs the two
//! flows end to end:
//!
//! ```text
//! ingest: files/texts -> chunker -> embed_batch -> upsert
//! query:  question -> embed_one -> search -> prompt -> LLM -> answer
//! ```
//!
//! The target collection is created when the retriever is constructed, so a
//! freshly built retriever is immediately usable.

use std::path::Path;
use std::sync::Arc;

use crate::db::filter::MetadataFilter;
use crate::db::index::VectorIndex;
use crate::db::vectorstore::{DistanceMetric, VectorStore, VectorStoreProvider};
use crate::llm::{LLMClient, Provider};
use crate::rag::chunker::DocumentProcessor;
use crate::rag::embeddings::EmbeddingGateway;
use crate::rag::loader::{DocumentSummary, LoaderRegistry};
use crate::rag::prompt::{build_user_prompt, DEFAULT_SYSTEM_PROMPT, NO_CONTEXT_ANSWER};
use crate::types::{
    Chunk, CollectionInfo, IngestReport, IngestRequest, Metadata, QueryResponse, Result,
    SearchResult,
};
use crate::utils::config::RagConfig;

/// Retrieval settings that are not owned by a component.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrieverOptions {
    /// Results per query when the caller does not pass `top_k`
    pub top_k: usize,
    /// Overrides [`DEFAULT_SYSTEM_PROMPT`]
    pub system_prompt: Option<String>,
    /// Metric used if the collection has to be created
    pub distance: DistanceMetric,
}

impl Default for RetrieverOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            system_prompt: None,
            distance: DistanceMetric::Cosine,
        }
    }
}

impl RetrieverOptions {
    pub fn from_config(config: &RagConfig) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            system_prompt: config.retrieval.system_prompt.clone(),
            distance: config.vector_store.distance,
        }
    }
}

pub struct RagRetriever {
    processor: DocumentProcessor,
    embeddings: EmbeddingGateway,
    index: VectorIndex,
    llm: Arc<dyn LLMClient>,
    options: RetrieverOptions,
}

impl RagRetriever {
    /// Assemble a retriever and make sure its collection exists.
    pub async fn new(
        processor: DocumentProcessor,
        embeddings: EmbeddingGateway,
        index: VectorIndex,
        llm: Arc<dyn LLMClient>,
        options: RetrieverOptions,
    ) -> Result<Self> {
        index
            .create_collection(embeddings.dimensions(), options.distance)
            .await?;

        tracing::info!(collection = index.collection(), "RAG retriever initialized");

        Ok(Self {
            processor,
            embeddings,
            index,
            llm,
            options,
        })
    }

    /// Build every component from configuration.
    pub async fn from_config(config: &RagConfig) -> Result<Self> {
        let processor = DocumentProcessor::from_config(&config.chunking)?;
        let embeddings = EmbeddingGateway::from_config(config)?;

        let store: Arc<dyn VectorStore> =
            Arc::from(VectorStoreProvider::from_config(config)?.create_store().await?);
        let index = VectorIndex::new(store, config.vector_store.collection.clone())
            .with_id_strategy(config.vector_store.point_ids);

        let llm: Arc<dyn LLMClient> = Arc::from(Provider::from_config(config)?.create_client()?);

        Self::new(
            processor,
            embeddings,
            index,
            llm,
            RetrieverOptions::from_config(config),
        )
        .await
    }

    /// Replace the loader registry used for file ingestion.
    pub fn with_loaders(mut self, loaders: LoaderRegistry) -> Self {
        self.processor = self.processor.with_loaders(loaders);
        self
    }

    pub fn processor(&self) -> &DocumentProcessor {
        &self.processor
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn options(&self) -> &RetrieverOptions {
        &self.options
    }

    /// Chunk, embed and store files and raw texts.
    ///
    /// A file that cannot be processed is logged, counted in
    /// `files_failed` and left out; it does not fail the call. All chunks
    /// go to the embedding provider in one batch and to the store in one
    /// upsert.
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let mut chunks: Vec<Chunk> = Vec::new();

        for path in &request.file_paths {
            match self.processor.process_file(path) {
                Ok(file_chunks) => {
                    report.files_processed += 1;
                    chunks.extend(file_chunks);
                }
                Err(e) => {
                    report.files_failed += 1;
                    tracing::error!(file = %path.display(), error = %e, "Failed to process file");
                }
            }
        }

        if request.metadata.len() > request.texts.len() {
            tracing::warn!(
                texts = request.texts.len(),
                metadata = request.metadata.len(),
                "Ignoring metadata entries without a matching text"
            );
        }

        let empty = Metadata::new();
        for (i, text) in request.texts.iter().enumerate() {
            let metadata = request.metadata.get(i).unwrap_or(&empty);
            chunks.extend(self.processor.chunk(text, metadata));
            report.texts_processed += 1;
        }

        report.chunks_ingested = self.store_chunks(chunks).await?;
        Ok(report)
    }

    /// Ingest every supported file directly inside `dir`.
    pub async fn ingest_directory(&self, dir: &Path) -> Result<(IngestReport, DocumentSummary)> {
        let loaded = self.processor.loaders().load_directory(dir);
        let summary = LoaderRegistry::summarize(&loaded.documents);

        let mut chunks = Vec::new();
        for document in &loaded.documents {
            chunks.extend(self.processor.chunk(&document.content, &document.metadata));
        }

        let report = IngestReport {
            files_processed: loaded.documents.len(),
            files_failed: loaded.failed,
            chunks_ingested: self.store_chunks(chunks).await?,
            ..Default::default()
        };
        Ok((report, summary))
    }

    async fn store_chunks(&self, chunks: Vec<Chunk>) -> Result<usize> {
        if chunks.is_empty() {
            tracing::warn!("No documents to ingest");
            return Ok(0);
        }

        let (texts, metadata): (Vec<String>, Vec<Metadata>) =
            chunks.into_iter().map(|c| (c.text, c.metadata)).unzip();

        let vectors = self.embeddings.embed_batch(&texts).await?;
        let count = self.index.upsert(&texts, &vectors, Some(&metadata)).await?;

        tracing::info!(chunks = count, "Ingested chunks");
        Ok(count)
    }

    /// Chunks most similar to `query`.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: Option<usize>,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>> {
        let top_k = top_k.unwrap_or(self.options.top_k);
        let query_vector = self.embeddings.embed_one(query).await?;
        let results = self.index.search(&query_vector, top_k, filter).await?;

        tracing::info!(count = results.len(), top_k, "Retrieved documents");
        Ok(results)
    }

    /// Ask the LLM to answer `query` from `context`.
    pub async fn generate_response(
        &self,
        query: &str,
        context: &[SearchResult],
        system_prompt: Option<&str>,
    ) -> Result<String> {
        let system = system_prompt
            .or(self.options.system_prompt.as_deref())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let user_prompt = build_user_prompt(query, context);

        let answer = self.llm.generate_with_system(system, &user_prompt).await?;
        tracing::info!(sources = context.len(), "Generated response");
        Ok(answer)
    }

    /// Retrieve, then answer. An empty retrieval short-circuits to a fixed
    /// answer without calling the LLM.
    pub async fn query(
        &self,
        question: &str,
        top_k: Option<usize>,
        filter: Option<&MetadataFilter>,
    ) -> Result<QueryResponse> {
        let sources = self.retrieve(question, top_k, filter).await?;

        if sources.is_empty() {
            return Ok(QueryResponse {
                answer: NO_CONTEXT_ANSWER.to_string(),
                sources: Vec::new(),
                query: question.to_string(),
                num_sources: 0,
            });
        }

        let answer = self.generate_response(question, &sources, None).await?;
        Ok(QueryResponse {
            answer,
            num_sources: sources.len(),
            sources,
            query: question.to_string(),
        })
    }

    /// Statistics for the collection, or `None` if they are unavailable.
    pub async fn get_stats(&self) -> Option<CollectionInfo> {
        self.index.get_collection_info().await
    }
}
