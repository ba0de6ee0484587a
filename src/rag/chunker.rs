//! Token-bounded, sentence-based text chunking.
//!
//! Text is split into sentences, then sentences are packed greedily into
//! chunks whose exact token count (tiktoken BPE for the configured model)
//! stays within `chunk_size`. Consecutive chunks share a few trailing
//! sentences of overlap so context is not cut mid-thought.

use std::path::Path;
use std::sync::Arc;

use tiktoken_rs::CoreBPE;

use crate::rag::loader::LoaderRegistry;
use crate::types::{AppError, Chunk, Metadata, Result};
use crate::utils::config::ChunkingConfig;

/// How much of the previous chunk is carried into the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapStrategy {
    /// The last `n` sentences of the previous chunk.
    Sentences(usize),
    /// The longest run of trailing sentences that fits the token budget.
    Tokens(usize),
}

impl Default for OverlapStrategy {
    fn default() -> Self {
        OverlapStrategy::Sentences(2)
    }
}

/// A sentence with its token counts measured once.
#[derive(Debug, Clone)]
struct Sentence {
    text: String,
    /// Tokens when the sentence opens a chunk
    tokens: usize,
    /// Tokens when it follows another sentence after a single space
    joined: usize,
}

/// Token count of `sentences` joined with single spaces.
///
/// Every sentence ends with a period and the separator is one space, which
/// the BPE pretokenizer always splits on, so counts add up exactly.
fn span_tokens(sentences: &[Sentence]) -> usize {
    match sentences.split_first() {
        Some((first, rest)) => first.tokens + rest.iter().map(|s| s.joined).sum::<usize>(),
        None => 0,
    }
}

/// Splits documents into [`Chunk`]s.
#[derive(Clone)]
pub struct DocumentProcessor {
    chunk_size: usize,
    overlap: OverlapStrategy,
    bpe: Arc<CoreBPE>,
    loaders: LoaderRegistry,
}

impl std::fmt::Debug for DocumentProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentProcessor")
            .field("chunk_size", &self.chunk_size)
            .field("overlap", &self.overlap)
            .field("loaders", &self.loaders)
            .finish()
    }
}

impl DocumentProcessor {
    /// Create a processor using the tokenizer of `tokenizer_model`.
    pub fn new(chunk_size: usize, overlap: OverlapStrategy, tokenizer_model: &str) -> Result<Self> {
        if chunk_size == 0 {
            return Err(AppError::Configuration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }

        let bpe = tiktoken_rs::get_bpe_from_model(tokenizer_model).map_err(|e| {
            AppError::Configuration(format!(
                "no tokenizer available for model '{}': {}",
                tokenizer_model, e
            ))
        })?;

        tracing::debug!(chunk_size, ?overlap, tokenizer_model, "DocumentProcessor initialized");

        Ok(Self {
            chunk_size,
            overlap,
            bpe: Arc::new(bpe),
            loaders: LoaderRegistry::with_defaults(),
        })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(
            config.chunk_size,
            config.overlap_strategy(),
            &config.tokenizer_model,
        )
    }

    /// Replace the loader registry used by [`process_file`](Self::process_file).
    pub fn with_loaders(mut self, loaders: LoaderRegistry) -> Self {
        self.loaders = loaders;
        self
    }

    pub fn loaders(&self) -> &LoaderRegistry {
        &self.loaders
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> OverlapStrategy {
        self.overlap
    }

    /// Exact token count of `text` under the configured tokenizer.
    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    /// Split `text` into chunks, each carrying a copy of `metadata`.
    pub fn chunk(&self, text: &str, metadata: &Metadata) -> Vec<Chunk> {
        if text.trim().is_empty() {
            tracing::warn!("Empty text provided for chunking");
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut current: Vec<Sentence> = Vec::new();
        let mut current_tokens = 0;

        for sentence in split_sentences(text).into_iter().map(|s| self.measure(s)) {
            if current.is_empty() {
                current_tokens = sentence.tokens;
                current.push(sentence);
                continue;
            }

            if current_tokens + sentence.joined <= self.chunk_size {
                current_tokens += sentence.joined;
                current.push(sentence);
                continue;
            }

            chunks.push(make_chunk(&current, current_tokens, metadata));

            let mut next = self.overlap_seed(&current);
            let mut next_tokens = span_tokens(&next);
            while !next.is_empty() && next_tokens + sentence.joined > self.chunk_size {
                next.remove(0);
                next_tokens = span_tokens(&next);
            }
            current_tokens = if next.is_empty() {
                sentence.tokens
            } else {
                next_tokens + sentence.joined
            };
            next.push(sentence);
            current = next;
        }

        if !current.is_empty() {
            chunks.push(make_chunk(&current, current_tokens, metadata));
        }

        tracing::debug!(chunks = chunks.len(), "Text chunked");
        chunks
    }

    /// Load a file through the registry and chunk it with the loader's metadata.
    pub fn process_file(&self, path: &Path) -> Result<Vec<Chunk>> {
        let document = self.loaders.load(path)?;
        let chunks = self.chunk(&document.content, &document.metadata);

        tracing::info!(file = %path.display(), chunks = chunks.len(), "Processed file");
        Ok(chunks)
    }

    fn measure(&self, text: String) -> Sentence {
        let tokens = self.count_tokens(&text);
        let joined = self.count_tokens(&format!(" {}", text));
        Sentence {
            text,
            tokens,
            joined,
        }
    }

    fn overlap_seed(&self, previous: &[Sentence]) -> Vec<Sentence> {
        match self.overlap {
            OverlapStrategy::Sentences(n) => {
                let start = previous.len().saturating_sub(n);
                previous[start..].to_vec()
            }
            OverlapStrategy::Tokens(budget) => {
                // Tokens of previous[start..] when preceded by another sentence
                let mut tail_joined = 0;
                let mut start = previous.len();
                while start > 0 && previous[start - 1].tokens + tail_joined <= budget {
                    tail_joined += previous[start - 1].joined;
                    start -= 1;
                }
                previous[start..].to_vec()
            }
        }
    }
}

fn make_chunk(sentences: &[Sentence], token_count: usize, metadata: &Metadata) -> Chunk {
    let text = sentences
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Chunk {
        text,
        token_count,
        metadata: metadata.clone(),
    }
}

/// Sentence split on `". "` after folding line breaks into spaces.
///
/// Every returned sentence is trimmed, non-empty and ends with a period.
pub fn split_sentences(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", " ").replace('\n', " ");

    normalized
        .split(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.ends_with('.') {
                s.to_string()
            } else {
                format!("{}.", s)
            }
        })
        .collect()
}
