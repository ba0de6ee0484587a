//! Prompt assembly for grounded answers.

use crate::types::SearchResult;

/// System prompt used when none is configured or passed explicitly.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. Answer the user's question based on the provided context.\n\
If the context doesn't contain relevant information, say so honestly.\n\
Always cite which document number(s) you're referencing.";

/// Answer returned by `query` when retrieval finds nothing.
pub const NO_CONTEXT_ANSWER: &str =
    "I couldn't find any relevant information to answer your question.";

/// Render retrieved chunks as numbered documents, best first.
///
/// Numbering is 1-based so the model can cite "Document 2".
pub fn build_context(context: &[SearchResult]) -> String {
    context
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "Document {} (score: {:.3}):\n{}",
                i + 1,
                result.score,
                result.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_user_prompt(query: &str, context: &[SearchResult]) -> String {
    format!(
        "Context:\n{}\n\nQuestion: {}\n\nPlease provide a detailed answer based on the context above.",
        build_context(context),
        query
    )
}
