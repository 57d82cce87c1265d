//! Fundamental types shared across the pipeline stages.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A loaded document: raw text plus its source path.
///
/// Immutable once loaded; the loader produces owned documents and the
/// pipeline consumes them during index construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Stable identifier derived from the source path, relative to the
    /// document directory (forward slashes on all platforms).
    pub id: String,
    /// Absolute or caller-relative path the text was read from.
    pub source: PathBuf,
    /// Raw UTF-8 text content.
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, source: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            text: text.into(),
        }
    }
}

/// A bounded-length slice of a document, the unit of embedding and retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub source: PathBuf,
    pub text: String,
    pub chunk_index: usize,
}

/// A search hit: a borrowed view of an indexed chunk with its similarity score.
#[derive(Debug, Clone, Copy)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub score: f32,
}

/// Reference to a source chunk that contributed to an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReference {
    pub document_id: String,
    pub chunk_id: String,
    pub source: PathBuf,
    pub score: f32,
    pub excerpt: String,
}

/// Statistics about one retrieval pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalStats {
    /// Chunks returned by the index search.
    pub chunks_retrieved: usize,
    /// Chunks that survived score filtering and fit the context budget.
    pub chunks_used: usize,
    pub retrieval_time_ms: u64,
}

/// The synthesized answer with source attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SourceReference>,
    pub stats: RetrievalStats,
}

/// Truncate `text` to at most `max_chars` characters on a char boundary,
/// appending an ellipsis when anything was cut.
pub(crate) fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}
