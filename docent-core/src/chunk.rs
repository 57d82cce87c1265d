//! Document chunking.
//!
//! Embedding models bound their input length, so documents are split into
//! bounded chunks before embedding. The policy is explicit and configurable
//! rather than delegated to backend-side truncation.

use crate::types::{Chunk, Document};
use serde::{Deserialize, Serialize};

/// Chunking strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChunkingStrategy {
    /// Fixed character window with overlap between consecutive chunks.
    FixedSize { chunk_size: usize, overlap: usize },
    /// Group whole sentences, up to `max_sentences` per chunk, repeating the
    /// trailing `overlap_sentences` at the start of the next chunk.
    Sentence {
        max_sentences: usize,
        overlap_sentences: usize,
    },
}

impl Default for ChunkingStrategy {
    fn default() -> Self {
        Self::FixedSize {
            chunk_size: 512,
            overlap: 64,
        }
    }
}

/// Split a document into chunks using the given strategy.
///
/// A document at or under the size limit yields exactly one chunk; empty or
/// whitespace-only documents yield none.
pub fn chunk_document(document: &Document, strategy: &ChunkingStrategy) -> Vec<Chunk> {
    if document.text.trim().is_empty() {
        return Vec::new();
    }
    match strategy {
        ChunkingStrategy::FixedSize { chunk_size, overlap } => {
            chunk_fixed(document, (*chunk_size).max(1), *overlap)
        }
        ChunkingStrategy::Sentence {
            max_sentences,
            overlap_sentences,
        } => chunk_sentences(document, (*max_sentences).max(1), *overlap_sentences),
    }
}

fn make_chunk(document: &Document, index: usize, text: String) -> Chunk {
    Chunk {
        id: format!("{}#{}", document.id, index),
        document_id: document.id.clone(),
        source: document.source.clone(),
        text,
        chunk_index: index,
    }
}

fn chunk_fixed(document: &Document, size: usize, overlap: usize) -> Vec<Chunk> {
    // Overlap must leave forward progress.
    let overlap = overlap.min(size.saturating_sub(1));
    let chars: Vec<char> = document.text.chars().collect();

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + size).min(chars.len());
        let text: String = chars[start..end].iter().collect();
        chunks.push(make_chunk(document, chunks.len(), text));
        if end == chars.len() {
            break;
        }
        start = end - overlap;
    }
    chunks
}

fn chunk_sentences(document: &Document, max_sentences: usize, overlap: usize) -> Vec<Chunk> {
    let overlap = overlap.min(max_sentences.saturating_sub(1));
    let sentences: Vec<&str> = document
        .text
        .split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.is_empty() {
        // No sentence punctuation at all; emit the whole text as one chunk.
        return vec![make_chunk(document, 0, document.text.trim().to_string())];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < sentences.len() {
        let end = (start + max_sentences).min(sentences.len());
        let text = sentences[start..end].join(" ");
        chunks.push(make_chunk(document, chunks.len(), text));
        if end == sentences.len() {
            break;
        }
        start = end - overlap;
    }
    chunks
}
