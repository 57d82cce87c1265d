//! In-memory vector index with linear-scan cosine search.
//!
//! A linear scan is a deliberate choice: the target corpus is a local,
//! single-user document directory, where exact nearest-neighbor search is
//! affordable and an approximate index would add complexity without recall
//! benefit at this scale.
//!
//! The index is a two-state machine: Unbuilt (accepts [`VectorIndex::build`])
//! and Ready (accepts [`VectorIndex::search`]). The transition happens once;
//! rebuilding requires a new instance. After `build` the index is read-only,
//! so concurrent searches need no locking.

use crate::error::IndexError;
use crate::types::{Chunk, ScoredChunk};
use tracing::debug;

struct IndexEntry {
    chunk: Chunk,
    /// Unit-length vector; cosine similarity reduces to a dot product.
    vector: Vec<f32>,
}

/// Vector index over (embedding, chunk) pairs.
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
    built: bool,
}

impl Default for VectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorIndex {
    /// Create an empty, unbuilt index.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            dimensions: 0,
            built: false,
        }
    }

    /// Consume all (chunk, embedding) pairs and transition to Ready.
    ///
    /// All embeddings must share one dimensionality. Building twice fails
    /// with [`IndexError::AlreadyBuilt`]; building from zero pairs succeeds
    /// and yields an index whose searches return empty results.
    pub fn build(&mut self, pairs: Vec<(Chunk, Vec<f32>)>) -> Result<(), IndexError> {
        if self.built {
            return Err(IndexError::AlreadyBuilt);
        }

        let mut dimensions = 0;
        let mut entries = Vec::with_capacity(pairs.len());
        for (chunk, vector) in pairs {
            if dimensions == 0 {
                dimensions = vector.len();
            } else if vector.len() != dimensions {
                return Err(IndexError::DimensionMismatch {
                    expected: dimensions,
                    actual: vector.len(),
                });
            }
            entries.push(IndexEntry {
                chunk,
                vector: normalize(vector),
            });
        }

        debug!(entries = entries.len(), dimensions, "Vector index built");
        self.entries = entries;
        self.dimensions = dimensions;
        self.built = true;
        Ok(())
    }

    /// Return the `k` most similar entries to `query`, best first.
    ///
    /// Ties keep insertion order (the sort is stable). Fails with
    /// [`IndexError::EmptyIndex`] before `build`; an index built over zero
    /// entries returns an empty Vec instead.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk<'_>>, IndexError> {
        if !self.built {
            return Err(IndexError::EmptyIndex);
        }
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let query = normalize(query.to_vec());
        let mut scored: Vec<ScoredChunk<'_>> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: &entry.chunk,
                score: dot(&query, &entry.vector),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `build` has completed.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Dimensionality of the indexed vectors (0 before build or when empty).
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}
