//! End-to-end pipeline orchestration.
//!
//! Wires the loader, chunker, embedder, vector index, and synthesizer into
//! the two-phase flow: `build` (load -> chunk -> embed-all -> index) runs
//! once, then `query` (embed -> search -> prompt -> generate) any number of
//! times against the read-only index.

use crate::chunk::chunk_document;
use crate::config::DocentConfig;
use crate::embedder::Embedder;
use crate::error::{DocentError, Result};
use crate::index::VectorIndex;
use crate::loader::DocumentLoader;
use crate::synthesizer::{GenerativeModel, PromptBuilder};
use crate::types::{Answer, RetrievalStats, ScoredChunk, SourceReference, excerpt};
use std::time::Instant;
use tracing::{debug, info};

/// Characters of a chunk shown in a source reference.
const EXCERPT_CHARS: usize = 160;

/// Summary of one index build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub documents: usize,
    pub chunks: usize,
    pub dimensions: usize,
    pub elapsed_ms: u64,
}

/// The retrieval-augmented generation pipeline.
///
/// Starts Unbuilt; [`RagPipeline::build`] transitions it to Ready exactly
/// once. Querying before the build fails with an EmptyIndex error and never
/// returns partial results.
pub struct RagPipeline {
    config: DocentConfig,
    embedder: Box<dyn Embedder>,
    generator: Box<dyn GenerativeModel>,
    index: VectorIndex,
}

impl RagPipeline {
    /// Create an unbuilt pipeline from explicit components.
    pub fn new(
        config: DocentConfig,
        embedder: Box<dyn Embedder>,
        generator: Box<dyn GenerativeModel>,
    ) -> Self {
        Self {
            config,
            embedder,
            generator,
            index: VectorIndex::new(),
        }
    }

    /// Whether the index has been built.
    pub fn is_ready(&self) -> bool {
        self.index.is_built()
    }

    /// Load the document directory, chunk and embed every document, and
    /// build the vector index.
    pub async fn build(&mut self) -> Result<BuildReport> {
        let started = Instant::now();

        let loader = DocumentLoader::new(self.config.documents.extensions.clone());
        let documents = loader.load(&self.config.documents.data_dir)?;
        let document_count = documents.len();

        let chunks: Vec<_> = documents
            .iter()
            .flat_map(|doc| chunk_document(doc, &self.config.chunking))
            .collect();
        debug!(
            documents = document_count,
            chunks = chunks.len(),
            "Chunked corpus"
        );

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let pairs: Vec<_> = chunks.into_iter().zip(embeddings).collect();
        let chunk_count = pairs.len();
        self.index.build(pairs)?;

        let report = BuildReport {
            documents: document_count,
            chunks: chunk_count,
            dimensions: self.index.dimensions(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            documents = report.documents,
            chunks = report.chunks,
            dimensions = report.dimensions,
            elapsed_ms = report.elapsed_ms,
            model = self.embedder.model_id(),
            "Index built"
        );
        Ok(report)
    }

    /// Answer a question using the configured `top_k`.
    pub async fn query(&self, question: &str) -> Result<Answer> {
        self.query_with_k(question, self.config.retrieval.top_k).await
    }

    /// Answer a question, retrieving up to `k` chunks as context.
    pub async fn query_with_k(&self, question: &str, k: usize) -> Result<Answer> {
        let retrieval_started = Instant::now();

        let query_embedding = self.embedder.embed(question).await?;
        let hits = self.index.search(&query_embedding, k)?;
        let chunks_retrieved = hits.len();

        let min_score = self.config.retrieval.min_score;
        let relevant: Vec<ScoredChunk<'_>> =
            hits.into_iter().filter(|h| h.score >= min_score).collect();

        let prompt = PromptBuilder::new(self.config.retrieval.max_context_chars)
            .build(question, &relevant);
        let retrieval_time_ms = retrieval_started.elapsed().as_millis() as u64;
        debug!(
            chunks_retrieved,
            chunks_used = prompt.chunk_ids.len(),
            truncated = prompt.truncated,
            retrieval_time_ms,
            "Retrieved context"
        );

        let text = self.generator.complete(&prompt.text).await.map_err(DocentError::from)?;

        let sources = relevant
            .iter()
            .filter(|h| prompt.chunk_ids.contains(&h.chunk.id))
            .map(|h| SourceReference {
                document_id: h.chunk.document_id.clone(),
                chunk_id: h.chunk.id.clone(),
                source: h.chunk.source.clone(),
                score: h.score,
                excerpt: excerpt(&h.chunk.text, EXCERPT_CHARS),
            })
            .collect::<Vec<_>>();

        Ok(Answer {
            text,
            stats: RetrievalStats {
                chunks_retrieved,
                chunks_used: sources.len(),
                retrieval_time_ms,
            },
            sources,
        })
    }
}
