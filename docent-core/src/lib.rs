//! # Docent Core
//!
//! Core library for the Docent retrieval-augmented question answering
//! pipeline. Provides the document loader, chunker, embedding providers,
//! in-memory vector index, answer synthesizer, configuration, and
//! fundamental types.

pub mod chunk;
pub mod config;
pub mod embedder;
pub mod error;
pub mod index;
pub mod loader;
pub mod pipeline;
pub mod synthesizer;
pub mod types;

// Re-export commonly used types at the crate root.
pub use chunk::{ChunkingStrategy, chunk_document};
pub use config::{
    DocentConfig, DocumentConfig, EmbeddingConfig, LlmConfig, RetrievalConfig, load_config,
};
pub use embedder::{Embedder, HashEmbedder, OllamaEmbedder, create_embedder};
pub use error::{
    ConfigError, DocentError, EmbedError, IndexError, LoadError, Result, SynthesisError,
};
pub use index::VectorIndex;
pub use loader::{DEFAULT_EXTENSIONS, DocumentLoader};
pub use pipeline::{BuildReport, RagPipeline};
pub use synthesizer::{
    BuiltPrompt, GenerativeModel, MockGenerator, OllamaGenerator, PromptBuilder,
};
pub use types::{Answer, Chunk, Document, RetrievalStats, ScoredChunk, SourceReference};
