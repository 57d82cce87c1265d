//! Error types for the Docent pipeline.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering document loading, embedding, indexing, synthesis, and
//! configuration. Every failure surfaces to the caller; nothing is
//! swallowed into a degraded answer.

use std::path::PathBuf;

/// Top-level error type for the Docent core library.
#[derive(Debug, thiserror::Error)]
pub enum DocentError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Embedding error: {0}")]
    Embed(#[from] EmbedError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the document loader.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Document directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

/// Errors from embedding backends.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("Embedding model unavailable: {message}")]
    ModelUnavailable { message: String },

    #[error("Embedding response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Embedding backend returned an empty vector for non-empty input")]
    EmptyEmbedding,
}

/// Errors from the vector index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Index has not been built yet")]
    EmptyIndex,

    #[error("Index has already been built; rebuilding requires a new instance")]
    AlreadyBuilt,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Errors from the answer synthesizer.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("Generative model unavailable: {message}")]
    ModelUnavailable { message: String },

    #[error("Generation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Generation response parse error: {message}")]
    ResponseParse { message: String },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown provider: {provider}")]
    UnknownProvider { provider: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// A type alias for results using the top-level `DocentError`.
pub type Result<T> = std::result::Result<T, DocentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_load() {
        let err = DocentError::Load(LoadError::DirectoryNotFound {
            path: PathBuf::from("/tmp/missing"),
        });
        assert_eq!(
            err.to_string(),
            "Load error: Document directory not found: /tmp/missing"
        );
    }

    #[test]
    fn test_error_display_embed() {
        let err = DocentError::Embed(EmbedError::ModelUnavailable {
            message: "connection refused".into(),
        });
        assert_eq!(
            err.to_string(),
            "Embedding error: Embedding model unavailable: connection refused"
        );
    }

    #[test]
    fn test_error_display_index() {
        let err = DocentError::Index(IndexError::EmptyIndex);
        assert_eq!(err.to_string(), "Index error: Index has not been built yet");

        let err = DocentError::Index(IndexError::DimensionMismatch {
            expected: 384,
            actual: 768,
        });
        assert_eq!(
            err.to_string(),
            "Index error: Dimension mismatch: expected 384, got 768"
        );
    }

    #[test]
    fn test_error_display_synthesis() {
        let err = DocentError::Synthesis(SynthesisError::Timeout { timeout_secs: 120 });
        assert_eq!(
            err.to_string(),
            "Synthesis error: Generation timed out after 120s"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = DocentError::Config(ConfigError::UnknownProvider {
            provider: "bedrock".into(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Unknown provider: bedrock"
        );

        let err = DocentError::Config(ConfigError::ParseError {
            message: "invalid type: string \"lots\"".into(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Configuration parse error: invalid type: string \"lots\""
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DocentError = io_err.into();
        assert!(matches!(err, DocentError::Io(_)));
    }

    #[test]
    fn test_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: DocentError = serde_err.into();
        assert!(matches!(err, DocentError::Serialization(_)));
    }
}
