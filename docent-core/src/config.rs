//! Configuration system for Docent.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> environment. Configuration is loaded from
//! `~/.config/docent/config.toml` and/or `.docent/config.toml` in the
//! workspace directory, with `DOCENT_`-prefixed environment variables
//! (nested with `__`, e.g. `DOCENT_LLM__MODEL`) taking precedence.

use crate::chunk::ChunkingStrategy;
use crate::error::ConfigError;
use crate::loader::DEFAULT_EXTENSIONS;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the Docent pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocentConfig {
    pub documents: DocumentConfig,
    #[serde(default)]
    pub chunking: ChunkingStrategy,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
}

/// Document source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Directory of text documents to index.
    pub data_dir: PathBuf,
    /// File extensions (lowercase, no dot) treated as documents.
    pub extensions: Vec<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Embedding backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider name: "ollama" or "hash" (local, offline).
    pub provider: String,
    /// Provider-specific model name (None = provider default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Vector dimensions for the hash provider (0 = provider default).
    #[serde(default)]
    pub dimensions: usize,
    /// Base URL of the embedding service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: None,
            dimensions: 0,
            base_url: None,
        }
    }
}

/// Generative model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier served by the local inference server.
    pub model: String,
    /// Base URL of the generative service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens to generate per answer.
    pub max_tokens: usize,
    /// Request timeout in seconds; exceeding it is a Timeout error.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "llama3.2:3b".to_string(),
            base_url: None,
            temperature: 0.7,
            max_tokens: 1024,
            timeout_secs: 120,
        }
    }
}

/// Retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve per query.
    pub top_k: usize,
    /// Minimum similarity score for a chunk to be used as context.
    pub min_score: f32,
    /// Character budget for the assembled context block.
    pub max_context_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            min_score: 0.0,
            max_context_chars: 6000,
        }
    }
}

impl DocentConfig {
    /// Validate this config and return any warnings.
    ///
    /// Returns human-readable warnings for problematic values without
    /// failing the load.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.retrieval.top_k == 0 {
            warnings.push("retrieval.top_k is 0; every query will retrieve nothing".to_string());
        }
        if self.llm.temperature < 0.0 || self.llm.temperature > 2.0 {
            warnings.push(format!(
                "llm.temperature ({}) is outside the typical range 0.0-2.0",
                self.llm.temperature
            ));
        }
        if let ChunkingStrategy::FixedSize { chunk_size, overlap } = &self.chunking {
            if overlap >= chunk_size {
                warnings.push(format!(
                    "chunking.overlap ({overlap}) >= chunking.chunk_size ({chunk_size}); overlap will be clamped"
                ));
            }
        }
        if self.retrieval.min_score > 1.0 {
            warnings.push(format!(
                "retrieval.min_score ({}) exceeds the cosine similarity maximum of 1.0",
                self.retrieval.min_score
            ));
        }
        warnings
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `DOCENT_`)
/// 3. Workspace-local config (`.docent/config.toml`)
/// 4. User config (`~/.config/docent/config.toml`)
/// 5. Built-in defaults
///
/// A layer that cannot be parsed fails with [`ConfigError::ParseError`].
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&DocentConfig>,
) -> Result<DocentConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(DocentConfig::default()));

    if let Some(config_dir) = directories::ProjectDirs::from("dev", "docent", "docent") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = ws.join(".docent").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    figment = figment.merge(Env::prefixed("DOCENT_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = DocentConfig::default();
        assert_eq!(config.documents.data_dir, PathBuf::from("data"));
        assert_eq!(config.embedding.provider, "ollama");
        assert_eq!(config.llm.model, "llama3.2:3b");
        assert_eq!(config.llm.timeout_secs, 120);
        assert_eq!(config.retrieval.top_k, 4);
        assert!(matches!(
            config.chunking,
            ChunkingStrategy::FixedSize {
                chunk_size: 512,
                overlap: 64
            }
        ));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(DocentConfig::default().validate().is_empty());
    }

    #[test]
    fn test_validate_flags_bad_values() {
        let mut config = DocentConfig::default();
        config.retrieval.top_k = 0;
        config.llm.temperature = 3.5;
        config.chunking = ChunkingStrategy::FixedSize {
            chunk_size: 64,
            overlap: 64,
        };
        let warnings = config.validate();
        assert_eq!(warnings.len(), 3);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = DocentConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let restored: DocentConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(restored.llm.model, config.llm.model);
        assert_eq!(restored.retrieval.top_k, config.retrieval.top_k);
    }

    #[test]
    fn test_load_config_defaults_without_files() {
        let ws = tempfile::tempdir().unwrap();
        let config = load_config(Some(ws.path()), None).unwrap();
        assert_eq!(config.llm.model, DocentConfig::default().llm.model);
    }

    #[test]
    fn test_load_config_workspace_layer() {
        let ws = tempfile::tempdir().unwrap();
        let config_dir = ws.path().join(".docent");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            r#"
[llm]
model = "qwen2.5:7b"
temperature = 0.2
max_tokens = 512
timeout_secs = 30

[retrieval]
top_k = 2
min_score = 0.1
max_context_chars = 2000
"#,
        )
        .unwrap();

        let config = load_config(Some(ws.path()), None).unwrap();
        assert_eq!(config.llm.model, "qwen2.5:7b");
        assert_eq!(config.retrieval.top_k, 2);
        // Untouched sections keep their defaults.
        assert_eq!(config.embedding.provider, "ollama");
    }

    #[test]
    fn test_load_config_explicit_overrides_win() {
        let ws = tempfile::tempdir().unwrap();
        let mut overrides = DocentConfig::default();
        overrides.llm.model = "mistral:7b".to_string();
        let config = load_config(Some(ws.path()), Some(&overrides)).unwrap();
        assert_eq!(config.llm.model, "mistral:7b");
    }

    #[test]
    fn test_load_config_env_layer_overrides_workspace() {
        figment::Jail::expect_with(|jail| {
            jail.create_dir(".docent")?;
            jail.create_file(
                ".docent/config.toml",
                r#"
[llm]
model = "from-file"
"#,
            )?;
            jail.set_env("DOCENT_LLM__MODEL", "from-env");
            jail.set_env("DOCENT_RETRIEVAL__TOP_K", "7");

            let workspace = jail.directory().to_path_buf();
            let config = load_config(Some(&workspace), None)
                .map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(config.llm.model, "from-env");
            assert_eq!(config.retrieval.top_k, 7);
            // Sections untouched by file or env keep their defaults.
            assert_eq!(config.llm.temperature, DocentConfig::default().llm.temperature);
            Ok(())
        });
    }

    #[test]
    fn test_load_config_malformed_file_is_parse_error() {
        let ws = tempfile::tempdir().unwrap();
        let config_dir = ws.path().join(".docent");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            "[retrieval]\ntop_k = \"lots\"\n",
        )
        .unwrap();

        let err = load_config(Some(ws.path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
