//! Pluggable embedding providers.
//!
//! Provides a trait-based abstraction over embedding backends, with a local
//! hash embedder (always available, deterministic, no network) and an Ollama
//! API embedder. Backend failures propagate as errors; a missing model never
//! degrades silently into a zero vector.

use crate::config::EmbeddingConfig;
use crate::error::{ConfigError, EmbedError};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Trait for embedding providers.
///
/// Embeddings are deterministic for identical input and model configuration,
/// and every vector from one provider instance has the same length.
#[async_trait]
pub trait Embedder: Send + Sync + std::fmt::Debug {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Embed a batch of texts, in order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Dimensionality of the produced vectors.
    fn dimensions(&self) -> usize;

    /// Model identifier for this provider instance.
    fn model_id(&self) -> &str;
}

/// Local hash embedder: term-frequency vectors via feature hashing,
/// L2-normalized. Deterministic and dependency-free, used as the offline
/// and test provider.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let lowered = text.to_lowercase();
        let mut tf: HashMap<&str, usize> = HashMap::new();
        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            *tf.entry(word).or_insert(0) += 1;
        }
        if tf.is_empty() {
            return vector;
        }

        for (term, count) in &tf {
            vector[term_bucket(term, self.dimensions)] += *count as f32;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

/// djb2 hash of a term, reduced to a dimension index.
fn term_bucket(term: &str, dimensions: usize) -> usize {
    let mut hash: usize = 5381;
    for b in term.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(b as usize);
    }
    hash % dimensions
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        Ok(self.embed_sync(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        "hash"
    }
}

/// Ollama embedding provider (local Ollama server, `/api/embed`).
#[derive(Debug)]
pub struct OllamaEmbedder {
    client: reqwest::Client,
    model: String,
    dimensions: usize,
    base_url: String,
}

impl OllamaEmbedder {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";

    pub fn new(model: Option<String>, base_url: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| "nomic-embed-text".to_string());
        let dimensions = match model.as_str() {
            "nomic-embed-text" => 768,
            "mxbai-embed-large" => 1024,
            "all-minilm" => 384,
            "bge-small" => 384,
            _ => 768,
        };
        Self {
            client: reqwest::Client::new(),
            model,
            dimensions,
            base_url: base_url.unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Extract the first embedding vector from an Ollama `/api/embed` response.
    fn parse_response(body: &serde_json::Value) -> Result<Vec<f32>, EmbedError> {
        let embedding = body
            .get("embeddings")
            .and_then(|e| e.get(0))
            .and_then(|e| e.as_array())
            .ok_or_else(|| EmbedError::ResponseParse {
                message: "missing 'embeddings[0]' array in response".to_string(),
            })?;

        let vector: Vec<f32> = embedding
            .iter()
            .filter_map(|v| v.as_f64().map(|f| f as f32))
            .collect();
        if vector.is_empty() {
            return Err(EmbedError::EmptyEmbedding);
        }
        Ok(vector)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let url = format!("{}/api/embed", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });

        debug!(model = %self.model, chars = text.len(), "Requesting embedding");
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbedError::ModelUnavailable {
                message: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(EmbedError::ModelUnavailable {
                message: format!("embedding backend returned HTTP {}", resp.status()),
            });
        }

        let json: serde_json::Value =
            resp.json().await.map_err(|e| EmbedError::ResponseParse {
                message: e.to_string(),
            })?;
        Self::parse_response(&json)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Create an embedder from configuration.
///
/// Provider names: `"hash"` (local, default) and `"ollama"`. Unknown
/// providers are a configuration error rather than a silent fallback.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>, ConfigError> {
    match config.provider.as_str() {
        "hash" => {
            let dims = if config.dimensions > 0 {
                config.dimensions
            } else {
                384
            };
            Ok(Box::new(HashEmbedder::new(dims)))
        }
        "ollama" => Ok(Box::new(OllamaEmbedder::new(
            config.model.clone(),
            config.base_url.clone(),
        ))),
        other => Err(ConfigError::UnknownProvider {
            provider: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_embedder_dimensions() {
        let embedder = HashEmbedder::new(128);
        assert_eq!(embedder.dimensions(), 128);
        let v = embedder.embed("hello world").await.unwrap();
        assert_eq!(v.len(), 128);
    }

    #[tokio::test]
    async fn test_hash_embedder_normalized() {
        let embedder = HashEmbedder::new(128);
        let v = embedder.embed("several words to normalize").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01, "expected unit vector, norm={norm}");
    }

    #[tokio::test]
    async fn test_hash_embedder_deterministic() {
        let embedder = HashEmbedder::new(64);
        let v1 = embedder.embed("same text").await.unwrap();
        let v2 = embedder.embed("same text").await.unwrap();
        assert_eq!(v1, v2);
    }

    #[tokio::test]
    async fn test_hash_embedder_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(32);
        let v = embedder.embed("").await.unwrap();
        assert_eq!(v.len(), 32);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_hash_embedder_different_texts_differ() {
        let embedder = HashEmbedder::new(128);
        let a = embedder.embed("paris france capitals").await.unwrap();
        let b = embedder.embed("tokyo japan islands").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_embed_batch_preserves_order() {
        let embedder = HashEmbedder::new(64);
        let texts = ["alpha", "beta", "gamma"];
        let batch = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0], embedder.embed("alpha").await.unwrap());
        assert_eq!(batch[2], embedder.embed("gamma").await.unwrap());
    }

    #[test]
    fn test_ollama_parse_response() {
        let body = serde_json::json!({
            "model": "nomic-embed-text",
            "embeddings": [[0.1, 0.2, 0.3]],
        });
        let v = OllamaEmbedder::parse_response(&body).unwrap();
        assert_eq!(v.len(), 3);
        assert!((v[1] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_ollama_parse_response_missing_field() {
        let body = serde_json::json!({ "model": "nomic-embed-text" });
        let err = OllamaEmbedder::parse_response(&body).unwrap_err();
        assert!(matches!(err, EmbedError::ResponseParse { .. }));
    }

    #[test]
    fn test_ollama_parse_response_empty_vector() {
        let body = serde_json::json!({ "embeddings": [[]] });
        let err = OllamaEmbedder::parse_response(&body).unwrap_err();
        assert!(matches!(err, EmbedError::EmptyEmbedding));
    }

    #[test]
    fn test_ollama_known_model_dimensions() {
        let embedder = OllamaEmbedder::new(None, None);
        assert_eq!(embedder.dimensions(), 768);
        assert_eq!(embedder.model_id(), "nomic-embed-text");

        let embedder = OllamaEmbedder::new(Some("all-minilm".into()), None);
        assert_eq!(embedder.dimensions(), 384);
    }

    #[test]
    fn test_create_embedder_hash_default_dimensions() {
        let config = EmbeddingConfig {
            provider: "hash".into(),
            dimensions: 0,
            ..Default::default()
        };
        let embedder = create_embedder(&config).unwrap();
        assert_eq!(embedder.dimensions(), 384);
    }

    #[test]
    fn test_create_embedder_unknown_provider() {
        let config = EmbeddingConfig {
            provider: "sagemaker".into(),
            ..Default::default()
        };
        let err = create_embedder(&config).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider { .. }));
    }
}
