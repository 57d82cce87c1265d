//! Answer synthesis: prompt assembly and the generative-model backend.
//!
//! The generator speaks the OpenAI-compatible chat completions shape, which
//! Ollama, vLLM, and LM Studio all expose, so any local server with that
//! surface works. A single request per query, no retries; the response text
//! is returned unmodified.

use crate::config::LlmConfig;
use crate::error::SynthesisError;
use crate::types::ScoredChunk;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

/// Trait for generative-model backends.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Send a prompt and return the generated text unmodified.
    async fn complete(&self, prompt: &str) -> Result<String, SynthesisError>;

    /// Model identifier for this backend instance.
    fn model_id(&self) -> &str;
}

/// Generative backend for OpenAI-compatible local servers (Ollama et al.).
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    timeout_secs: u64,
}

impl OllamaGenerator {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";

    pub fn new(config: &LlmConfig) -> Result<Self, SynthesisError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::ModelUnavailable {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Extract the assistant text from an OpenAI-format chat completion body.
    fn parse_response(body: &Value) -> Result<String, SynthesisError> {
        let content = body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| SynthesisError::ResponseParse {
                message: "no 'choices[0].message.content' in response".to_string(),
            })?;
        Ok(content.to_string())
    }
}

#[async_trait]
impl GenerativeModel for OllamaGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, SynthesisError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "stream": false,
        });

        debug!(model = %self.model, prompt_chars = prompt.len(), "Requesting completion");
        let resp = self.client.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                SynthesisError::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                SynthesisError::ModelUnavailable {
                    message: e.to_string(),
                }
            }
        })?;

        if !resp.status().is_success() {
            return Err(SynthesisError::ModelUnavailable {
                message: format!("generative backend returned HTTP {}", resp.status()),
            });
        }

        let json: Value = resp.json().await.map_err(|e| SynthesisError::ResponseParse {
            message: e.to_string(),
        })?;
        Self::parse_response(&json)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// An assembled prompt together with which chunks made it in.
#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    pub text: String,
    pub chunk_ids: Vec<String>,
    pub truncated: bool,
}

/// Assembles the retrieval context and the final prompt under a character
/// budget (roughly 4 chars per token for budgeting purposes).
pub struct PromptBuilder {
    max_context_chars: usize,
}

const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

impl PromptBuilder {
    pub fn new(max_context_chars: usize) -> Self {
        Self { max_context_chars }
    }

    /// Build the prompt for a question over retrieved chunks, best-first.
    ///
    /// Chunks are appended in retrieval order until the context budget
    /// (counted in chars, matching the config knob) is reached; later
    /// chunks are dropped rather than split.
    pub fn build(&self, question: &str, chunks: &[ScoredChunk<'_>]) -> BuiltPrompt {
        let separator_chars = CONTEXT_SEPARATOR.chars().count();
        let mut context = String::new();
        let mut context_chars = 0;
        let mut chunk_ids = Vec::new();
        let mut truncated = false;

        for scored in chunks {
            let addition = scored.chunk.text.chars().count()
                + if context.is_empty() { 0 } else { separator_chars };
            if context_chars + addition > self.max_context_chars {
                truncated = true;
                break;
            }
            if !context.is_empty() {
                context.push_str(CONTEXT_SEPARATOR);
            }
            context.push_str(&scored.chunk.text);
            context_chars += addition;
            chunk_ids.push(scored.chunk.id.clone());
        }

        let text = if context.is_empty() {
            format!(
                "Answer the following question.\n\nQuestion: {question}\n\nAnswer:"
            )
        } else {
            format!(
                "Use the following context to answer the question. \
                 If the context does not contain the answer, say so.\n\n\
                 Context:\n{context}\n\nQuestion: {question}\n\nAnswer:"
            )
        };

        BuiltPrompt {
            text,
            chunk_ids,
            truncated,
        }
    }
}

/// Mock generator for tests: returns a fixed canned response on every call,
/// or fails on demand. Records each prompt it receives.
pub struct MockGenerator {
    response: Option<String>,
    prompts: std::sync::Mutex<Vec<String>>,
    fail_unavailable: bool,
}

impl MockGenerator {
    /// A generator that always returns `text`.
    pub fn with_response(text: &str) -> Self {
        Self {
            response: Some(text.to_string()),
            prompts: std::sync::Mutex::new(Vec::new()),
            fail_unavailable: false,
        }
    }

    /// A generator whose every call fails with ModelUnavailable.
    pub fn unreachable() -> Self {
        Self {
            response: None,
            prompts: std::sync::Mutex::new(Vec::new()),
            fail_unavailable: true,
        }
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for MockGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, SynthesisError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail_unavailable {
            return Err(SynthesisError::ModelUnavailable {
                message: "mock backend is unreachable".to_string(),
            });
        }
        Ok(self
            .response
            .clone()
            .unwrap_or_else(|| "mock response".to_string()))
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}
