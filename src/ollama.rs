//! Ollama adapters for the embedding and generation capabilities.
//!
//! This module is only available when the `ollama` feature is enabled.
//! It talks to a local Ollama server over HTTP:
//!
//! - `POST {base}/api/embed` — batch embeddings
//! - `POST {base}/api/generate` — non-streaming text generation

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::LanguageModel;

/// The default Ollama server address.
const DEFAULT_BASE_URL: &str = "http://localhost:11434";

fn http_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| RagError::Config(format!("failed to build HTTP client: {e}")))
}

// ── Embedding ──────────────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the Ollama `/api/embed` endpoint.
///
/// The whole batch is sent as one request, so it succeeds or fails
/// atomically. Ollama embedding models are deterministic for a fixed
/// model version, which the retrieval layer relies on.
///
/// # Example
///
/// ```rust,ignore
/// use ragpipe::ollama::OllamaEmbedder;
///
/// let embedder = OllamaEmbedder::new("nomic-embed-text", 768)?;
/// let vectors = embedder.embed_batch(&["hello"]).await?;
/// ```
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Create a new embedder for the given model, declaring the
    /// dimensionality its vectors have.
    pub fn new(model: impl Into<String>, dimensions: usize) -> Result<Self> {
        Ok(Self {
            client: http_client(None)?,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            dimensions,
        })
    }

    /// Set the Ollama server address (default `http://localhost:11434`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set a request timeout. Expiry surfaces as an embedding error.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = http_client(Some(timeout))?;
        Ok(self)
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "ollama", batch_size = texts.len(), model = %self.model, "embedding batch");

        let url = format!("{}/api/embed", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest { model: &self.model, input: texts })
            .send()
            .await
            .map_err(|e| {
                error!(provider = "ollama", error = %e, "embedding request failed");
                RagError::Embedding {
                    provider: "ollama".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = "ollama", %status, "embedding API error");
            return Err(RagError::Embedding {
                provider: "ollama".into(),
                message: format!("API returned {status}: {body}"),
            });
        }

        let parsed: EmbedResponse = response.json().await.map_err(|e| {
            error!(provider = "ollama", error = %e, "failed to parse embed response");
            RagError::Embedding {
                provider: "ollama".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        if parsed.embeddings.len() != texts.len() {
            return Err(RagError::Embedding {
                provider: "ollama".into(),
                message: format!(
                    "expected {} vectors, got {}",
                    texts.len(),
                    parsed.embeddings.len()
                ),
            });
        }
        for embedding in &parsed.embeddings {
            if embedding.len() != self.dimensions {
                return Err(RagError::Embedding {
                    provider: "ollama".into(),
                    message: format!(
                        "model returned {}-dimensional vector, expected {}",
                        embedding.len(),
                        self.dimensions
                    ),
                });
            }
        }

        Ok(parsed.embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Generation ─────────────────────────────────────────────────────

/// A [`LanguageModel`] backed by the Ollama `/api/generate` endpoint,
/// non-streaming.
///
/// # Example
///
/// ```rust,ignore
/// use ragpipe::ollama::OllamaGenerator;
///
/// let generator = OllamaGenerator::new()?;
/// let answer = generator.generate("llama3", "2+2=").await?;
/// ```
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaGenerator {
    /// Create a new generator against the default server address.
    pub fn new() -> Result<Self> {
        Ok(Self { client: http_client(None)?, base_url: DEFAULT_BASE_URL.to_string() })
    }

    /// Set the Ollama server address (default `http://localhost:11434`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set a request timeout. Expiry surfaces as a generation error.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = http_client(Some(timeout))?;
        Ok(self)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl LanguageModel for OllamaGenerator {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        debug!(provider = "ollama", model, prompt_len = prompt.len(), "generating");

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest { model, prompt, stream: false })
            .send()
            .await
            .map_err(|e| {
                error!(provider = "ollama", model, error = %e, "generation request failed");
                RagError::Generation {
                    model: model.to_string(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = "ollama", model, %status, "generation API error");
            return Err(RagError::Generation {
                model: model.to_string(),
                message: format!("API returned {status}: {body}"),
            });
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            error!(provider = "ollama", model, error = %e, "failed to parse generate response");
            RagError::Generation {
                model: model.to_string(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        Ok(parsed.response)
    }
}
