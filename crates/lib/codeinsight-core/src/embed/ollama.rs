use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{EmbedError, Embedder};

/// Default Ollama base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default embedding model; produces 384-dimensional vectors.
pub const DEFAULT_MODEL: &str = "all-minilm";

/// Embedder backed by an Ollama server's `/api/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    dimensions: usize,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Option<Vec<f32>>,
}

impl OllamaEmbedder {
    #[must_use]
    pub fn new(base_url: &str, model: &str, dimensions: usize) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions,
            client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Embedder for OllamaEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|err| EmbedError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, model = %self.model, "embedding service rejected request");
            return Err(EmbedError::Status(status.as_u16()));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|err| EmbedError::Response(err.to_string()))?;
        let embedding = body
            .embedding
            .ok_or_else(|| EmbedError::Response("missing embedding field".to_string()))?;

        if embedding.len() != self.dimensions {
            return Err(EmbedError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }
        if let Some(index) = embedding.iter().position(|value| !value.is_finite()) {
            return Err(EmbedError::Response(format!(
                "embedding component {index} is not finite"
            )));
        }
        Ok(embedding)
    }
}
