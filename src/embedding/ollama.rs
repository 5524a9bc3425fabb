//! Ollama embedding provider.
//!
//! Calls `POST {host}/api/embeddings` with `{"model": ..., "prompt": ...}` and
//! returns the `embedding` array. The dimensionality is fixed per model
//! (768 for nomic-embed-text); the first successful call pins it.

use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

/// Default dimensionality for nomic-embed-text.
const DEFAULT_DIMENSIONS: usize = 768;

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

pub struct OllamaProvider {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    dimensions: OnceLock<usize>,
}

impl OllamaProvider {
    pub fn new(config: &EmbeddingConfig) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/api/embeddings", config.host.trim_end_matches('/')),
            model: config.model.clone(),
            dimensions: OnceLock::new(),
        })
    }
}

impl EmbeddingProvider for OllamaProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingsRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| Error::Provider(format!("embedding request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Provider(format!(
                "embedding request returned HTTP {status}: {body}"
            )));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .map_err(|e| Error::Provider(format!("malformed embedding response: {e}")))?;

        if parsed.embedding.is_empty() {
            return Err(Error::Provider("empty embedding returned".into()));
        }

        let _ = self.dimensions.set(parsed.embedding.len());
        Ok(parsed.embedding)
    }

    fn dimensions(&self) -> usize {
        *self.dimensions.get().unwrap_or(&DEFAULT_DIMENSIONS)
    }
}
