//! Text-to-vector embedding via a remote provider.
//!
//! Provides the [`EmbeddingProvider`] trait and an Ollama-backed
//! implementation. The provider is created via [`create_provider`] from
//! configuration and passed explicitly into the chunk store, search, and
//! ingestion code; there is no process-wide client.

pub mod ollama;

use crate::error::Result;

/// Trait for embedding text into vectors.
///
/// Implementations produce vectors of a fixed dimensionality reported by
/// [`dimensions`](Self::dimensions). Callers must never compare vectors of
/// differing dimensionality. All methods are synchronous blocking calls with
/// provider-side timeouts; failures surface as [`crate::Error::Provider`] and
/// are not retried internally.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Number of dimensions this provider produces.
    fn dimensions(&self) -> usize;
}

/// Create an embedding provider from config.
///
/// Currently only `"ollama"` is supported.
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> anyhow::Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "ollama" => {
            let provider = ollama::OllamaProvider::new(config)?;
            Ok(Box::new(provider))
        }
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: ollama"),
    }
}
