//! Embedding provider seam.
//!
//! The storage core never runs a model — vectors for stored memories come
//! from an external collaborator behind the [`EmbeddingProvider`] trait, and
//! search vectors come directly from the caller. The shipped implementation
//! is a thin HTTP client for the companion brain service.

pub mod remote;

use crate::config::EmbeddingConfig;
use crate::error::{HavenError, Result};

/// Number of dimensions the index expects from a provider.
pub const EMBEDDING_DIM: usize = 384;

/// Trait for turning memory content into vectors.
///
/// All methods are synchronous — callers in async contexts should use
/// `tokio::task::spawn_blocking`.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Return the number of dimensions this provider produces.
    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Create an embedding provider from config.
///
/// Currently only `"remote"` is supported (the brain service's `/embed`
/// endpoint).
pub fn create_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "remote" => Ok(Box::new(remote::RemoteEmbeddingProvider::new(config))),
        other => Err(HavenError::InvalidArgument(format!(
            "unknown embedding provider: {other}. Supported: remote"
        ))),
    }
}
