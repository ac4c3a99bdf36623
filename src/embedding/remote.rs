//! HTTP embedding client for the brain service.
//!
//! POSTs `{texts, model}` to the configured `/embed` endpoint and expects
//! `{embeddings, dimension, model}` back. One request per memory write is
//! fine at personal-vault scale.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::error::{HavenError, Result};
use crate::embedding::EmbeddingProvider;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    texts: Vec<&'a str>,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
    dimension: usize,
}

pub struct RemoteEmbeddingProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
}

impl RemoteEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        }
    }
}

impl EmbeddingProvider for RemoteEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            texts: vec![text],
            model: &self.model,
        };

        let response: EmbedResponse = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| HavenError::Embedding(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| HavenError::Embedding(format!("embed endpoint error: {e}")))?
            .json()
            .map_err(|e| HavenError::Embedding(format!("invalid embed response: {e}")))?;

        if response.dimension != crate::embedding::EMBEDDING_DIM {
            return Err(HavenError::Embedding(format!(
                "provider returned {}-dimensional vectors, expected {}",
                response.dimension,
                crate::embedding::EMBEDDING_DIM
            )));
        }

        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| HavenError::Embedding("no embedding returned".into()))
    }
}
