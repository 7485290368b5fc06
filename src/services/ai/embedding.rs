use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;

use super::llm::build_base_url;

/// Embedding capability. Fallible at the trait level; `EmbeddingService`
/// owns the zero-vector degradation.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn try_embed(&self, text: &str) -> Result<Vec<f32>, String>;
}

pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(client: Client, provider: &ProviderConfig, model: &str) -> Self {
        Self {
            client,
            api_key: provider.api_key.trim().to_string(),
            base_url: build_base_url(provider.base_url.as_deref()),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl TextEmbedder for OpenAiEmbedder {
    async fn try_embed(&self, text: &str) -> Result<Vec<f32>, String> {
        if self.api_key.is_empty() {
            return Err("missing api key".to_string());
        }

        let request = EmbeddingRequest {
            model: self.model.as_str(),
            input: text,
        };

        let url = format!("{}/v1/embeddings", self.base_url);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("embedding request failed: {e}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("embedding request failed: {status} {body}"));
        }

        let response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| format!("embedding response invalid: {e}"))?;

        response
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| "embedding response missing vector".to_string())
    }
}

/// Turns text into a fixed-dimension vector. Never fails: any backend
/// error yields an all-zero vector.
pub struct EmbeddingService {
    backend: Arc<dyn TextEmbedder>,
    dimension: usize,
}

impl EmbeddingService {
    pub fn new(backend: Arc<dyn TextEmbedder>, dimension: usize) -> Self {
        Self { backend, dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub async fn embed(&self, text: &str) -> Vec<f32> {
        match self.backend.try_embed(text).await {
            Ok(vector) if vector.len() == self.dimension => vector,
            Ok(vector) => {
                tracing::warn!(
                    expected = self.dimension,
                    got = vector.len(),
                    "embedding dimension mismatch, using zero vector"
                );
                vec![0.0; self.dimension]
            }
            Err(err) => {
                tracing::warn!(error = %err, "embedding failed, using zero vector");
                vec![0.0; self.dimension]
            }
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
