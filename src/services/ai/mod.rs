mod embedding;
mod enrichment;
mod llm;
mod search;
mod types;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::config::{AppConfig, ProviderConfig};

pub use embedding::{EmbeddingService, OpenAiEmbedder, TextEmbedder};
pub use enrichment::EnrichmentService;
pub use llm::{ChatCompletion, CompletionParams, OpenAiChat};
pub use search::{cosine_similarity, SearchService};
pub use types::*;

#[derive(Clone)]
pub struct AiServices {
    pub enrichment: Arc<EnrichmentService>,
    pub embedding: Arc<EmbeddingService>,
    pub search: Arc<SearchService>,
}

impl AiServices {
    pub fn new(config: &AppConfig, provider: &ProviderConfig) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| format!("http client init failed: {e}"))?;

        let chat = Arc::new(OpenAiChat::new(client.clone(), provider, &config.chat_model));
        let embedder = Arc::new(OpenAiEmbedder::new(
            client,
            provider,
            &config.embedding_model,
        ));

        Ok(Self::from_backends(
            chat,
            embedder,
            config.embedding_dimension,
            CompletionParams {
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            },
        ))
    }

    /// Wire the services over arbitrary capability backends (tests inject
    /// fakes here; production goes through `new`).
    pub fn from_backends(
        chat: Arc<dyn ChatCompletion>,
        embedder: Arc<dyn TextEmbedder>,
        dimension: usize,
        params: CompletionParams,
    ) -> Self {
        let embedding = Arc::new(EmbeddingService::new(embedder, dimension));
        let enrichment = Arc::new(EnrichmentService::new(chat, params));
        let search = Arc::new(SearchService::new(embedding.clone()));

        Self {
            enrichment,
            embedding,
            search,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;

    use super::embedding::TextEmbedder;
    use super::llm::{ChatCompletion, CompletionParams};

    pub(crate) struct FixedChat(pub String);

    #[async_trait]
    impl ChatCompletion for FixedChat {
        async fn complete(&self, _prompt: &str, _params: CompletionParams) -> Result<String, String> {
            Ok(self.0.clone())
        }
    }

    pub(crate) struct FailingChat;

    #[async_trait]
    impl ChatCompletion for FailingChat {
        async fn complete(&self, _prompt: &str, _params: CompletionParams) -> Result<String, String> {
            Err("capability unavailable".to_string())
        }
    }

    pub(crate) struct FixedEmbedder(pub Vec<f32>);

    #[async_trait]
    impl TextEmbedder for FixedEmbedder {
        async fn try_embed(&self, _text: &str) -> Result<Vec<f32>, String> {
            Ok(self.0.clone())
        }
    }

    pub(crate) struct FailingEmbedder;

    #[async_trait]
    impl TextEmbedder for FailingEmbedder {
        async fn try_embed(&self, _text: &str) -> Result<Vec<f32>, String> {
            Err("capability unavailable".to_string())
        }
    }

    /// Returns the vector paired with the first needle found in the input
    /// text; anything unmatched fails like a broken backend.
    pub(crate) struct ScriptedEmbedder(pub Vec<(&'static str, Vec<f32>)>);

    #[async_trait]
    impl TextEmbedder for ScriptedEmbedder {
        async fn try_embed(&self, text: &str) -> Result<Vec<f32>, String> {
            self.0
                .iter()
                .find(|(needle, _)| text.contains(needle))
                .map(|(_, vector)| vector.clone())
                .ok_or_else(|| format!("no scripted embedding for: {text}"))
        }
    }
}
