use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Clone, Copy)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Text-generation capability. The production implementation talks to an
/// OpenAI-compatible chat completions endpoint; tests inject fakes.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, prompt: &str, params: CompletionParams) -> Result<String, String>;
}

pub struct OpenAiChat {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiChat {
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
impl ChatCompletion for OpenAiChat {
    async fn complete(&self, prompt: &str, params: CompletionParams) -> Result<String, String> {
        if self.api_key.is_empty() {
            return Err("missing api key".to_string());
        }

        let request = ChatRequest {
            model: self.model.as_str(),
            messages: vec![ChatRequestMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("chat request failed: {e}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("chat request failed: {status} {body}"));
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| format!("chat response invalid: {e}"))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err("chat response missing content".to_string());
        }

        Ok(content)
    }
}

pub(crate) fn build_base_url(base_url: Option<&str>) -> String {
    let base = base_url
        .unwrap_or(DEFAULT_OPENAI_BASE_URL)
        .trim()
        .trim_end_matches('/');
    if base.is_empty() {
        DEFAULT_OPENAI_BASE_URL.to_string()
    } else {
        base.to_string()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::build_base_url;

    #[test]
    fn base_url_defaults_and_trims() {
        assert_eq!(build_base_url(None), "https://api.openai.com");
        assert_eq!(build_base_url(Some("  ")), "https://api.openai.com");
        assert_eq!(
            build_base_url(Some("https://proxy.example.com/")),
            "https://proxy.example.com"
        );
    }
}
