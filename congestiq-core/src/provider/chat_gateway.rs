use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::model::ConversationMessage;

use super::{ChatProvider, http_client, truncate_body};

const DEFAULT_BASE_URL: &str = "https://ai.gateway.lovable.dev/v1";

pub const MAX_TOKENS: u32 = 1024;
pub const TEMPERATURE: f64 = 0.7;

/// Client for an OpenAI-style `chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct ChatGatewayProvider {
    api_key: String,
    model: String,
    endpoint: String,
    http: Client,
}

impl ChatGatewayProvider {
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let endpoint = format!("{}/chat/completions", base_url.trim_end_matches('/'));

        Ok(Self {
            api_key,
            model,
            endpoint,
            http: http_client(timeout)?,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ConversationMessage],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Option<Vec<CompletionChoice>>,
}

impl CompletionResponse {
    fn first_content(self) -> Option<String> {
        self.choices?.into_iter().next()?.message?.content
    }
}

#[async_trait]
impl ChatProvider for ChatGatewayProvider {
    async fn complete(&self, messages: &[ConversationMessage]) -> Result<Option<String>> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let res = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to AI gateway")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read AI gateway response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "AI gateway request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&body).context("Failed to parse AI gateway completion JSON")?;

        Ok(parsed.first_content())
    }
}
