use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::wire::{ChatRequest, Message};

const DEFAULT_BASE: &str = "https://api.openai.com";

pub struct OpenAIProvider {
    client: Client,
    api_base: String,
}

impl OpenAIProvider {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("building openai http client")?;
        let api_base =
            std::env::var("OPENAI_API_BASE").unwrap_or_else(|_| DEFAULT_BASE.to_string());
        Ok(Self { client, api_base })
    }
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

pub(crate) fn parse_reply(text: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(text)
        .map_err(|e| anyhow!("failed to parse OpenAI response: {e}\nRaw: {text}"))?;
    let content = parsed.choices.into_iter().next().and_then(|c| c.message.content);
    super::reply_text(content, "openai")
}

#[async_trait]
impl super::Provider for OpenAIProvider {
    async fn complete(&self, req: &ChatRequest) -> Result<String> {
        // Read per call: a missing key is reported as a provider failure, not at startup.
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY env var is not set"))?;

        let url = format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'));
        let body = ChatBody {
            model: &req.model,
            messages: req.messages.messages(),
            temperature: req.temperature,
        };

        log::debug!("openai: POST {} ({} messages)", url, req.messages.len());

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .context("openai request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("openai read body failed")?;
        log::debug!("openai: status {}", status);

        if !status.is_success() {
            return Err(anyhow!("OpenAI API error ({}): {}", status, text));
        }

        parse_reply(&text)
    }
}
