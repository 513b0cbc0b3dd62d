use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::wire::{ChatRequest, Message};
use super::Provider;

pub struct Ollama {
    client: Client,
    pub url: String,
}

impl Ollama {
    pub fn new(url: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("building ollama http client")?;
        Ok(Self { client, url })
    }
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl Provider for Ollama {
    async fn complete(&self, req: &ChatRequest) -> Result<String> {
        let url = format!("{}/api/chat", self.url.trim_end_matches('/'));
        let body = ChatBody {
            model: &req.model,
            messages: req.messages.messages(),
            stream: false,
            options: OllamaOptions { temperature: req.temperature },
        };

        log::debug!("ollama: POST {}", url);

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("ollama request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("ollama read body failed")?;

        if !status.is_success() {
            return Err(anyhow!("Ollama error ({}): {}", status, text));
        }

        parse_reply(&text)
    }
}

fn parse_reply(text: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(text)
        .map_err(|e| anyhow!("ollama response parse error: {}", e))?;
    super::reply_text(parsed.message.content, "ollama")
}
