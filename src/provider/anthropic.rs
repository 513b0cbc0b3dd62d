use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::wire::{ChatRequest, Role};
use super::Provider;

pub struct Anthropic {
    client: Client,
    pub api_base: String,
    pub api_version: String,
    pub max_tokens: u32,
}

impl Anthropic {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("building anthropic http client")?;
        Ok(Self {
            client,
            api_base: "https://api.anthropic.com".into(),
            api_version: "2023-06-01".into(),
            max_tokens: 4096,
        })
    }
}

#[derive(Serialize)]
struct MsgRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Msg<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MsgResponse {
    content: Vec<Block>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(default)]
    text: String,
    #[serde(default)]
    r#type: String,
}

/// The messages API takes system text out of band; join every system turn into it.
fn split_system(req: &ChatRequest) -> (Option<String>, Vec<Msg<'_>>) {
    let mut system: Vec<&str> = Vec::new();
    let mut msgs = Vec::new();
    for m in req.messages.messages() {
        match m.role {
            Role::System => system.push(&m.content),
            Role::User | Role::Assistant => msgs.push(Msg {
                role: m.role.as_str(),
                content: &m.content,
            }),
        }
    }
    let system = if system.is_empty() { None } else { Some(system.join("\n\n")) };
    (system, msgs)
}

fn parse_reply(text: &str) -> Result<String> {
    let parsed: MsgResponse = serde_json::from_str(text)
        .map_err(|e| anyhow!("anthropic response parse error: {}", e))?;

    let content: String = parsed
        .content
        .into_iter()
        .filter(|b| b.r#type == "text")
        .map(|b| b.text)
        .collect::<Vec<_>>()
        .join("");
    super::reply_text(Some(content), "anthropic")
}

#[async_trait]
impl Provider for Anthropic {
    async fn complete(&self, req: &ChatRequest) -> Result<String> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow!("ANTHROPIC_API_KEY env var is not set"))?;

        let url = format!("{}/v1/messages", self.api_base.trim_end_matches('/'));
        let (system, messages) = split_system(req);
        let body = MsgRequest {
            model: &req.model,
            max_tokens: self.max_tokens,
            temperature: req.temperature,
            messages,
            system,
        };

        log::debug!("anthropic: POST {}", url);

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .context("anthropic request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("anthropic read body failed")?;
        log::debug!("anthropic: status {}", status);

        if !status.is_success() {
            return Err(anyhow!("Anthropic API error ({}): {}", status, text));
        }

        parse_reply(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{Conversation, Message};

    #[test]
    fn system_turns_move_out_of_band() {
        let mut messages = Conversation::new();
        messages.push(Message::system("be brief"));
        messages.push(Message::user("page please"));
        messages.push(Message::assistant("```html\n<p/>\n```"));
        let req = ChatRequest { model: "claude".into(), messages, temperature: 0.1 };

        let (system, msgs) = split_system(&req);
        assert_eq!(system.as_deref(), Some("be brief"));
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, "user");
        assert_eq!(msgs[1].role, "assistant");
    }

    #[test]
    fn no_text_blocks_gives_blank_reply() {
        assert_eq!(parse_reply(r#"{"content":[]}"#).unwrap(), "");
        assert!(parse_reply("overloaded").is_err());
    }

    #[test]
    fn text_blocks_are_joined() {
        let raw = r#"{"content":[{"type":"text","text":"a"},{"type":"tool_use"},{"type":"text","text":"b"}]}"#;
        assert_eq!(parse_reply(raw).unwrap(), "ab");
    }
}
