use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::cli::ProviderKind;
use crate::wire::ChatRequest;

pub mod openai;
pub mod anthropic;
pub mod ollama;

/// A chat-completion backend: conversation in, raw assistant text out.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn complete(&self, req: &ChatRequest) -> Result<String>;
}

pub type DynProvider = Arc<dyn Provider>;

pub fn make_provider(
    kind: ProviderKind,
    timeout_secs: u64,
    ollama_url: Option<String>,
) -> Result<DynProvider> {
    match kind {
        ProviderKind::OpenAI => Ok(Arc::new(openai::OpenAIProvider::new(timeout_secs)?)),
        ProviderKind::Anthropic => Ok(Arc::new(anthropic::Anthropic::new(timeout_secs)?)),
        ProviderKind::Ollama => {
            let url = ollama_url.ok_or_else(|| anyhow!("ollama provider needs --ollama-url"))?;
            Ok(Arc::new(ollama::Ollama::new(url, timeout_secs)?))
        }
    }
}

/// Shared tail of every adapter: the reply text with surrounding whitespace removed.
/// A reply with no content at all is a provider failure; blank text is passed on
/// and rejected later by extraction.
pub(crate) fn reply_text(content: Option<String>, provider: &str) -> Result<String> {
    content
        .map(|c| c.trim().to_string())
        .ok_or_else(|| anyhow!("{provider}: completion has no content"))
}
