use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(alias = "open-ai", alias = "openai")]
    OpenAI,
    #[value(alias = "anthropic")]
    Anthropic,
    #[value(alias = "ollama")]
    Ollama,
}

/// Flags left unset fall back to the config file, then to built-in defaults.
#[derive(Parser, Debug, Default)]
#[command(
    name = "vibe_pagegen",
    version,
    about = "Describe a web page, let an LLM write it, iterate on it"
)]
pub struct Args {
    /// TOML file with default settings
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long)]
    pub root: Option<String>,

    /// Directory that receives page.html and preview.html
    #[arg(long)]
    pub out: Option<String>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub temperature: Option<f32>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long)]
    pub ollama_url: Option<String>,

    /// Seconds an identical conversation is answered from memory
    #[arg(long)]
    pub cache_ttl_secs: Option<u64>,

    #[arg(long, default_value_t = false)]
    pub no_cache: bool,

    /// Height of the embedded preview frame in pixels
    #[arg(long)]
    pub height: Option<u32>,

    #[arg(long, default_value_t = false)]
    pub no_scrolling: bool,

    /// Open the preview in the default browser after each generation
    #[arg(long, default_value_t = false)]
    pub open: bool,

    #[arg(long, default_value_t = false)]
    pub save_request: bool,

    #[arg(long, default_value_t = false)]
    pub save_response: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,
}
