use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::{Args, ProviderKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub root: String,
    pub out: String,
    pub provider: ProviderKind,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub ollama_url: Option<String>,
    pub cache_ttl_secs: u64,
    pub no_cache: bool,
    pub height: u32,
    pub scrolling: bool,
    pub open: bool,
    pub save_request: bool,
    pub save_response: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: ".".into(),
            out: ".vibe/preview".into(),
            provider: ProviderKind::OpenAI,
            model: "gpt-3.5-turbo".into(),
            temperature: 0.1,
            timeout_secs: 120,
            ollama_url: Some("http://localhost:11434".into()),
            cache_ttl_secs: 10,
            no_cache: false,
            height: 800,
            scrolling: true,
            open: false,
            save_request: false,
            save_response: false,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        toml::from_str(&s).with_context(|| format!("parsing {}", path.display()))
    }

    /// Config file (if any) with explicitly passed flags laid on top.
    pub fn load(args: &Args) -> Result<Self> {
        let mut cfg = match &args.config {
            Some(p) => Self::from_file(Path::new(p))?,
            None => Self::default(),
        };
        cfg.apply_args(args);
        Ok(cfg)
    }

    fn apply_args(&mut self, args: &Args) {
        if let Some(v) = &args.root {
            self.root = v.clone();
        }
        if let Some(v) = &args.out {
            self.out = v.clone();
        }
        if let Some(v) = args.provider {
            self.provider = v;
        }
        if let Some(v) = &args.model {
            self.model = v.clone();
        }
        if let Some(v) = args.temperature {
            self.temperature = v;
        }
        if let Some(v) = args.timeout_secs {
            self.timeout_secs = v;
        }
        if let Some(v) = &args.ollama_url {
            self.ollama_url = Some(v.clone());
        }
        if let Some(v) = args.cache_ttl_secs {
            self.cache_ttl_secs = v;
        }
        if let Some(v) = args.height {
            self.height = v;
        }
        // switches only ever turn things on/off relative to the file
        if args.no_cache {
            self.no_cache = true;
        }
        if args.no_scrolling {
            self.scrolling = false;
        }
        if args.open {
            self.open = true;
        }
        if args.save_request {
            self.save_request = true;
        }
        if args.save_response {
            self.save_response = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_match_the_generation_contract() {
        let cfg = Config::load(&Args::default()).unwrap();
        assert_eq!(cfg.temperature, 0.1);
        assert_eq!(cfg.cache_ttl_secs, 10);
        assert_eq!(cfg.height, 800);
        assert!(cfg.scrolling);
        assert_eq!(cfg.provider, ProviderKind::OpenAI);
    }

    #[test]
    fn file_then_flags() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pagegen.toml");
        fs::write(
            &path,
            "provider = \"ollama\"\nmodel = \"llama3\"\nheight = 600\nsave_response = true\n",
        )
        .unwrap();

        let args = Args::parse_from([
            "vibe_pagegen",
            "--config",
            path.to_str().unwrap(),
            "--model",
            "qwen2.5-coder",
            "--no-scrolling",
        ]);
        let cfg = Config::load(&args).unwrap();
        assert_eq!(cfg.provider, ProviderKind::Ollama);
        assert_eq!(cfg.model, "qwen2.5-coder");
        assert_eq!(cfg.height, 600);
        assert!(cfg.save_response);
        assert!(!cfg.scrolling);
        // untouched keys keep their defaults
        assert_eq!(cfg.temperature, 0.1);
    }

    #[test]
    fn bad_file_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.toml");
        fs::write(&path, "height = \"tall\"").unwrap();
        let args = Args { config: Some(path.display().to_string()), ..Args::default() };
        let err = Config::load(&args).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing"));
    }
}
