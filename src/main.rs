use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

mod cache;
mod cli;
mod config;
mod errors;
mod extract;
mod prompt;
mod provider;
mod render;
mod repl;
mod session;
mod transcript;
mod ux;
mod wire;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = cli::Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let cfg = config::Config::load(&args)?;
    let session_id = Uuid::new_v4();

    log::info!(
        "provider: {:?}, model: {}, temperature: {}",
        cfg.provider,
        cfg.model,
        cfg.temperature
    );
    let cache_state = if cfg.no_cache || cfg.cache_ttl_secs == 0 {
        "off".to_string()
    } else {
        format!("{}s", cfg.cache_ttl_secs)
    };
    log::info!("reply cache: {}", cache_state);
    log::debug!("session {}", session_id);

    let backend = provider::make_provider(cfg.provider, cfg.timeout_secs, cfg.ollama_url.clone())?;
    let reply_cache = cache::make_cache(cfg.cache_ttl_secs, cfg.no_cache);
    let cached = cache::CachedProvider::new(backend, reply_cache);

    let root = Path::new(&cfg.root);
    let transcript =
        transcript::Transcript::new(root, session_id, cfg.save_request, cfg.save_response);
    if let Some(t) = &transcript {
        log::info!("saving turns under {}", t.dir().display());
    }

    let generator =
        session::Generator::new(Arc::new(cached), cfg.model.clone(), cfg.temperature)
            .with_transcript(transcript);

    let out_dir: PathBuf = root.join(&cfg.out);
    let frame = render::Frame { height: cfg.height, scrolling: cfg.scrolling };
    let mut app = repl::App::new(generator, out_dir, frame, cfg.open);

    ux::banner();
    let stdin = std::io::stdin();
    repl::run(&mut app, stdin.lock()).await?;

    Ok(())
}
