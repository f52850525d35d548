mod action;
mod app;
mod app_state;
mod component;
mod components;
mod theme;
mod widgets;

use wx_core::config::Config;
use wx_core::fetch::build_client;
use wx_core::{DiskStore, FetchPolicy, SequenceFetcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = wx_core::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("wxloop.log");
    let ui_state_path = data_dir.join("ui_state.json");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG overrides; HTTP client internals are noisy at debug.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("wxloop log: {}", log_path.display());

    tracing::info!("wxloop starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("config unusable, falling back to defaults: {}", e);
            Config::default()
        }
    };
    tracing::debug!("frames dir: {}", config.paths.frames_dir.display());

    // ── Fetcher ──────────────────────────────────────────────────────────────
    let client = build_client(&config.http)?;
    let store = DiskStore::new(&config.paths.frames_dir);
    let fetcher = SequenceFetcher::new(client, store, FetchPolicy::from(&config.fetch));

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(config, ui_state_path, fetcher);
    app.run().await?;

    Ok(())
}
