use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{HttpInterviewApi, MemorySessionStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod terminal;

use app::{App, Entry};
use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "bee", about = "Terminal client for the BEE AI mock interview")]
struct Args {
    /// Backend base URL, e.g. http://localhost:8000
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long, default_value = "bee.toml")]
    config: PathBuf,
    /// Start right away from a comma-separated skill list.
    #[arg(long, conflicts_with = "resume")]
    skills: Option<String>,
    /// Start right away from a PDF or text resume.
    #[arg(long)]
    resume: Option<PathBuf>,
    #[arg(long)]
    request_timeout_secs: Option<u64>,
    #[arg(long)]
    start_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(url) = args.server_url {
        settings.server_url = url;
    }
    if let Some(secs) = args.request_timeout_secs {
        settings.request_timeout_secs = secs;
    }
    if let Some(secs) = args.start_timeout_secs {
        settings.start_timeout_secs = secs;
    }
    info!(server_url = %settings.server_url, "bee client starting");

    let api = HttpInterviewApi::new(&settings.server_url, settings.timeouts())
        .with_context(|| format!("cannot use server url '{}'", settings.server_url))?;
    let store = MemorySessionStore::new();

    let entry = match (args.skills, args.resume) {
        (Some(skills), _) => Entry::Skills(skills),
        (None, Some(path)) => Entry::Resume(path),
        (None, None) => Entry::Prompt,
    };

    App::new(Arc::new(api), Arc::new(store)).run(entry).await
}
