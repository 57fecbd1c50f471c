//! Server entry point for tikrelay.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tikrelay::observe::TracingObserver;
use tikrelay::{AppState, DownloadPipeline, Relay, build_default_provider_chain, router, serve};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let providers = build_default_provider_chain(&args.provider_http_config());
    if providers.is_empty() {
        warn!("No providers available; every request will fail");
    }
    info!(providers = ?providers.provider_names(), "Provider chain ready");

    let relay = Relay::with_config(&args.relay_config()).context("building relay client")?;
    let pipeline = DownloadPipeline::new(providers, relay, Arc::new(TracingObserver));

    let addr = SocketAddr::new(args.host, args.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(addr = %addr, "Server listening; GET /download?url=<tiktok-url>");

    serve(listener, router(AppState::new(pipeline)))
        .await
        .context("running HTTP server")?;

    info!("Server stopped");
    Ok(())
}
