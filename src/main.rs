use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dicta::{create_router, AppState, Config, Recorder};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dicta", about = "Continuous dictation service")]
struct Args {
    /// Config file, without extension (TOML/YAML/JSON all work)
    #[arg(short, long, default_value = "config/dicta")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    info!("{} starting", cfg.service.name);
    info!("Recognition provider: {}", cfg.recognition.provider);
    info!("Library path: {}", cfg.library.path);

    let recorder = Arc::new(Recorder::new(&cfg)?);
    let app = create_router(AppState::new(recorder.clone()));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    recorder.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
