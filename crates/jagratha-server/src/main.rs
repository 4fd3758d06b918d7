//! Jagratha server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), loads the
//! fleet seed, starts the update scheduler and serves the JSON API over
//! HTTP. Ctrl-C stops the listener, then the background tasks.
//!
//! ```text
//! cargo run -p jagratha-server -- --selector round-robin
//! ```

mod config;
mod telemetry;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use jagratha_engine::{
  archive::{self, TracingArchive},
  fleet::FleetSeed,
  scheduler::{Selector, UpdateScheduler},
};
use tokio::{io::BufReader, net::TcpListener};
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Jagratha pole monitoring server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// JSON fleet seed; overrides `fleet_path` from the configuration.
  #[arg(long)]
  fleet: Option<PathBuf>,

  /// Observation selector; overrides `scheduler.selector`.
  #[arg(long)]
  selector: Option<Selector>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let mut server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;
  if let Some(path) = cli.fleet {
    server_cfg.fleet_path = Some(path);
  }
  if let Some(selector) = cli.selector {
    server_cfg.scheduler.selector = selector;
  }

  // Build the engine.
  let seed = match &server_cfg.fleet_path {
    Some(path) => FleetSeed::load(path)
      .with_context(|| format!("failed to load fleet seed from {path:?}"))?,
    None => {
      info!("No fleet file configured, starting with the demo fleet");
      FleetSeed::demo()
    }
  };
  let engine = seed.into_engine().context("invalid fleet seed")?;

  // Background tasks.
  let cancel = CancellationToken::new();
  let (scheduler, feed) =
    UpdateScheduler::from_config(engine.clone(), &server_cfg.scheduler);
  let mut tasks = vec![scheduler.spawn(cancel.clone())];
  tasks.push(tokio::spawn(archive::run_retention(
    engine.clone(),
    server_cfg.archive.clone(),
    Arc::new(TracingArchive),
    cancel.clone(),
  )));
  if let Some(handle) = feed {
    info!("Reading observations from stdin");
    let stdin = BufReader::new(tokio::io::stdin());
    let cancel = cancel.clone();
    tasks.push(tokio::spawn(async move {
      telemetry::forward(stdin, handle, cancel).await;
    }));
  }

  let app = jagratha_api::api_router(Arc::new(engine));
  let address = server_cfg.address();

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  cancel.cancel();
  for task in tasks {
    if let Err(e) = task.await {
      warn!(error = %e, "Background task ended abnormally");
    }
  }
  info!("Shut down");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(error = %e, "Failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!("Shutdown requested");
}
