//! Marginalia query service
//!
//! Serves `/health` and `/chat` for the reading assistant. Configuration
//! comes from flags, the environment, or a `.env` file.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use marginalia::config::ServerArgs;
use marginalia::server::{start_server, AppState};

#[derive(Parser)]
#[command(name = "marginalia_server")]
#[command(about = "Reading assistant query service")]
#[command(version)]
struct Args {
  /// Server bind address
  #[arg(long, env = "MARGINALIA_BIND", default_value = "127.0.0.1:8000")]
  bind: SocketAddr,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,

  #[command(flatten)]
  server: ServerArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
  dotenvy::dotenv().ok();
  let args = Args::parse();

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if args.verbose {
      EnvFilter::new("marginalia=debug,tower_http=debug,info")
    } else {
      EnvFilter::new("marginalia=info,warn")
    }
  });
  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  info!("Starting Marginalia query service v{}", env!("CARGO_PKG_VERSION"));

  let state = AppState::connect(&args.server).context("invalid server configuration")?;
  info!(
    index = %args.server.search.index_name,
    top_k = state.assistant.top_k(),
    "backends configured"
  );

  start_server(args.bind, Arc::new(state)).await
}
