//! REST server startup

use anyhow::Result;
use axum::serve;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::server::routing::create_router;
use crate::server::state::AppState;

/// Bind `addr` and serve until Ctrl-C
pub async fn start_server(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
  let app = create_router(state);

  let listener = TcpListener::bind(addr).await?;
  info!("Server listening on {addr}");

  match serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
    Ok(()) => {
      info!("Server shutdown gracefully");
      Ok(())
    }
    Err(e) => {
      error!("Server error: {e}");
      Err(anyhow::anyhow!("Server error: {}", e))
    }
  }
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    error!("Failed to listen for shutdown signal: {e}");
    std::future::pending::<()>().await;
  }
}
