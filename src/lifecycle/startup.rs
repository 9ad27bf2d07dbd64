//! Startup orchestration.
//!
//! # Responsibilities
//! - Bring up optional background services (metrics endpoint)
//! - Bind the listener and serve until a signal arrives
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start metrics endpoint: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Start everything `server` needs and serve until SIGINT/SIGTERM.
pub async fn run(server: HttpServer) -> Result<(), StartupError> {
    let config: &ServerConfig = server.config();

    if config.observability.metrics_enabled {
        if let Some(addr) = config.observability.metrics_socket_addr() {
            metrics::init_metrics(addr)?;
        }
    }

    let address = config.listener.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    let local_addr: SocketAddr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Server running on port {}", local_addr.port());

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::listen_for_signals(shutdown));

    server.run(listener, server_shutdown).await?;
    Ok(())
}
