//! Origin-gated HTTP server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ error handler ─▶ cors gate ─▶ routes
//!                                                 ▲              │          │
//!                                                 │   rejected   │          │ GET /
//!                                                 └──────────────┘          │ /auth/*
//!     Client Response                                                       │
//!     ◀──────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use origin_gate::config::load_config;
use origin_gate::lifecycle::startup;
use origin_gate::observability::logging;
use origin_gate::HttpServer;

#[derive(Parser)]
#[command(name = "origin-gate")]
#[command(about = "HTTP server with an origin-gated CORS policy", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "ORIGIN_GATE_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port; overrides `PORT` and the config file.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.listener.port = port;
    }

    logging::init_logging(&config.observability)?;

    tracing::info!("origin-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        environment = %config.environment,
        frontend_url = ?config.cors.frontend_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    startup::run(HttpServer::new(config)).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
