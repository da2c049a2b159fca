//! mockpath: lightweight HTTP mock server.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                   MOCKPATH                   │
//!                      │                                              │
//!   spec directory ────┼─▶ spec::loader ──▶ RoutingTable ──┐          │
//!   (*.yaml, *.json)   │   + resolver        (immutable)   │          │
//!          │           │                                   ▼          │
//!          │           │                             SharedRoutes     │
//!          │           │                             (arc-swap)       │
//!          └───────────┼─▶ spec::watcher ── publish ──▶    │          │
//!                      │   (--reload)                      │          │
//!                      │                                   ▼          │
//!   Client Request ────┼─▶ http::server ──▶ routing::matcher          │
//!   Client Response ◀──┼── http::response ◀── MockResponse            │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use mockpath::cli::Cli;
use mockpath::config::{validated, ConfigError};
use mockpath::lifecycle::{self, signals, Shutdown};
use mockpath::observability::logging::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.into_config().and_then(validated) {
        Ok(config) => config,
        Err(ConfigError::Validation(errors)) => {
            for e in errors {
                eprintln!("Error: {}", e);
            }
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(config.observability.log_format) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    tracing::info!("mockpath v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Arc::new(Shutdown::new());
    let running = match lifecycle::start(config, &shutdown).await {
        Ok(running) => running,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };
    signals::spawn_signal_handler(shutdown.clone());

    match running.wait().await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
