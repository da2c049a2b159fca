//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the spec tree and publish the first routing table
//! - Start the metrics exporter when enabled
//! - Bind the listener, then start the reload watcher and the server
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, including a bad spec tree
//! - Listener binds before the watcher starts, so a bind failure leaves no
//!   background task behind
//! - Every background task subscribes to the same `Shutdown`

use std::io;
use std::net::{AddrParseError, SocketAddr};
use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::MockConfig;
use crate::http::MockServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::{RoutingTable, SharedRoutes};
use crate::spec::{load_table, ReloadWatcher, SpecLoadError};

/// Errors that stop the process before or while serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load specs: {0}")]
    Specs(#[from] SpecLoadError),

    #[error("invalid metrics address: {0}")]
    MetricsAddress(#[from] AddrParseError),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind { address: String, source: io::Error },

    #[error("server error: {0}")]
    Serve(io::Error),
}

/// Handles to a started server.
pub struct Running {
    /// Address the listener actually bound (useful with port 0).
    pub local_addr: SocketAddr,
    /// Live routing table handle.
    pub routes: SharedRoutes,
    server: JoinHandle<io::Result<()>>,
    watcher: Option<JoinHandle<()>>,
}

impl Running {
    /// Wait for the server to stop, then for the watcher.
    pub async fn wait(self) -> Result<(), StartupError> {
        let served = match self.server.await {
            Ok(result) => result.map_err(StartupError::Serve),
            Err(e) => Err(StartupError::Serve(io::Error::other(e))),
        };

        if let Some(watcher) = self.watcher {
            if served.is_ok() {
                // Same shutdown signal as the server; exits on its own.
                let _ = watcher.await;
            } else {
                watcher.abort();
            }
        }
        served
    }
}

/// Load the spec tree and publish it as generation 1.
pub fn load_initial_routes(dir: &Path) -> Result<SharedRoutes, SpecLoadError> {
    let table = load_table(dir)?;
    log_route_table(dir, &table);
    metrics::record_route_count(table.len());
    Ok(SharedRoutes::new(table))
}

/// Log the route listing shown at startup.
pub fn log_route_table(dir: &Path, table: &RoutingTable) {
    tracing::info!(spec_dir = %dir.display(), routes = table.len(), "Routes loaded");
    for (key, entry) in table.routes() {
        tracing::info!(
            method = %key.method,
            path = %key.path,
            matches = entry.matches.len(),
            "Route"
        );
    }
}

/// Start serving `config`. Background tasks stop when `shutdown` triggers.
pub async fn start(config: MockConfig, shutdown: &Shutdown) -> Result<Running, StartupError> {
    let routes = load_initial_routes(&config.specs.dir)?;

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;
    let local_addr = listener.local_addr().map_err(|source| StartupError::Bind {
        address: config.listener.bind_address.clone(),
        source,
    })?;

    let watcher = if config.specs.reload {
        let watcher = ReloadWatcher::new(
            &config.specs.dir,
            Duration::from_millis(config.specs.poll_interval_ms),
            routes.clone(),
        )
        .await;
        tracing::info!("Watching for changes...");
        Some(watcher.spawn(shutdown.subscribe()))
    } else {
        None
    };

    let server = MockServer::new(config, routes.clone());
    let server = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tracing::info!(address = %local_addr, "mockpath listening on http://{}", local_addr);
    Ok(Running {
        local_addr,
        routes,
        server,
        watcher,
    })
}
