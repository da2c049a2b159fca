//! Spec directory watcher for hot reload.
//!
//! Polls the spec root on a fixed interval, compares a snapshot of
//! `.yaml` / `.json` modification times against the previous one, and on any
//! difference reloads the whole tree and publishes it. A failed reload leaves
//! the current table live; the rejected state is not retried until the files
//! change again.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::observability::metrics;
use crate::routing::table::SharedRoutes;
use crate::spec::loader::{list_files, load_table, SpecLoadError};

/// Last-modified time of every watched file under the spec root.
pub type Snapshot = BTreeMap<PathBuf, SystemTime>;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Take a snapshot of `.yaml` / `.json` files under `root`.
pub fn scan(root: &Path) -> Result<Snapshot, SpecLoadError> {
    let mut snapshot = Snapshot::new();
    for path in list_files(root, &["yaml", "json"])? {
        match fs::metadata(&path).and_then(|meta| meta.modified()) {
            Ok(modified) => {
                snapshot.insert(path, modified);
            }
            // Removed between listing and stat; the next scan settles it.
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(SpecLoadError::Io { path, source }),
        }
    }
    Ok(snapshot)
}

/// Run `scan` on the blocking pool.
async fn scan_blocking(root: &Path) -> Result<Snapshot, SpecLoadError> {
    let owned = root.to_path_buf();
    tokio::task::spawn_blocking(move || scan(&owned))
        .await
        .unwrap_or_else(|e| {
            Err(SpecLoadError::Io {
                path: root.to_path_buf(),
                source: io::Error::other(e),
            })
        })
}

/// Result of a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Snapshot identical to the previous one.
    Unchanged,
    /// New table published.
    Reloaded { routes: usize, generation: u64 },
    /// Files changed but the new tree failed to load; current table kept.
    Rejected,
    /// The directory could not be scanned; retried on the next tick.
    ScanFailed,
}

/// Background task that keeps `SharedRoutes` in sync with the spec root.
pub struct ReloadWatcher {
    root: PathBuf,
    interval: Duration,
    routes: SharedRoutes,
    snapshot: Snapshot,
}

impl ReloadWatcher {
    /// Create a watcher. The baseline snapshot is taken immediately, on the
    /// blocking pool, so call this right after the initial load.
    pub async fn new(root: impl Into<PathBuf>, interval: Duration, routes: SharedRoutes) -> Self {
        let root = root.into();
        let snapshot = scan_blocking(&root).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Initial spec scan failed, first successful scan will reload");
            Snapshot::new()
        });

        Self {
            root,
            interval: interval.max(MIN_INTERVAL),
            routes,
            snapshot,
        }
    }

    /// Scan once and reload if anything changed.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let current = match scan_blocking(&self.root).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Spec scan failed, retrying next interval");
                metrics::record_reload("scan_failed");
                return PollOutcome::ScanFailed;
            }
        };

        if current == self.snapshot {
            return PollOutcome::Unchanged;
        }
        self.snapshot = current;
        tracing::info!(root = %self.root.display(), "Spec change detected, reloading...");

        let root = self.root.clone();
        match tokio::task::spawn_blocking(move || load_table(&root)).await {
            Ok(Ok(table)) => {
                let routes = table.len();
                let generation = self.routes.publish(table);
                metrics::record_reload("success");
                metrics::record_route_count(routes);
                tracing::info!(generation, routes, "Specs reloaded");
                PollOutcome::Reloaded { routes, generation }
            }
            Ok(Err(e)) => {
                metrics::record_reload("rejected");
                tracing::error!("Failed to reload specs: {}. Keeping current routes.", e);
                PollOutcome::Rejected
            }
            Err(e) => {
                metrics::record_reload("rejected");
                tracing::error!(error = %e, "Spec reload task failed. Keeping current routes.");
                PollOutcome::Rejected
            }
        }
    }

    /// Poll until shutdown is signalled or the shutdown sender is dropped.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            root = %self.root.display(),
            interval_ms = self.interval.as_millis() as u64,
            "Reload watcher started"
        );

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Reload watcher received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
