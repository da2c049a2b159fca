//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::fs::{self, File};
use std::future::Future;
use std::path::Path;
use std::time::{Duration, SystemTime};

use mockpath::lifecycle::{self, Running, StartupError};
use mockpath::{MockConfig, Shutdown};
use tempfile::TempDir;

/// A spec directory on disk that lives as long as the test.
pub struct SpecTree {
    dir: TempDir,
}

impl SpecTree {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        self
    }

    /// Rewrite a file and push its mtime forward so coarse filesystem
    /// timestamps still register the change.
    pub fn rewrite(&self, rel: &str, content: &str, bump_secs: u64) {
        self.write(rel, content);
        let file = File::options()
            .write(true)
            .open(self.dir.path().join(rel))
            .unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(bump_secs))
            .unwrap();
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.dir.path().join(rel)).unwrap();
    }
}

/// A running server bound to an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub shutdown: Shutdown,
    pub running: Running,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.running.wait())
            .await
            .expect("server did not stop")
            .unwrap();
    }
}

pub fn config_for(tree: &SpecTree, reload: bool) -> MockConfig {
    let mut config = MockConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.specs.dir = tree.path().to_path_buf();
    config.specs.reload = reload;
    config.specs.poll_interval_ms = 50;
    config
}

pub async fn try_start(config: MockConfig) -> Result<TestServer, StartupError> {
    let shutdown = Shutdown::new();
    let running = lifecycle::start(config, &shutdown).await?;
    Ok(TestServer {
        base_url: format!("http://{}", running.local_addr),
        shutdown,
        running,
    })
}

pub async fn start(tree: &SpecTree, reload: bool) -> TestServer {
    try_start(config_for(tree, reload)).await.unwrap()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Poll `check` until it returns true or `timeout` passes.
pub async fn eventually<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    false
}
