//! Command-line interface.
//!
//! Flags override values from the optional `--config` file, which in turn
//! override built-in defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::{read_config, ConfigError, LogFormat, MockConfig};

#[derive(Debug, Parser)]
#[command(name = "mockpath", version)]
#[command(about = "Lightweight HTTP mock server: directory structure as URL paths", long_about = None)]
pub struct Cli {
    /// Port to listen on.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Spec directory.
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Watch for file changes and auto-reload.
    #[arg(long)]
    pub reload: bool,

    /// Optional TOML config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Reload poll interval in milliseconds.
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Log output format.
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,
}

impl Cli {
    /// Build the effective configuration. Does not validate.
    pub fn into_config(self) -> Result<MockConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => MockConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(self, config: &mut MockConfig) {
        if let Some(port) = self.port {
            config.listener.set_port(port);
        }
        if let Some(dir) = self.dir {
            config.specs.dir = dir;
        }
        if self.reload {
            config.specs.reload = true;
        }
        if let Some(interval) = self.poll_interval_ms {
            config.specs.poll_interval_ms = interval;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
        if let Some(addr) = self.metrics_addr {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = addr.to_string();
        }
    }
}
