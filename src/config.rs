//! Configuration for fdfs-client
//!
//! Centralized configuration with sensible defaults. Loading it from files or
//! the environment is left to the embedding application.

use std::time::Duration;

use crate::error::{FdfsError, Result};

/// Default tracker port used by FastDFS-style trackers
pub const DEFAULT_TRACKER_PORT: u16 = 22122;

/// Main configuration for a client instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Tracker Cluster
    // -------------------------------------------------------------------------
    /// Tracker hosts; every pooled connection dials one of these at random
    pub tracker_hosts: Vec<String>,

    /// Port shared by every tracker host
    pub tracker_port: u16,

    // -------------------------------------------------------------------------
    // Pool Configuration
    // -------------------------------------------------------------------------
    /// Connections opened eagerly when the pool is built
    pub min_connections: usize,

    /// Hard cap on live tracker connections (idle + in use)
    pub max_connections: usize,

    // -------------------------------------------------------------------------
    // Timeouts
    // -------------------------------------------------------------------------
    /// Dial timeout for tracker and storage connections (milliseconds)
    pub dial_timeout_ms: u64,

    /// Socket read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracker_hosts: vec!["127.0.0.1".to_string()],
            tracker_port: DEFAULT_TRACKER_PORT,
            min_connections: 0,
            max_connections: 64,
            dial_timeout_ms: 60_000,
            read_timeout_ms: 30_000,
            write_timeout_ms: 30_000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the pool settings before anything is dialed
    pub fn validate(&self) -> Result<()> {
        if self.tracker_hosts.is_empty() {
            return Err(FdfsError::Config("no tracker hosts configured".to_string()));
        }
        if self.max_connections == 0 {
            return Err(FdfsError::Config(
                "max_connections must be greater than zero".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(FdfsError::Config(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        if self.dial_timeout_ms == 0 {
            return Err(FdfsError::Config(
                "dial_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Timeouts applied to every socket this client opens
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            dial: Duration::from_millis(self.dial_timeout_ms),
            read: non_zero_millis(self.read_timeout_ms),
            write: non_zero_millis(self.write_timeout_ms),
        }
    }
}

fn non_zero_millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Socket timeouts shared by pooled and direct connections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub dial: Duration,
    pub read: Option<Duration>,
    pub write: Option<Duration>,
}

impl Default for Timeouts {
    fn default() -> Self {
        Config::default().timeouts()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Replace the tracker host list
    pub fn tracker_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.tracker_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Set the tracker port
    pub fn tracker_port(mut self, port: u16) -> Self {
        self.config.tracker_port = port;
        self
    }

    /// Set the number of connections opened at construction
    pub fn min_connections(mut self, count: usize) -> Self {
        self.config.min_connections = count;
        self
    }

    /// Set the maximum number of live tracker connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the dial timeout (in milliseconds)
    pub fn dial_timeout_ms(mut self, ms: u64) -> Self {
        self.config.dial_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
