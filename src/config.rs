//! Configuration for Wayfarer
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, WayfarerError};

/// Smallest receive buffer that still fits a request line and headers
pub const MIN_BUFFER_SIZE: usize = 256;

/// Main configuration for a Wayfarer instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Data Configuration
    // -------------------------------------------------------------------------
    /// Directory (or `.zip` archive of the same files) holding the initial dataset
    ///   {data_dir}/
    ///     ├── users_*.json
    ///     ├── locations_*.json
    ///     ├── visits_*.json
    ///     └── options.txt      (optional: reference timestamp on line 1)
    pub data_dir: Option<PathBuf>,

    /// Reference "current time" (unix seconds) used to derive ages.
    /// Overrides `options.txt`; falls back to the startup clock when neither is set.
    pub now: Option<i64>,

    /// Extra slots allocated past the highest loaded id in every table
    pub table_headroom: usize,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Value of the `Server` response header
    pub server_name: String,

    /// Number of pooled request slots kept for reuse
    pub pool_size: usize,

    /// Receive buffer size per request (one read = one request)
    pub buffer_size: usize,

    /// Connection read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Runtime Configuration
    // -------------------------------------------------------------------------
    /// Tokio worker threads (0 = one per core)
    pub worker_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            now: None,
            table_headroom: 200_000,
            listen_addr: "0.0.0.0:80".to_string(),
            server_name: "wayfarer".to_string(),
            pool_size: 1024,
            buffer_size: 4 * 1024, // 4 KB
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            worker_threads: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.listen_addr.is_empty() {
            return Err(WayfarerError::Config("listen address is empty".to_string()));
        }
        if self.buffer_size < MIN_BUFFER_SIZE {
            return Err(WayfarerError::Config(format!(
                "buffer size {} is below the minimum of {} bytes",
                self.buffer_size, MIN_BUFFER_SIZE
            )));
        }
        if self.pool_size == 0 {
            return Err(WayfarerError::Config("pool size must be at least 1".to_string()));
        }
        if self.server_name.contains(|c: char| c == '\r' || c == '\n') {
            return Err(WayfarerError::Config("server name must be a single line".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the directory to load the initial dataset from
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = Some(path.into());
        self
    }

    /// Pin the reference timestamp used for age derivation
    pub fn now(mut self, timestamp: i64) -> Self {
        self.config.now = Some(timestamp);
        self
    }

    /// Set the number of spare slots per entity table
    pub fn table_headroom(mut self, slots: usize) -> Self {
        self.config.table_headroom = slots;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the `Server` header value
    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.config.server_name = name.into();
        self
    }

    /// Set the number of pooled request slots
    pub fn pool_size(mut self, count: usize) -> Self {
        self.config.pool_size = count;
        self
    }

    /// Set the per-request receive buffer size (in bytes)
    pub fn buffer_size(mut self, bytes: usize) -> Self {
        self.config.buffer_size = bytes;
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

    /// Set the number of runtime worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
