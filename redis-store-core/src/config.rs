//! Configuration for the store client

use crate::error::{StoreError, StoreResult};
use std::time::Duration;

/// Configuration for connection pooling
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of live connections
    pub size: usize,
    /// Number of connections opened up-front and kept idle
    pub min_idle: usize,
    /// How long an operation may wait for a free pool slot
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: 10,
            min_idle: 2,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Configuration for the store client.
///
/// Supplied once at construction and never mutated afterwards; every field
/// has a working default except the address.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store address as `host:port`. A `redis://` scheme prefix is accepted
    /// and stripped; the port defaults to 6379 when omitted.
    pub addr: String,

    /// Optional password sent via `AUTH` right after dialing
    pub password: Option<String>,

    /// Database index selected after authentication
    pub database: u32,

    /// Pool settings
    pub pool: PoolConfig,

    /// How many times a transiently failed request is re-issued
    pub max_retries: u32,

    /// Smallest backoff between retry attempts
    pub retry_backoff_min: Duration,

    /// Largest backoff between retry attempts
    pub retry_backoff_max: Duration,

    /// Timeout for establishing a TCP connection
    pub dial_timeout: Duration,

    /// Timeout for reading one reply
    pub read_timeout: Duration,

    /// Timeout for writing one request
    pub write_timeout: Duration,

    /// TCP keepalive period, if any
    pub tcp_keepalive: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            addr: "localhost:6379".to_string(),
            password: None,
            database: 0,
            pool: PoolConfig::default(),
            max_retries: 3,
            retry_backoff_min: Duration::from_millis(8),
            retry_backoff_max: Duration::from_millis(512),
            dial_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(3),
            write_timeout: Duration::from_secs(3),
            tcp_keepalive: Some(Duration::from_secs(60)),
        }
    }
}

impl StoreConfig {
    /// Create a configuration for the given address.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Set the password used for `AUTH`.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the database index.
    pub fn with_database(mut self, database: u32) -> Self {
        self.database = database;
        self
    }

    /// Set the pool configuration.
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Set the maximum retry count for transient failures.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the dial timeout.
    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    /// Set the read and write timeouts together.
    pub fn with_io_timeouts(mut self, read: Duration, write: Duration) -> Self {
        self.read_timeout = read;
        self.write_timeout = write;
        self
    }

    /// Check the construction invariants without touching the network.
    pub fn validate(&self) -> StoreResult<()> {
        if self.addr.trim().is_empty() {
            return Err(StoreError::InvalidArgument(
                "store address must not be empty".to_string(),
            ));
        }
        if self.pool.size < 1 {
            return Err(StoreError::InvalidArgument(
                "pool size must be at least 1".to_string(),
            ));
        }
        if self.pool.min_idle > self.pool.size {
            return Err(StoreError::InvalidArgument(format!(
                "min idle connections ({}) exceed pool size ({})",
                self.pool.min_idle, self.pool.size
            )));
        }
        Ok(())
    }

    /// Resolve the configured address into `(host, port)`.
    pub fn endpoint(&self) -> StoreResult<(String, u16)> {
        let addr = self.addr.trim();
        let addr = addr.strip_prefix("redis://").unwrap_or(addr);
        if addr.is_empty() {
            return Err(StoreError::InvalidArgument(
                "store address must not be empty".to_string(),
            ));
        }

        if let Some((host, port_str)) = addr.rsplit_once(':') {
            if let Ok(port) = port_str.parse::<u16>() {
                return Ok((host.to_string(), port));
            }
        }
        Ok((addr.to_string(), 6379))
    }
}
