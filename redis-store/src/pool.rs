//! Bounded connection pool
//!
//! The pool owns every connection to the store. Construction pre-opens the
//! minimum-idle floor and validates reachability with a time-bounded
//! liveness probe; afterwards each request leases one connection for a
//! single round trip. Capacity is enforced with a semaphore sized to the
//! configured pool size, so at most `pool.size` requests are in flight at
//! once and the rest wait, bounded by the acquire timeout.

use crate::connection::Connection;
use redis_store_core::{RespValue, StoreConfig, StoreError, StoreResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, info};

/// Contract value: construction must observe a probe reply within this
/// window or fail without returning a client.
const LIVENESS_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Bounded pool of store connections.
pub struct Pool {
    config: StoreConfig,
    idle: Mutex<Vec<Connection>>,
    slots: Arc<Semaphore>,
    closed: AtomicBool,
}

impl Pool {
    /// Open the initial connections and probe the store for liveness.
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        let initial = config.pool.min_idle.clamp(1, config.pool.size);
        let mut conns = Vec::with_capacity(initial);
        for _ in 0..initial {
            conns.push(Connection::open(&config).await?);
        }

        if let Some(conn) = conns.last_mut() {
            timeout(LIVENESS_PROBE_TIMEOUT, conn.ping())
                .await
                .map_err(|_| StoreError::Connection("liveness probe timed out".to_string()))?
                .map_err(|e| StoreError::Connection(format!("liveness probe failed: {e}")))?;
        }

        info!(
            addr = %config.addr,
            pool_size = config.pool.size,
            idle = initial,
            "connected to store"
        );

        Ok(Self {
            slots: Arc::new(Semaphore::new(config.pool.size)),
            idle: Mutex::new(conns),
            config,
            closed: AtomicBool::new(false),
        })
    }

    /// Lease a connection, run one request, and return the connection
    /// unless it was damaged in flight.
    pub async fn request(&self, command: &str, args: &[RespValue]) -> StoreResult<RespValue> {
        if self.is_closed() {
            return Err(closed_error());
        }

        let permit = match timeout(
            self.config.pool.acquire_timeout,
            self.slots.clone().acquire_owned(),
        )
        .await
        {
            Err(_) => {
                return Err(StoreError::Unavailable(
                    "timed out waiting for a pool connection".to_string(),
                ))
            }
            // The semaphore only closes when the pool does.
            Ok(Err(_)) => return Err(closed_error()),
            Ok(Ok(permit)) => permit,
        };

        let mut conn = match self.checkout() {
            Some(conn) => conn,
            None => Connection::open(&self.config)
                .await
                .map_err(StoreError::into_operational)?,
        };

        debug!(command, "store request");
        let result = conn.request(command, args).await;

        if conn.is_broken() {
            debug!(command, "discarding broken connection");
        } else if !self.is_closed() {
            self.checkin(conn);
        }
        drop(permit);

        result
    }

    /// Close the pool, dropping every idle connection. Idempotent; pending
    /// and later requests fail fast.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.slots.close();
        if let Ok(mut idle) = self.idle.lock() {
            idle.clear();
        }
        info!(addr = %self.config.addr, "store connection pool closed");
    }

    /// Whether [`Pool::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// The configuration this pool was built from.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn checkout(&self) -> Option<Connection> {
        self.idle.lock().ok().and_then(|mut idle| idle.pop())
    }

    fn checkin(&self, conn: Connection) {
        if let Ok(mut idle) = self.idle.lock() {
            idle.push(conn);
        }
    }
}

fn closed_error() -> StoreError {
    StoreError::Unavailable("store client is closed".to_string())
}
