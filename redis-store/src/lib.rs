//! Pooled Redis client facade
//!
//! `redis-store` exposes a uniform, error-classified operation set over a
//! remote Redis-protocol store, covering five data models: scalar strings,
//! lists, unordered sets, sorted sets, and hash maps. Callers get typed
//! results and one classified error taxonomy instead of connection,
//! retry, and reply-decoding details.
//!
//! # Features
//!
//! - Bounded connection pool with a time-bounded liveness probe at
//!   construction
//! - Per-direction dial/read/write timeouts; no operation blocks forever
//! - Transient failures retried with capped exponential backoff;
//!   application errors never retried
//! - Not-found, empty-collection, and type-mismatch conditions surfaced as
//!   distinct error kinds, never as raw protocol sentinels
//! - Per-operation cancellation and deadlines via scoped client handles
//!
//! # Quick Start
//!
//! ```no_run
//! use redis_store::{Client, StoreConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::new("localhost:6379");
//!     let client = Client::connect(config).await?;
//!
//!     client.set("greeting", "hello", Duration::ZERO).await?;
//!     let value = client.get("greeting").await?;
//!     println!("greeting = {value}");
//!
//!     client.close();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod client;
pub mod commands;
pub mod connection;
pub mod pool;
pub mod protocol;

pub use client::Client;
pub use redis_store_core::{
    PoolConfig, RespValue, ScoreBound, ScoredMember, StoreConfig, StoreError, StoreResult,
};
pub use tokio_util::sync::CancellationToken;
