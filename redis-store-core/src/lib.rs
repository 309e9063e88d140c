//! Core types for the redis-store client facade
//!
//! This crate provides the configuration surface, error taxonomy, wire
//! value type, and domain types used throughout the redis-store client.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;
pub mod value;

pub use config::{PoolConfig, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use types::{ScoreBound, ScoredMember};
pub use value::RespValue;
