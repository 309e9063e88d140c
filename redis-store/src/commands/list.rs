//! Command builders for list operations

use super::Command;
use redis_store_core::{RespValue, StoreError, StoreResult};

/// RPUSH command - append values at the tail, preserving call order.
#[derive(Debug, Clone)]
pub struct RPushCommand {
    key: String,
    values: Vec<String>,
}

impl RPushCommand {
    /// Create a new RPUSH command.
    pub fn new(key: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            key: key.into(),
            values,
        }
    }
}

impl Command for RPushCommand {
    type Output = i64;

    fn name(&self) -> &'static str {
        "RPUSH"
    }

    fn args(&self) -> Vec<RespValue> {
        let mut args = Vec::with_capacity(1 + self.values.len());
        args.push(RespValue::from(self.key.as_str()));
        args.extend(self.values.iter().map(|v| RespValue::from(v.as_str())));
        args
    }

    fn parse(&self, reply: RespValue) -> StoreResult<i64> {
        reply.into_int()
    }
}

/// LPOP command - popping an empty or absent list is a distinct
/// empty-collection condition, not a generic miss.
#[derive(Debug, Clone)]
pub struct LPopCommand {
    key: String,
}

impl LPopCommand {
    /// Create a new LPOP command.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Command for LPopCommand {
    type Output = String;

    fn name(&self) -> &'static str {
        "LPOP"
    }

    fn args(&self) -> Vec<RespValue> {
        vec![RespValue::from(self.key.as_str())]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<String> {
        if reply.is_null() {
            return Err(StoreError::EmptyCollection(format!(
                "list {} is empty",
                self.key
            )));
        }
        reply.into_string()
    }
}

/// LLEN command - 0 for an absent key.
#[derive(Debug, Clone)]
pub struct LLenCommand {
    key: String,
}

impl LLenCommand {
    /// Create a new LLEN command.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Command for LLenCommand {
    type Output = i64;

    fn name(&self) -> &'static str {
        "LLEN"
    }

    fn args(&self) -> Vec<RespValue> {
        vec![RespValue::from(self.key.as_str())]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<i64> {
        reply.into_int()
    }
}

/// LRANGE command - inclusive zero-based range, negative indices from the
/// tail, out-of-range bounds clamped by the store.
#[derive(Debug, Clone)]
pub struct LRangeCommand {
    key: String,
    start: i64,
    stop: i64,
}

impl LRangeCommand {
    /// Create a new LRANGE command.
    pub fn new(key: impl Into<String>, start: i64, stop: i64) -> Self {
        Self {
            key: key.into(),
            start,
            stop,
        }
    }
}

impl Command for LRangeCommand {
    type Output = Vec<String>;

    fn name(&self) -> &'static str {
        "LRANGE"
    }

    fn args(&self) -> Vec<RespValue> {
        vec![
            RespValue::from(self.key.as_str()),
            RespValue::from(self.start),
            RespValue::from(self.stop),
        ]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<Vec<String>> {
        reply.into_string_vec()
    }
}
