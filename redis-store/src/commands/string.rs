//! Command builders for scalar string operations

use super::Command;
use redis_store_core::{RespValue, StoreError, StoreResult};
use std::time::Duration;

/// SET command - upsert a string value, optionally with a ttl.
///
/// A zero ttl means no expiration. Whole-second ttls go out as `EX`,
/// sub-second ones as `PX` so the resolution is not silently truncated.
#[derive(Debug, Clone)]
pub struct SetCommand {
    key: String,
    value: String,
    ttl: Duration,
}

impl SetCommand {
    /// Create a new SET command.
    pub fn new(key: impl Into<String>, value: impl Into<String>, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ttl,
        }
    }
}

impl Command for SetCommand {
    type Output = ();

    fn name(&self) -> &'static str {
        "SET"
    }

    fn args(&self) -> Vec<RespValue> {
        let mut args = vec![
            RespValue::from(self.key.as_str()),
            RespValue::from(self.value.as_str()),
        ];
        if !self.ttl.is_zero() {
            if self.ttl.subsec_millis() == 0 {
                args.push(RespValue::from("EX"));
                args.push(RespValue::from(self.ttl.as_secs().to_string()));
            } else {
                args.push(RespValue::from("PX"));
                args.push(RespValue::from(self.ttl.as_millis().to_string()));
            }
        }
        args
    }

    fn parse(&self, reply: RespValue) -> StoreResult<()> {
        match reply {
            RespValue::SimpleString(ref s) if s == "OK" => Ok(()),
            other => Err(StoreError::TypeMismatch(format!(
                "unexpected SET reply: {other:?}"
            ))),
        }
    }
}

/// GET command
#[derive(Debug, Clone)]
pub struct GetCommand {
    key: String,
}

impl GetCommand {
    /// Create a new GET command.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Command for GetCommand {
    type Output = String;

    fn name(&self) -> &'static str {
        "GET"
    }

    fn args(&self) -> Vec<RespValue> {
        vec![RespValue::from(self.key.as_str())]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<String> {
        if reply.is_null() {
            return Err(StoreError::NotFound(format!("key {}", self.key)));
        }
        reply.into_string()
    }
}

/// DEL command - removing an absent key is success, not an error.
#[derive(Debug, Clone)]
pub struct DelCommand {
    key: String,
}

impl DelCommand {
    /// Create a new DEL command.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Command for DelCommand {
    type Output = i64;

    fn name(&self) -> &'static str {
        "DEL"
    }

    fn args(&self) -> Vec<RespValue> {
        vec![RespValue::from(self.key.as_str())]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<i64> {
        reply.into_int()
    }
}

/// EXISTS command
#[derive(Debug, Clone)]
pub struct ExistsCommand {
    key: String,
}

impl ExistsCommand {
    /// Create a new EXISTS command.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Command for ExistsCommand {
    type Output = bool;

    fn name(&self) -> &'static str {
        "EXISTS"
    }

    fn args(&self) -> Vec<RespValue> {
        vec![RespValue::from(self.key.as_str())]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<bool> {
        Ok(reply.into_int()? > 0)
    }
}

/// INCR command - an absent key counts from zero.
#[derive(Debug, Clone)]
pub struct IncrCommand {
    key: String,
}

impl IncrCommand {
    /// Create a new INCR command.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Command for IncrCommand {
    type Output = i64;

    fn name(&self) -> &'static str {
        "INCR"
    }

    fn args(&self) -> Vec<RespValue> {
        vec![RespValue::from(self.key.as_str())]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<i64> {
        reply.into_int()
    }
}
