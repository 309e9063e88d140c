//! Command builders for hash map operations

use super::Command;
use redis_store_core::{RespValue, StoreError, StoreResult};
use std::collections::HashMap;

/// HSET command - upserts each field independently, leaving other fields
/// untouched.
#[derive(Debug, Clone)]
pub struct HSetCommand {
    key: String,
    pairs: Vec<(String, String)>,
}

impl HSetCommand {
    /// Create a new HSET command.
    pub fn new(key: impl Into<String>, pairs: Vec<(String, String)>) -> Self {
        Self {
            key: key.into(),
            pairs,
        }
    }
}

impl Command for HSetCommand {
    type Output = i64;

    fn name(&self) -> &'static str {
        "HSET"
    }

    fn args(&self) -> Vec<RespValue> {
        let mut args = Vec::with_capacity(1 + 2 * self.pairs.len());
        args.push(RespValue::from(self.key.as_str()));
        for (field, value) in &self.pairs {
            args.push(RespValue::from(field.as_str()));
            args.push(RespValue::from(value.as_str()));
        }
        args
    }

    fn parse(&self, reply: RespValue) -> StoreResult<i64> {
        reply.into_int()
    }
}

/// HGETALL command - an absent key is an empty mapping, not an error.
#[derive(Debug, Clone)]
pub struct HGetAllCommand {
    key: String,
}

impl HGetAllCommand {
    /// Create a new HGETALL command.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Command for HGetAllCommand {
    type Output = HashMap<String, String>;

    fn name(&self) -> &'static str {
        "HGETALL"
    }

    fn args(&self) -> Vec<RespValue> {
        vec![RespValue::from(self.key.as_str())]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<HashMap<String, String>> {
        if reply.is_null() {
            return Ok(HashMap::new());
        }
        reply.into_string_map()
    }
}

/// HGET command - a missing key or field is a distinct not-found
/// condition.
#[derive(Debug, Clone)]
pub struct HGetCommand {
    key: String,
    field: String,
}

impl HGetCommand {
    /// Create a new HGET command.
    pub fn new(key: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            field: field.into(),
        }
    }
}

impl Command for HGetCommand {
    type Output = String;

    fn name(&self) -> &'static str {
        "HGET"
    }

    fn args(&self) -> Vec<RespValue> {
        vec![
            RespValue::from(self.key.as_str()),
            RespValue::from(self.field.as_str()),
        ]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<String> {
        if reply.is_null() {
            return Err(StoreError::NotFound(format!(
                "field {} in hash {}",
                self.field, self.key
            )));
        }
        reply.into_string()
    }
}
