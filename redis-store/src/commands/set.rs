//! Command builders for unordered set operations

use super::Command;
use redis_store_core::{RespValue, StoreError, StoreResult};
use std::collections::HashSet;

/// SADD command - idempotent union; duplicates are no-ops.
#[derive(Debug, Clone)]
pub struct SAddCommand {
    key: String,
    members: Vec<String>,
}

impl SAddCommand {
    /// Create a new SADD command.
    pub fn new(key: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            key: key.into(),
            members,
        }
    }
}

impl Command for SAddCommand {
    type Output = i64;

    fn name(&self) -> &'static str {
        "SADD"
    }

    fn args(&self) -> Vec<RespValue> {
        member_args(&self.key, &self.members)
    }

    fn parse(&self, reply: RespValue) -> StoreResult<i64> {
        reply.into_int()
    }
}

/// SREM command - removing absent members is a no-op.
#[derive(Debug, Clone)]
pub struct SRemCommand {
    key: String,
    members: Vec<String>,
}

impl SRemCommand {
    /// Create a new SREM command.
    pub fn new(key: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            key: key.into(),
            members,
        }
    }
}

impl Command for SRemCommand {
    type Output = i64;

    fn name(&self) -> &'static str {
        "SREM"
    }

    fn args(&self) -> Vec<RespValue> {
        member_args(&self.key, &self.members)
    }

    fn parse(&self, reply: RespValue) -> StoreResult<i64> {
        reply.into_int()
    }
}

/// SMEMBERS command - membership only, no order guarantee.
#[derive(Debug, Clone)]
pub struct SMembersCommand {
    key: String,
}

impl SMembersCommand {
    /// Create a new SMEMBERS command.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Command for SMembersCommand {
    type Output = HashSet<String>;

    fn name(&self) -> &'static str {
        "SMEMBERS"
    }

    fn args(&self) -> Vec<RespValue> {
        vec![RespValue::from(self.key.as_str())]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<HashSet<String>> {
        reply.into_string_set()
    }
}

/// SISMEMBER command
#[derive(Debug, Clone)]
pub struct SIsMemberCommand {
    key: String,
    member: String,
}

impl SIsMemberCommand {
    /// Create a new SISMEMBER command.
    pub fn new(key: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            member: member.into(),
        }
    }
}

impl Command for SIsMemberCommand {
    type Output = bool;

    fn name(&self) -> &'static str {
        "SISMEMBER"
    }

    fn args(&self) -> Vec<RespValue> {
        vec![
            RespValue::from(self.key.as_str()),
            RespValue::from(self.member.as_str()),
        ]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<bool> {
        Ok(reply.into_int()? != 0)
    }
}

/// SCARD command
#[derive(Debug, Clone)]
pub struct SCardCommand {
    key: String,
}

impl SCardCommand {
    /// Create a new SCARD command.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Command for SCardCommand {
    type Output = i64;

    fn name(&self) -> &'static str {
        "SCARD"
    }

    fn args(&self) -> Vec<RespValue> {
        vec![RespValue::from(self.key.as_str())]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<i64> {
        reply.into_int()
    }
}

/// SRANDMEMBER command - picking from an empty set is a distinct
/// empty-collection condition.
#[derive(Debug, Clone)]
pub struct SRandMemberCommand {
    key: String,
}

impl SRandMemberCommand {
    /// Create a new SRANDMEMBER command.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Command for SRandMemberCommand {
    type Output = String;

    fn name(&self) -> &'static str {
        "SRANDMEMBER"
    }

    fn args(&self) -> Vec<RespValue> {
        vec![RespValue::from(self.key.as_str())]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<String> {
        if reply.is_null() {
            return Err(StoreError::EmptyCollection(format!(
                "set {} is empty",
                self.key
            )));
        }
        reply.into_string()
    }
}

fn member_args(key: &str, members: &[String]) -> Vec<RespValue> {
    let mut args = Vec::with_capacity(1 + members.len());
    args.push(RespValue::from(key));
    args.extend(members.iter().map(|m| RespValue::from(m.as_str())));
    args
}
