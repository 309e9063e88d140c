//! Command builders for sorted set operations

use super::Command;
use redis_store_core::{RespValue, ScoreBound, ScoredMember, StoreError, StoreResult};

/// Check a score range precondition before anything touches the network.
///
/// Open-ended sentinels order below/above every literal score, so
/// `-inf..=x` and `x..=+inf` are always valid.
pub fn validate_score_range(min: &ScoreBound, max: &ScoreBound) -> StoreResult<()> {
    if min.le(max) {
        Ok(())
    } else {
        Err(StoreError::InvalidArgument(format!(
            "score range min ({min}) exceeds max ({max})"
        )))
    }
}

/// ZADD command - inserts new members or updates the score of existing
/// ones.
#[derive(Debug, Clone)]
pub struct ZAddCommand {
    key: String,
    members: Vec<ScoredMember>,
}

impl ZAddCommand {
    /// Create a new ZADD command.
    pub fn new(key: impl Into<String>, members: Vec<ScoredMember>) -> Self {
        Self {
            key: key.into(),
            members,
        }
    }
}

impl Command for ZAddCommand {
    type Output = i64;

    fn name(&self) -> &'static str {
        "ZADD"
    }

    fn args(&self) -> Vec<RespValue> {
        let mut args = Vec::with_capacity(1 + 2 * self.members.len());
        args.push(RespValue::from(self.key.as_str()));
        for entry in &self.members {
            args.push(RespValue::from(entry.score));
            args.push(RespValue::from(entry.member.as_str()));
        }
        args
    }

    fn parse(&self, reply: RespValue) -> StoreResult<i64> {
        reply.into_int()
    }
}

/// ZREM command - absent members are no-ops.
#[derive(Debug, Clone)]
pub struct ZRemCommand {
    key: String,
    members: Vec<String>,
}

impl ZRemCommand {
    /// Create a new ZREM command.
    pub fn new(key: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            key: key.into(),
            members,
        }
    }
}

impl Command for ZRemCommand {
    type Output = i64;

    fn name(&self) -> &'static str {
        "ZREM"
    }

    fn args(&self) -> Vec<RespValue> {
        let mut args = Vec::with_capacity(1 + self.members.len());
        args.push(RespValue::from(self.key.as_str()));
        args.extend(self.members.iter().map(|m| RespValue::from(m.as_str())));
        args
    }

    fn parse(&self, reply: RespValue) -> StoreResult<i64> {
        reply.into_int()
    }
}

/// ZRANGE / ZREVRANGE command - rank range with list-style indexing.
#[derive(Debug, Clone)]
pub struct ZRangeCommand {
    key: String,
    start: i64,
    stop: i64,
    rev: bool,
}

impl ZRangeCommand {
    /// Ascending-by-score range.
    pub fn new(key: impl Into<String>, start: i64, stop: i64) -> Self {
        Self {
            key: key.into(),
            start,
            stop,
            rev: false,
        }
    }

    /// Descending-by-score range.
    pub fn rev(key: impl Into<String>, start: i64, stop: i64) -> Self {
        Self {
            key: key.into(),
            start,
            stop,
            rev: true,
        }
    }
}

impl Command for ZRangeCommand {
    type Output = Vec<String>;

    fn name(&self) -> &'static str {
        if self.rev {
            "ZREVRANGE"
        } else {
            "ZRANGE"
        }
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

/// ZCARD command
#[derive(Debug, Clone)]
pub struct ZCardCommand {
    key: String,
}

impl ZCardCommand {
    /// Create a new ZCARD command.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Command for ZCardCommand {
    type Output = i64;

    fn name(&self) -> &'static str {
        "ZCARD"
    }

    fn args(&self) -> Vec<RespValue> {
        vec![RespValue::from(self.key.as_str())]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<i64> {
        reply.into_int()
    }
}

/// ZRANGEBYSCORE / ZREVRANGEBYSCORE command - members with scores in an
/// inclusive `[min, max]` band, windowed by offset/count.
///
/// The `LIMIT` clause is omitted when both offset and count are zero,
/// which is the "whole band" window.
#[derive(Debug, Clone)]
pub struct ZRangeByScoreCommand {
    key: String,
    min: ScoreBound,
    max: ScoreBound,
    offset: i64,
    count: i64,
    rev: bool,
}

impl ZRangeByScoreCommand {
    /// Ascending-by-score band query.
    pub fn new(
        key: impl Into<String>,
        min: ScoreBound,
        max: ScoreBound,
        offset: i64,
        count: i64,
    ) -> Self {
        Self {
            key: key.into(),
            min,
            max,
            offset,
            count,
            rev: false,
        }
    }

    /// Descending-by-score band query.
    pub fn rev(
        key: impl Into<String>,
        min: ScoreBound,
        max: ScoreBound,
        offset: i64,
        count: i64,
    ) -> Self {
        Self {
            key: key.into(),
            min,
            max,
            offset,
            count,
            rev: true,
        }
    }
}

impl Command for ZRangeByScoreCommand {
    type Output = Vec<String>;

    fn name(&self) -> &'static str {
        if self.rev {
            "ZREVRANGEBYSCORE"
        } else {
            "ZRANGEBYSCORE"
        }
    }

    fn args(&self) -> Vec<RespValue> {
        // The descending form takes its bounds in max, min order.
        let mut args = if self.rev {
            vec![
                RespValue::from(self.key.as_str()),
                RespValue::from(self.max.to_string()),
                RespValue::from(self.min.to_string()),
            ]
        } else {
            vec![
                RespValue::from(self.key.as_str()),
                RespValue::from(self.min.to_string()),
                RespValue::from(self.max.to_string()),
            ]
        };
        if self.offset != 0 || self.count != 0 {
            args.push(RespValue::from("LIMIT"));
            args.push(RespValue::from(self.offset));
            args.push(RespValue::from(self.count));
        }
        args
    }

    fn parse(&self, reply: RespValue) -> StoreResult<Vec<String>> {
        reply.into_string_vec()
    }
}

/// ZSCORE command
#[derive(Debug, Clone)]
pub struct ZScoreCommand {
    key: String,
    member: String,
}

impl ZScoreCommand {
    /// Create a new ZSCORE command.
    pub fn new(key: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            member: member.into(),
        }
    }
}

impl Command for ZScoreCommand {
    type Output = f64;

    fn name(&self) -> &'static str {
        "ZSCORE"
    }

    fn args(&self) -> Vec<RespValue> {
        vec![
            RespValue::from(self.key.as_str()),
            RespValue::from(self.member.as_str()),
        ]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<f64> {
        if reply.is_null() {
            return Err(StoreError::NotFound(format!(
                "member {} in sorted set {}",
                self.member, self.key
            )));
        }
        reply.into_float()
    }
}

/// ZINCRBY command - creates the member at the delta when absent.
#[derive(Debug, Clone)]
pub struct ZIncrByCommand {
    key: String,
    member: String,
    delta: f64,
}

impl ZIncrByCommand {
    /// Create a new ZINCRBY command.
    pub fn new(key: impl Into<String>, member: impl Into<String>, delta: f64) -> Self {
        Self {
            key: key.into(),
            member: member.into(),
            delta,
        }
    }
}

impl Command for ZIncrByCommand {
    type Output = f64;

    fn name(&self) -> &'static str {
        "ZINCRBY"
    }

    fn args(&self) -> Vec<RespValue> {
        vec![
            RespValue::from(self.key.as_str()),
            RespValue::from(self.delta),
            RespValue::from(self.member.as_str()),
        ]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<f64> {
        reply.into_float()
    }
}

/// ZRANK / ZREVRANK command - 0-based rank by ascending or descending
/// score.
#[derive(Debug, Clone)]
pub struct ZRankCommand {
    key: String,
    member: String,
    rev: bool,
}

impl ZRankCommand {
    /// Rank by ascending score.
    pub fn new(key: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            member: member.into(),
            rev: false,
        }
    }

    /// Rank by descending score.
    pub fn rev(key: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            member: member.into(),
            rev: true,
        }
    }
}

impl Command for ZRankCommand {
    type Output = i64;

    fn name(&self) -> &'static str {
        if self.rev {
            "ZREVRANK"
        } else {
            "ZRANK"
        }
    }

    fn args(&self) -> Vec<RespValue> {
        vec![
            RespValue::from(self.key.as_str()),
            RespValue::from(self.member.as_str()),
        ]
    }

    fn parse(&self, reply: RespValue) -> StoreResult<i64> {
        if reply.is_null() {
            return Err(StoreError::NotFound(format!(
                "member {} in sorted set {}",
                self.member, self.key
            )));
        }
        reply.into_int()
    }
}
