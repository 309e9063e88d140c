//! High-level store client
//!
//! This module provides the [`Client`] facade: one typed method per
//! logical operation, grouped by data model, backed by the shared
//! connection pool. Every method returns either a domain value or one
//! classified [`StoreError`] kind; transient failures are retried with
//! capped exponential backoff, application errors never are.

use crate::commands::{
    sorted_set::validate_score_range, Command, DelCommand, ExistsCommand, GetCommand,
    HGetAllCommand, HGetCommand, HSetCommand, IncrCommand, LLenCommand, LPopCommand,
    LRangeCommand, PingCommand, RPushCommand, SAddCommand, SCardCommand, SIsMemberCommand,
    SMembersCommand, SRandMemberCommand, SRemCommand, SetCommand, ZAddCommand, ZCardCommand,
    ZIncrByCommand, ZRangeByScoreCommand, ZRangeCommand, ZRankCommand, ZRemCommand, ZScoreCommand,
};
use crate::pool::Pool;
use redis_store_core::{
    RespValue, ScoreBound, ScoredMember, StoreConfig, StoreError, StoreResult,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// High-level store client.
///
/// Cloning is cheap; clones share the same connection pool, so a clone per
/// task is the intended concurrency model. [`Client::close`] releases the
/// shared pool for every clone.
///
/// # Example
///
/// ```no_run
/// use redis_store::{Client, StoreConfig};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = StoreConfig::new("localhost:6379");
///     let client = Client::connect(config).await?;
///
///     client.set("greeting", "hello", Duration::ZERO).await?;
///     let value = client.get("greeting").await?;
///     println!("greeting = {value}");
///
///     client.close();
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    pool: Arc<Pool>,
    cancel: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("cancel", &self.cancel)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Connect to the store.
    ///
    /// Validates the configuration locally, opens the minimum-idle floor of
    /// connections, and confirms liveness with a time-bounded probe. On any
    /// failure no client is returned.
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let pool = Pool::connect(config).await?;
        Ok(Self {
            pool: Arc::new(pool),
            cancel: None,
            deadline: None,
        })
    }

    /// A clone of this client whose operations abort with
    /// [`StoreError::Cancelled`] once `token` is cancelled.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
            cancel: Some(token),
            deadline: self.deadline,
        }
    }

    /// A clone of this client whose operations abort with
    /// [`StoreError::Cancelled`] once `deadline` passes.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
            cancel: self.cancel.clone(),
            deadline: Some(deadline),
        }
    }

    /// Release the connection pool. Idempotent; operations issued after
    /// the first close fail fast with [`StoreError::Unavailable`].
    pub fn close(&self) {
        self.pool.close();
    }

    /// Liveness probe against the store.
    pub async fn ping(&self) -> StoreResult<()> {
        self.execute(PingCommand).await
    }

    // Scalar operations

    /// Upsert a string value. A zero `ttl` means no expiration;
    /// pre-existing keys are overwritten without error.
    pub async fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        ttl: Duration,
    ) -> StoreResult<()> {
        self.execute(SetCommand::new(key, value, ttl)).await
    }

    /// Upsert a string value that always expires. A zero `ttl` is rejected
    /// with [`StoreError::InvalidArgument`] before any request is issued.
    pub async fn set_ex(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        ttl: Duration,
    ) -> StoreResult<()> {
        if ttl.is_zero() {
            return Err(StoreError::InvalidArgument(
                "expiring set requires a positive ttl".to_string(),
            ));
        }
        self.execute(SetCommand::new(key, value, ttl)).await
    }

    /// Get the value of a key. An absent key is [`StoreError::NotFound`],
    /// distinct from a failed request.
    pub async fn get(&self, key: impl Into<String>) -> StoreResult<String> {
        self.execute(GetCommand::new(key)).await
    }

    /// Delete a key. Deleting an absent key succeeds.
    pub async fn del(&self, key: impl Into<String>) -> StoreResult<()> {
        let removed = self.execute(DelCommand::new(key)).await?;
        debug!(removed, "delete finished");
        Ok(())
    }

    /// Whether the key currently exists, regardless of data model.
    pub async fn exists(&self, key: impl Into<String>) -> StoreResult<bool> {
        self.execute(ExistsCommand::new(key)).await
    }

    /// Atomically increment a numeric string value by one and return the
    /// new value. An absent key counts from zero; a non-numeric value is
    /// [`StoreError::TypeMismatch`].
    pub async fn incr(&self, key: impl Into<String>) -> StoreResult<i64> {
        self.execute(IncrCommand::new(key)).await
    }

    // List operations

    /// Append values at the tail of a list, preserving call order, and
    /// return the new length.
    pub async fn rpush(
        &self,
        key: impl Into<String>,
        values: Vec<String>,
    ) -> StoreResult<i64> {
        require_non_empty(&values, "rpush")?;
        self.execute(RPushCommand::new(key, values)).await
    }

    /// Remove and return the head element.
    /// [`StoreError::EmptyCollection`] when the list has no elements.
    pub async fn lpop(&self, key: impl Into<String>) -> StoreResult<String> {
        self.execute(LPopCommand::new(key)).await
    }

    /// Length of the list; 0 for an absent key.
    pub async fn llen(&self, key: impl Into<String>) -> StoreResult<i64> {
        self.execute(LLenCommand::new(key)).await
    }

    /// Inclusive range over zero-based indices. Negative indices count
    /// from the tail (`-1` is the last element) and out-of-range bounds
    /// clamp instead of erroring.
    pub async fn lrange(
        &self,
        key: impl Into<String>,
        start: i64,
        stop: i64,
    ) -> StoreResult<Vec<String>> {
        self.execute(LRangeCommand::new(key, start, stop)).await
    }

    // Unordered set operations

    /// Add members to a set and return how many were newly added.
    /// Duplicates, in the call or against existing members, are no-ops.
    pub async fn sadd(
        &self,
        key: impl Into<String>,
        members: Vec<String>,
    ) -> StoreResult<i64> {
        require_non_empty(&members, "sadd")?;
        self.execute(SAddCommand::new(key, members)).await
    }

    /// Remove members from a set and return how many were removed.
    /// Removing absent members is a no-op, not an error.
    pub async fn srem(
        &self,
        key: impl Into<String>,
        members: Vec<String>,
    ) -> StoreResult<i64> {
        require_non_empty(&members, "srem")?;
        self.execute(SRemCommand::new(key, members)).await
    }

    /// All members of a set; order is not guaranteed.
    pub async fn smembers(&self, key: impl Into<String>) -> StoreResult<HashSet<String>> {
        self.execute(SMembersCommand::new(key)).await
    }

    /// Whether `member` is in the set.
    pub async fn sismember(
        &self,
        key: impl Into<String>,
        member: impl Into<String>,
    ) -> StoreResult<bool> {
        self.execute(SIsMemberCommand::new(key, member)).await
    }

    /// Number of members in the set.
    pub async fn scard(&self, key: impl Into<String>) -> StoreResult<i64> {
        self.execute(SCardCommand::new(key)).await
    }

    /// A random member of the set. [`StoreError::EmptyCollection`] when
    /// the set is empty or absent.
    pub async fn srandmember(&self, key: impl Into<String>) -> StoreResult<String> {
        self.execute(SRandMemberCommand::new(key)).await
    }

    // Sorted set operations

    /// Insert members or update the scores of existing ones; returns how
    /// many members were newly inserted.
    pub async fn zadd(
        &self,
        key: impl Into<String>,
        members: Vec<ScoredMember>,
    ) -> StoreResult<i64> {
        require_non_empty(&members, "zadd")?;
        self.execute(ZAddCommand::new(key, members)).await
    }

    /// Remove members; absent members are no-ops.
    pub async fn zrem(
        &self,
        key: impl Into<String>,
        members: Vec<String>,
    ) -> StoreResult<i64> {
        require_non_empty(&members, "zrem")?;
        self.execute(ZRemCommand::new(key, members)).await
    }

    /// Members in rank order, ascending by score, with list-style
    /// inclusive indexing.
    pub async fn zrange(
        &self,
        key: impl Into<String>,
        start: i64,
        stop: i64,
    ) -> StoreResult<Vec<String>> {
        self.execute(ZRangeCommand::new(key, start, stop)).await
    }

    /// Members in rank order, descending by score.
    pub async fn zrevrange(
        &self,
        key: impl Into<String>,
        start: i64,
        stop: i64,
    ) -> StoreResult<Vec<String>> {
        self.execute(ZRangeCommand::rev(key, start, stop)).await
    }

    /// Number of members in the sorted set.
    pub async fn zcard(&self, key: impl Into<String>) -> StoreResult<i64> {
        self.execute(ZCardCommand::new(key)).await
    }

    /// Members with scores in `[min, max]` inclusive, ascending, windowed
    /// by `(start, stop)` over the matched subset. `min > max` is
    /// [`StoreError::InvalidArgument`], raised before any request.
    pub async fn zrange_by_score(
        &self,
        key: impl Into<String>,
        min: ScoreBound,
        max: ScoreBound,
        start: i64,
        stop: i64,
    ) -> StoreResult<Vec<String>> {
        validate_score_range(&min, &max)?;
        let (offset, count) = score_window(start, stop);
        self.execute(ZRangeByScoreCommand::new(key, min, max, offset, count))
            .await
    }

    /// Like [`Client::zrange_by_score`], descending.
    pub async fn zrevrange_by_score(
        &self,
        key: impl Into<String>,
        min: ScoreBound,
        max: ScoreBound,
        start: i64,
        stop: i64,
    ) -> StoreResult<Vec<String>> {
        validate_score_range(&min, &max)?;
        let (offset, count) = score_window(start, stop);
        self.execute(ZRangeByScoreCommand::rev(key, min, max, offset, count))
            .await
    }

    /// Score of a member. [`StoreError::NotFound`] when absent.
    pub async fn zscore(
        &self,
        key: impl Into<String>,
        member: impl Into<String>,
    ) -> StoreResult<f64> {
        self.execute(ZScoreCommand::new(key, member)).await
    }

    /// Add `delta` to a member's score and return the new score. An absent
    /// member is created with `delta` as its initial score.
    pub async fn zincr_by(
        &self,
        key: impl Into<String>,
        member: impl Into<String>,
        delta: f64,
    ) -> StoreResult<f64> {
        self.execute(ZIncrByCommand::new(key, member, delta)).await
    }

    /// 0-based rank by ascending score. [`StoreError::NotFound`] when the
    /// member is absent.
    pub async fn zrank(
        &self,
        key: impl Into<String>,
        member: impl Into<String>,
    ) -> StoreResult<i64> {
        self.execute(ZRankCommand::new(key, member)).await
    }

    /// 0-based rank by descending score.
    pub async fn zrevrank(
        &self,
        key: impl Into<String>,
        member: impl Into<String>,
    ) -> StoreResult<i64> {
        self.execute(ZRankCommand::rev(key, member)).await
    }

    // Hash map operations

    /// Upsert fields of a hash independently and return how many were
    /// newly created. Fields not named in `pairs` are untouched.
    pub async fn hset(
        &self,
        key: impl Into<String>,
        pairs: Vec<(String, String)>,
    ) -> StoreResult<i64> {
        require_non_empty(&pairs, "hset")?;
        self.execute(HSetCommand::new(key, pairs)).await
    }

    /// Full field-to-value mapping of a hash; empty when the key is
    /// absent.
    pub async fn hget_all(
        &self,
        key: impl Into<String>,
    ) -> StoreResult<HashMap<String, String>> {
        self.execute(HGetAllCommand::new(key)).await
    }

    /// Value of one hash field. [`StoreError::NotFound`] when the key or
    /// the field is absent.
    pub async fn hget(
        &self,
        key: impl Into<String>,
        field: impl Into<String>,
    ) -> StoreResult<String> {
        self.execute(HGetCommand::new(key, field)).await
    }

    /// Run a command under the cancellation/deadline guard and decode its
    /// reply.
    async fn execute<C: Command>(&self, command: C) -> StoreResult<C::Output> {
        let name = command.name();
        let args = command.args();
        let dispatch = self.dispatch(name, args);

        let reply = match (self.cancel.clone(), self.deadline) {
            (None, None) => dispatch.await,
            (Some(token), None) => tokio::select! {
                biased;
                () = token.cancelled() => Err(StoreError::Cancelled),
                reply = dispatch => reply,
            },
            (None, Some(at)) => timeout_at(at, dispatch)
                .await
                .unwrap_or(Err(StoreError::Cancelled)),
            (Some(token), Some(at)) => tokio::select! {
                biased;
                () = token.cancelled() => Err(StoreError::Cancelled),
                reply = timeout_at(at, dispatch) => {
                    reply.unwrap_or(Err(StoreError::Cancelled))
                }
            },
        }?;

        command.parse(reply)
    }

    /// Issue one request through the pool, re-issuing transient failures
    /// up to the configured retry budget with capped exponential backoff.
    async fn dispatch(&self, name: &'static str, args: Vec<RespValue>) -> StoreResult<RespValue> {
        let mut attempt: u32 = 0;
        loop {
            match self.pool.request(name, &args).await {
                Err(err)
                    if err.is_transient()
                        && !self.pool.is_closed()
                        && attempt < self.pool.config().max_retries =>
                {
                    attempt += 1;
                    let backoff = retry_backoff(
                        attempt,
                        self.pool.config().retry_backoff_min,
                        self.pool.config().retry_backoff_max,
                    );
                    warn!(
                        command = name,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "retrying transient store failure"
                    );
                    sleep(backoff).await;
                }
                other => return other,
            }
        }
    }
}

fn require_non_empty<T>(items: &[T], operation: &str) -> StoreResult<()> {
    if items.is_empty() {
        return Err(StoreError::InvalidArgument(format!(
            "{operation} requires at least one element"
        )));
    }
    Ok(())
}

/// Translate an inclusive `(start, stop)` window over a matched score band
/// into the wire-level offset/count pair. The whole-band window `(0, -1)`
/// becomes the zero pair, which the command encodes as "no window".
fn score_window(start: i64, stop: i64) -> (i64, i64) {
    (start, stop - start + 1)
}

fn retry_backoff(attempt: u32, min: Duration, max: Duration) -> Duration {
    let factor = 1u32 << attempt.min(10);
    min.saturating_mul(factor).min(max)
}
