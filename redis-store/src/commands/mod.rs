//! Command builders for the store operation set
//!
//! Each data model gets one module of builders. A builder knows its wire
//! name, its argument encoding, and how to turn the raw reply into the
//! operation's domain value - including mapping the nil reply into the
//! `NotFound`/`EmptyCollection` error kinds, so the sentinel never escapes
//! past this layer.

pub mod hash;
pub mod list;
pub mod set;
pub mod sorted_set;
pub mod string;

use redis_store_core::{RespValue, StoreError, StoreResult};

pub use hash::{HGetAllCommand, HGetCommand, HSetCommand};
pub use list::{LLenCommand, LPopCommand, LRangeCommand, RPushCommand};
pub use set::{
    SAddCommand, SCardCommand, SIsMemberCommand, SMembersCommand, SRandMemberCommand, SRemCommand,
};
pub use sorted_set::{
    ZAddCommand, ZCardCommand, ZIncrByCommand, ZRangeByScoreCommand, ZRangeCommand, ZRankCommand,
    ZRemCommand, ZScoreCommand,
};
pub use string::{DelCommand, ExistsCommand, GetCommand, IncrCommand, SetCommand};

/// One logical operation: wire name, argument encoding, reply decoding.
pub trait Command {
    /// The domain value the operation yields
    type Output;

    /// Wire-level command name
    fn name(&self) -> &'static str;

    /// Encoded arguments, in wire order
    fn args(&self) -> Vec<RespValue>;

    /// Decode and classify the reply
    fn parse(&self, reply: RespValue) -> StoreResult<Self::Output>;
}

/// PING command, used as the liveness probe
pub struct PingCommand;

impl Command for PingCommand {
    type Output = ();

    fn name(&self) -> &'static str {
        "PING"
    }

    fn args(&self) -> Vec<RespValue> {
        Vec::new()
    }

    fn parse(&self, reply: RespValue) -> StoreResult<()> {
        match reply {
            RespValue::SimpleString(ref s) if s == "PONG" => Ok(()),
            other => Err(StoreError::Unavailable(format!(
                "unexpected PING reply: {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_parse() {
        assert!(PingCommand
            .parse(RespValue::SimpleString("PONG".into()))
            .is_ok());
        assert!(PingCommand.parse(RespValue::Integer(1)).is_err());
    }
}
