//! RESP (REdis Serialization Protocol) reply values

use crate::error::{StoreError, StoreResult};
use bytes::Bytes;
use std::collections::{HashMap, HashSet};

/// A single RESP2 protocol value.
///
/// This is the wire-level reply shape. It never reaches callers of the
/// facade: command parsers convert it into domain values and map the nil
/// marker into the `NotFound`/`EmptyCollection` error kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// Simple string: `+OK\r\n`
    SimpleString(String),
    /// Error: `-ERR message\r\n`
    Error(String),
    /// Integer: `:1000\r\n`
    Integer(i64),
    /// Bulk string: `$6\r\nfoobar\r\n`
    BulkString(Bytes),
    /// Null bulk string or null array: `$-1\r\n`
    Null,
    /// Array: `*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n`
    Array(Vec<RespValue>),
}

impl RespValue {
    /// Interpret the reply as a UTF-8 string.
    pub fn into_string(self) -> StoreResult<String> {
        match self {
            RespValue::SimpleString(s) => Ok(s),
            RespValue::BulkString(b) => String::from_utf8(b.to_vec())
                .map_err(|e| StoreError::TypeMismatch(format!("reply is not valid UTF-8: {e}"))),
            other => Err(StoreError::TypeMismatch(format!(
                "expected string reply, got {other:?}"
            ))),
        }
    }

    /// Interpret the reply as a signed integer.
    pub fn into_int(self) -> StoreResult<i64> {
        match self {
            RespValue::Integer(i) => Ok(i),
            bulk @ RespValue::BulkString(_) => {
                let s = bulk.into_string()?;
                s.parse::<i64>()
                    .map_err(|e| StoreError::TypeMismatch(format!("reply is not an integer: {e}")))
            }
            other => Err(StoreError::TypeMismatch(format!(
                "expected integer reply, got {other:?}"
            ))),
        }
    }

    /// Interpret the reply as a floating-point score.
    pub fn into_float(self) -> StoreResult<f64> {
        let s = self.into_string()?;
        s.parse::<f64>()
            .map_err(|e| StoreError::TypeMismatch(format!("reply is not a float: {e}")))
    }

    /// Interpret the reply as an ordered sequence of strings.
    pub fn into_string_vec(self) -> StoreResult<Vec<String>> {
        match self {
            RespValue::Array(items) => items
                .into_iter()
                .filter(|item| !matches!(item, RespValue::Null))
                .map(RespValue::into_string)
                .collect(),
            other => Err(StoreError::TypeMismatch(format!(
                "expected array reply, got {other:?}"
            ))),
        }
    }

    /// Interpret the reply as an unordered set of strings.
    pub fn into_string_set(self) -> StoreResult<HashSet<String>> {
        Ok(self.into_string_vec()?.into_iter().collect())
    }

    /// Interpret a flat `field, value, field, value, ...` array reply as a
    /// map, the RESP2 shape of `HGETALL`.
    pub fn into_string_map(self) -> StoreResult<HashMap<String, String>> {
        let flat = self.into_string_vec()?;
        if flat.len() % 2 != 0 {
            return Err(StoreError::TypeMismatch(format!(
                "map reply has odd length {}",
                flat.len()
            )));
        }
        let mut map = HashMap::with_capacity(flat.len() / 2);
        let mut iter = flat.into_iter();
        while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
            map.insert(field, value);
        }
        Ok(map)
    }

    /// Whether this is the nil marker.
    pub fn is_null(&self) -> bool {
        matches!(self, RespValue::Null)
    }

    /// Whether this is an error reply.
    pub fn is_error(&self) -> bool {
        matches!(self, RespValue::Error(_))
    }
}

impl From<String> for RespValue {
    fn from(s: String) -> Self {
        RespValue::BulkString(Bytes::from(s.into_bytes()))
    }
}

impl From<&str> for RespValue {
    fn from(s: &str) -> Self {
        RespValue::BulkString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<i64> for RespValue {
    fn from(i: i64) -> Self {
        RespValue::from(i.to_string())
    }
}

impl From<f64> for RespValue {
    fn from(f: f64) -> Self {
        RespValue::from(f.to_string())
    }
}

impl From<Bytes> for RespValue {
    fn from(b: Bytes) -> Self {
        RespValue::BulkString(b)
    }
}
