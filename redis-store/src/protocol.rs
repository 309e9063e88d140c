//! RESP2 wire codec
//!
//! Requests are always encoded as flat arrays of bulk strings, which is the
//! only request shape the store accepts. Replies are decoded incrementally:
//! [`read_value`] returns `Ok(None)` when the buffer does not yet hold a
//! complete value, and the caller re-parses from the value start once more
//! bytes arrive.

use bytes::{BufMut, Bytes, BytesMut};
use redis_store_core::{RespValue, StoreError, StoreResult};
use std::io::Cursor;

const CRLF: &[u8] = b"\r\n";

/// Encode a command and its arguments into `buf`.
pub fn write_command(command: &str, args: &[RespValue], buf: &mut BytesMut) {
    buf.put_u8(b'*');
    buf.put_slice((1 + args.len()).to_string().as_bytes());
    buf.put_slice(CRLF);
    write_bulk(command.as_bytes(), buf);
    for arg in args {
        write_bulk(&arg_bytes(arg), buf);
    }
}

/// Encode a single reply value into `buf`. The inverse of [`read_value`].
pub fn write_value(value: &RespValue, buf: &mut BytesMut) {
    match value {
        RespValue::SimpleString(s) => {
            buf.put_u8(b'+');
            buf.put_slice(s.as_bytes());
            buf.put_slice(CRLF);
        }
        RespValue::Error(msg) => {
            buf.put_u8(b'-');
            buf.put_slice(msg.as_bytes());
            buf.put_slice(CRLF);
        }
        RespValue::Integer(i) => {
            buf.put_u8(b':');
            buf.put_slice(i.to_string().as_bytes());
            buf.put_slice(CRLF);
        }
        RespValue::BulkString(data) => write_bulk(data, buf),
        RespValue::Null => buf.put_slice(b"$-1\r\n"),
        RespValue::Array(items) => {
            buf.put_u8(b'*');
            buf.put_slice(items.len().to_string().as_bytes());
            buf.put_slice(CRLF);
            for item in items {
                write_value(item, buf);
            }
        }
    }
}

fn write_bulk(data: &[u8], buf: &mut BytesMut) {
    buf.put_u8(b'$');
    buf.put_slice(data.len().to_string().as_bytes());
    buf.put_slice(CRLF);
    buf.put_slice(data);
    buf.put_slice(CRLF);
}

/// Request arguments are flat bulk strings; numeric and simple-string
/// values are flattened to their textual form.
fn arg_bytes(value: &RespValue) -> Bytes {
    match value {
        RespValue::BulkString(b) => b.clone(),
        RespValue::SimpleString(s) => Bytes::copy_from_slice(s.as_bytes()),
        RespValue::Integer(i) => Bytes::from(i.to_string().into_bytes()),
        _ => Bytes::new(),
    }
}

/// Decode one reply value starting at the cursor position.
///
/// Returns `Ok(None)` when the buffered bytes end mid-value; the cursor
/// position is unspecified in that case, so callers must restart from the
/// value start with a fresh cursor.
pub fn read_value(cursor: &mut Cursor<&[u8]>) -> StoreResult<Option<RespValue>> {
    let data = *cursor.get_ref();
    let pos = cursor.position() as usize;
    if pos >= data.len() {
        return Ok(None);
    }

    cursor.set_position((pos + 1) as u64);
    match data[pos] {
        b'+' => Ok(read_line(cursor).map(|line| {
            RespValue::SimpleString(String::from_utf8_lossy(line).into_owned())
        })),
        b'-' => Ok(read_line(cursor)
            .map(|line| RespValue::Error(String::from_utf8_lossy(line).into_owned()))),
        b':' => match read_line(cursor) {
            Some(line) => Ok(Some(RespValue::Integer(parse_int(line)?))),
            None => Ok(None),
        },
        b'$' => read_bulk(cursor),
        b'*' => read_array(cursor),
        other => Err(StoreError::Unavailable(format!(
            "protocol error: invalid reply prefix {:?}",
            other as char
        ))),
    }
}

fn read_bulk(cursor: &mut Cursor<&[u8]>) -> StoreResult<Option<RespValue>> {
    let len = match read_line(cursor) {
        Some(line) => parse_int(line)?,
        None => return Ok(None),
    };
    if len < 0 {
        return Ok(Some(RespValue::Null));
    }

    let len = len as usize;
    let data = *cursor.get_ref();
    let start = cursor.position() as usize;
    if data.len() < start + len + 2 {
        return Ok(None);
    }
    let payload = Bytes::copy_from_slice(&data[start..start + len]);
    cursor.set_position((start + len + 2) as u64);
    Ok(Some(RespValue::BulkString(payload)))
}

fn read_array(cursor: &mut Cursor<&[u8]>) -> StoreResult<Option<RespValue>> {
    let len = match read_line(cursor) {
        Some(line) => parse_int(line)?,
        None => return Ok(None),
    };
    if len < 0 {
        return Ok(Some(RespValue::Null));
    }

    let mut items = Vec::with_capacity(len as usize);
    for _ in 0..len {
        match read_value(cursor)? {
            Some(item) => items.push(item),
            None => return Ok(None),
        }
    }
    Ok(Some(RespValue::Array(items)))
}

fn read_line<'a>(cursor: &mut Cursor<&'a [u8]>) -> Option<&'a [u8]> {
    let data = *cursor.get_ref();
    let start = cursor.position() as usize;
    let mut i = start;
    while i + 1 < data.len() {
        if data[i] == b'\r' && data[i + 1] == b'\n' {
            cursor.set_position((i + 2) as u64);
            return Some(&data[start..i]);
        }
        i += 1;
    }
    None
}

fn parse_int(line: &[u8]) -> StoreResult<i64> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            StoreError::Unavailable(format!(
                "protocol error: invalid length/integer line {:?}",
                String::from_utf8_lossy(line)
            ))
        })
}
