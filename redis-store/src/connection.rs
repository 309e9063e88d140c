//! A single connection to the store
//!
//! Handles dialing with a bounded timeout, authentication and database
//! selection, and one request/response round trip at a time with separate
//! read and write timeouts. Transport damage (I/O error, timeout, protocol
//! corruption) marks the connection broken so the pool discards it instead
//! of reusing it.

use crate::protocol;
use bytes::{Buf, BytesMut};
use redis_store_core::{RespValue, StoreConfig, StoreError, StoreResult};
use std::io::Cursor;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// A live connection leased out by the pool for one round trip at a time.
pub struct Connection {
    stream: TcpStream,
    read_buf: BytesMut,
    read_timeout: Duration,
    write_timeout: Duration,
    broken: bool,
}

impl Connection {
    /// Dial the configured endpoint, then authenticate and select the
    /// database as configured. All failures here are `Connection` errors.
    pub async fn open(config: &StoreConfig) -> StoreResult<Self> {
        let (host, port) = config.endpoint()?;
        let addr = format!("{host}:{port}");
        debug!(%addr, "dialing store");

        let stream = timeout(config.dial_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| StoreError::Connection(format!("dial to {addr} timed out")))?
            .map_err(|e| StoreError::Connection(format!("failed to dial {addr}: {e}")))?;
        let stream = apply_keepalive(stream, config.tcp_keepalive)?;

        let mut conn = Self {
            stream,
            read_buf: BytesMut::with_capacity(8 * 1024),
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
            broken: false,
        };

        if let Some(password) = config.password.as_deref() {
            conn.authenticate(password).await?;
        }
        if config.database > 0 {
            conn.select_database(config.database).await?;
        }

        Ok(conn)
    }

    async fn authenticate(&mut self, password: &str) -> StoreResult<()> {
        let reply = self
            .request("AUTH", &[RespValue::from(password)])
            .await
            .map_err(|e| StoreError::Connection(format!("authentication failed: {e}")))?;
        match reply {
            RespValue::SimpleString(ref s) if s == "OK" => Ok(()),
            other => Err(StoreError::Connection(format!(
                "unexpected AUTH reply: {other:?}"
            ))),
        }
    }

    async fn select_database(&mut self, database: u32) -> StoreResult<()> {
        let reply = self
            .request("SELECT", &[RespValue::from(i64::from(database))])
            .await
            .map_err(|e| StoreError::Connection(format!("database selection failed: {e}")))?;
        match reply {
            RespValue::SimpleString(ref s) if s == "OK" => Ok(()),
            other => Err(StoreError::Connection(format!(
                "unexpected SELECT reply: {other:?}"
            ))),
        }
    }

    /// Issue one request and decode its reply.
    ///
    /// Error replies from the server are classified here, at the single
    /// point where they enter the client; transport failures mark the
    /// connection broken.
    pub async fn request(&mut self, command: &str, args: &[RespValue]) -> StoreResult<RespValue> {
        let mut buf = BytesMut::with_capacity(64);
        protocol::write_command(command, args, &mut buf);

        match timeout(self.write_timeout, self.stream.write_all(&buf)).await {
            Err(_) => {
                self.broken = true;
                return Err(StoreError::Unavailable(format!("{command} write timed out")));
            }
            Ok(Err(e)) => {
                self.broken = true;
                return Err(StoreError::Unavailable(format!("{command} write failed: {e}")));
            }
            Ok(Ok(())) => {}
        }

        let reply = match timeout(self.read_timeout, self.read_reply()).await {
            Err(_) => {
                self.broken = true;
                return Err(StoreError::Unavailable(format!("{command} read timed out")));
            }
            Ok(Err(e)) => {
                self.broken = true;
                return Err(e);
            }
            Ok(Ok(reply)) => reply,
        };

        if let RespValue::Error(msg) = reply {
            return Err(StoreError::from_reply_error(&msg));
        }
        Ok(reply)
    }

    /// Liveness probe.
    pub async fn ping(&mut self) -> StoreResult<()> {
        let reply = self.request("PING", &[]).await?;
        match reply {
            RespValue::SimpleString(ref s) if s == "PONG" => Ok(()),
            other => Err(StoreError::Unavailable(format!(
                "unexpected PING reply: {other:?}"
            ))),
        }
    }

    /// Whether this connection suffered transport damage and must not be
    /// returned to the pool.
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    async fn read_reply(&mut self) -> StoreResult<RespValue> {
        loop {
            let mut cursor = Cursor::new(&self.read_buf[..]);
            if let Some(value) = protocol::read_value(&mut cursor)? {
                let consumed = cursor.position() as usize;
                self.read_buf.advance(consumed);
                return Ok(value);
            }

            let n = self
                .stream
                .read_buf(&mut self.read_buf)
                .await
                .map_err(|e| StoreError::Unavailable(format!("read failed: {e}")))?;
            if n == 0 {
                return Err(StoreError::Unavailable(
                    "connection closed by store".to_string(),
                ));
            }
        }
    }
}

fn apply_keepalive(stream: TcpStream, keepalive: Option<Duration>) -> StoreResult<TcpStream> {
    let Some(period) = keepalive else {
        return Ok(stream);
    };

    let std_stream = stream
        .into_std()
        .map_err(|e| StoreError::Connection(format!("failed to configure socket: {e}")))?;
    let socket = socket2::Socket::from(std_stream);
    socket
        .set_tcp_keepalive(&socket2::TcpKeepalive::new().with_time(period))
        .map_err(|e| StoreError::Connection(format!("failed to set TCP keepalive: {e}")))?;
    TcpStream::from_std(socket.into())
        .map_err(|e| StoreError::Connection(format!("failed to configure socket: {e}")))
}
