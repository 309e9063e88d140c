//! In-process store server for hermetic integration tests
//!
//! Speaks enough RESP2 to back every facade operation, with fault
//! injection knobs: dropping connections mid-command and delaying replies.
//! One `Entry` per key mirrors the store's per-key data models, and
//! accessing a key under the wrong model answers with the store's
//! WRONGTYPE error.

#![allow(dead_code)]

use bytes::{Buf, BytesMut};
use redis_store::protocol::{read_value, write_value};
use redis_store::{RespValue, StoreConfig};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";
const NOT_INTEGER: &str = "ERR value is not an integer or out of range";

enum Entry {
    Str(String),
    List(VecDeque<String>),
    Set(HashSet<String>),
    Sorted(Vec<(String, f64)>),
    Hash(HashMap<String, String>),
}

#[derive(Default)]
struct Shared {
    entries: Mutex<HashMap<String, Entry>>,
    drop_replies: AtomicUsize,
    reply_delay: Mutex<Option<Duration>>,
    commands_seen: AtomicUsize,
}

/// Handle to a running test server.
pub struct TestServer {
    pub addr: String,
    shared: Arc<Shared>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr").to_string();
        let shared = Arc::new(Shared::default());

        let accept_shared = Arc::clone(&shared);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let shared = Arc::clone(&accept_shared);
                tokio::spawn(serve(stream, shared));
            }
        });

        Self { addr, shared }
    }

    /// Client configuration pointing at this server.
    pub fn config(&self) -> StoreConfig {
        StoreConfig::new(self.addr.clone())
    }

    /// Close the connection, without replying, for each of the next `n`
    /// commands received. Simulates transport failure.
    pub fn drop_next_commands(&self, n: usize) {
        self.shared.drop_replies.store(n, Ordering::SeqCst);
    }

    /// Delay every reply by `delay`, or reply immediately with `None`.
    pub fn set_reply_delay(&self, delay: Option<Duration>) {
        *self.shared.reply_delay.lock().unwrap() = delay;
    }

    /// Total number of commands that reached the server, liveness probes
    /// included.
    pub fn commands_seen(&self) -> usize {
        self.shared.commands_seen.load(Ordering::SeqCst)
    }
}

async fn serve(mut stream: TcpStream, shared: Arc<Shared>) {
    let mut buf = BytesMut::with_capacity(4096);
    loop {
        let parsed = {
            let mut cursor = Cursor::new(&buf[..]);
            match read_value(&mut cursor) {
                Ok(Some(value)) => Some((value, cursor.position() as usize)),
                Ok(None) => None,
                Err(_) => return,
            }
        };

        let Some((request, consumed)) = parsed else {
            match stream.read_buf(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(_) => continue,
            }
        };
        buf.advance(consumed);

        let Some(argv) = request_argv(request) else {
            return;
        };
        shared.commands_seen.fetch_add(1, Ordering::SeqCst);

        let delay = *shared.reply_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if shared.drop_replies.load(Ordering::SeqCst) > 0 {
            shared.drop_replies.fetch_sub(1, Ordering::SeqCst);
            return;
        }

        let reply = dispatch(&argv, &shared);
        let mut out = BytesMut::new();
        write_value(&reply, &mut out);
        if stream.write_all(&out).await.is_err() {
            return;
        }
    }
}

fn request_argv(request: RespValue) -> Option<Vec<String>> {
    let RespValue::Array(items) = request else {
        return None;
    };
    let mut argv = Vec::with_capacity(items.len());
    for item in items {
        match item {
            RespValue::BulkString(b) => argv.push(String::from_utf8_lossy(&b).into_owned()),
            _ => return None,
        }
    }
    if argv.is_empty() {
        None
    } else {
        Some(argv)
    }
}

fn dispatch(argv: &[String], shared: &Shared) -> RespValue {
    let mut entries = shared.entries.lock().unwrap();
    let name = argv[0].to_ascii_uppercase();
    let args = &argv[1..];

    match name.as_str() {
        "PING" => RespValue::SimpleString("PONG".into()),
        "AUTH" | "SELECT" => ok(),

        "SET" => {
            entries.insert(args[0].clone(), Entry::Str(args[1].clone()));
            ok()
        }
        "GET" => match entries.get(&args[0]) {
            None => RespValue::Null,
            Some(Entry::Str(s)) => bulk(s),
            Some(_) => err(WRONGTYPE),
        },
        "DEL" => int(i64::from(entries.remove(&args[0]).is_some())),
        "EXISTS" => int(i64::from(entries.contains_key(&args[0]))),
        "INCR" => match entries.get_mut(&args[0]) {
            None => {
                entries.insert(args[0].clone(), Entry::Str("1".into()));
                int(1)
            }
            Some(Entry::Str(s)) => match s.parse::<i64>() {
                Ok(n) => {
                    *s = (n + 1).to_string();
                    int(n + 1)
                }
                Err(_) => err(NOT_INTEGER),
            },
            Some(_) => err(WRONGTYPE),
        },

        "RPUSH" => match entries
            .entry(args[0].clone())
            .or_insert_with(|| Entry::List(VecDeque::new()))
        {
            Entry::List(list) => {
                list.extend(args[1..].iter().cloned());
                int(list.len() as i64)
            }
            _ => err(WRONGTYPE),
        },
        "LPOP" => match entries.get_mut(&args[0]) {
            None => RespValue::Null,
            Some(Entry::List(list)) => match list.pop_front() {
                Some(head) => bulk(&head),
                None => RespValue::Null,
            },
            Some(_) => err(WRONGTYPE),
        },
        "LLEN" => match entries.get(&args[0]) {
            None => int(0),
            Some(Entry::List(list)) => int(list.len() as i64),
            Some(_) => err(WRONGTYPE),
        },
        "LRANGE" => match entries.get(&args[0]) {
            None => string_array(Vec::new()),
            Some(Entry::List(list)) => {
                let items: Vec<String> = list.iter().cloned().collect();
                string_array(index_range(&items, parse_i64(&args[1]), parse_i64(&args[2])))
            }
            Some(_) => err(WRONGTYPE),
        },

        "SADD" => match entries
            .entry(args[0].clone())
            .or_insert_with(|| Entry::Set(HashSet::new()))
        {
            Entry::Set(set) => {
                let added = args[1..]
                    .iter()
                    .filter(|m| set.insert((*m).clone()))
                    .count();
                int(added as i64)
            }
            _ => err(WRONGTYPE),
        },
        "SREM" => match entries.get_mut(&args[0]) {
            None => int(0),
            Some(Entry::Set(set)) => {
                let removed = args[1..].iter().filter(|m| set.remove(*m)).count();
                int(removed as i64)
            }
            Some(_) => err(WRONGTYPE),
        },
        "SMEMBERS" => match entries.get(&args[0]) {
            None => string_array(Vec::new()),
            Some(Entry::Set(set)) => string_array(set.iter().cloned().collect()),
            Some(_) => err(WRONGTYPE),
        },
        "SISMEMBER" => match entries.get(&args[0]) {
            None => int(0),
            Some(Entry::Set(set)) => int(i64::from(set.contains(&args[1]))),
            Some(_) => err(WRONGTYPE),
        },
        "SCARD" => match entries.get(&args[0]) {
            None => int(0),
            Some(Entry::Set(set)) => int(set.len() as i64),
            Some(_) => err(WRONGTYPE),
        },
        "SRANDMEMBER" => match entries.get(&args[0]) {
            None => RespValue::Null,
            Some(Entry::Set(set)) => match set.iter().next() {
                Some(member) => bulk(member),
                None => RespValue::Null,
            },
            Some(_) => err(WRONGTYPE),
        },

        "ZADD" => match entries
            .entry(args[0].clone())
            .or_insert_with(|| Entry::Sorted(Vec::new()))
        {
            Entry::Sorted(zset) => {
                let mut added = 0;
                for pair in args[1..].chunks(2) {
                    let Ok(score) = pair[0].parse::<f64>() else {
                        return err("ERR value is not a valid float");
                    };
                    match zset.iter_mut().find(|(m, _)| *m == pair[1]) {
                        Some(entry) => entry.1 = score,
                        None => {
                            zset.push((pair[1].clone(), score));
                            added += 1;
                        }
                    }
                }
                int(added)
            }
            _ => err(WRONGTYPE),
        },
        "ZREM" => match entries.get_mut(&args[0]) {
            None => int(0),
            Some(Entry::Sorted(zset)) => {
                let before = zset.len();
                zset.retain(|(m, _)| !args[1..].contains(m));
                int((before - zset.len()) as i64)
            }
            Some(_) => err(WRONGTYPE),
        },
        "ZRANGE" | "ZREVRANGE" => match entries.get(&args[0]) {
            None => string_array(Vec::new()),
            Some(Entry::Sorted(zset)) => {
                let mut members: Vec<String> =
                    ranked(zset).into_iter().map(|(m, _)| m).collect();
                if name == "ZREVRANGE" {
                    members.reverse();
                }
                string_array(index_range(
                    &members,
                    parse_i64(&args[1]),
                    parse_i64(&args[2]),
                ))
            }
            Some(_) => err(WRONGTYPE),
        },
        "ZCARD" => match entries.get(&args[0]) {
            None => int(0),
            Some(Entry::Sorted(zset)) => int(zset.len() as i64),
            Some(_) => err(WRONGTYPE),
        },
        "ZRANGEBYSCORE" | "ZREVRANGEBYSCORE" => match entries.get(&args[0]) {
            None => string_array(Vec::new()),
            Some(Entry::Sorted(zset)) => {
                let rev = name == "ZREVRANGEBYSCORE";
                // The descending form receives max before min.
                let (min, max) = if rev {
                    (parse_bound(&args[2]), parse_bound(&args[1]))
                } else {
                    (parse_bound(&args[1]), parse_bound(&args[2]))
                };
                let mut members: Vec<String> = ranked(zset)
                    .into_iter()
                    .filter(|(_, score)| *score >= min && *score <= max)
                    .map(|(m, _)| m)
                    .collect();
                if rev {
                    members.reverse();
                }
                let windowed = if args.len() >= 6 && args[3].eq_ignore_ascii_case("LIMIT") {
                    score_window(&members, parse_i64(&args[4]), parse_i64(&args[5]))
                } else {
                    members
                };
                string_array(windowed)
            }
            Some(_) => err(WRONGTYPE),
        },
        "ZSCORE" => match entries.get(&args[0]) {
            None => RespValue::Null,
            Some(Entry::Sorted(zset)) => match zset.iter().find(|(m, _)| *m == args[1]) {
                Some((_, score)) => bulk(&score.to_string()),
                None => RespValue::Null,
            },
            Some(_) => err(WRONGTYPE),
        },
        "ZINCRBY" => match entries
            .entry(args[0].clone())
            .or_insert_with(|| Entry::Sorted(Vec::new()))
        {
            Entry::Sorted(zset) => {
                let Ok(delta) = args[1].parse::<f64>() else {
                    return err("ERR value is not a valid float");
                };
                match zset.iter_mut().find(|(m, _)| *m == args[2]) {
                    Some(entry) => {
                        entry.1 += delta;
                        bulk(&entry.1.to_string())
                    }
                    None => {
                        zset.push((args[2].clone(), delta));
                        bulk(&delta.to_string())
                    }
                }
            }
            _ => err(WRONGTYPE),
        },
        "ZRANK" | "ZREVRANK" => match entries.get(&args[0]) {
            None => RespValue::Null,
            Some(Entry::Sorted(zset)) => {
                let mut members: Vec<String> =
                    ranked(zset).into_iter().map(|(m, _)| m).collect();
                if name == "ZREVRANK" {
                    members.reverse();
                }
                match members.iter().position(|m| *m == args[1]) {
                    Some(rank) => int(rank as i64),
                    None => RespValue::Null,
                }
            }
            Some(_) => err(WRONGTYPE),
        },

        "HSET" => match entries
            .entry(args[0].clone())
            .or_insert_with(|| Entry::Hash(HashMap::new()))
        {
            Entry::Hash(hash) => {
                let mut created = 0;
                for pair in args[1..].chunks(2) {
                    if hash.insert(pair[0].clone(), pair[1].clone()).is_none() {
                        created += 1;
                    }
                }
                int(created)
            }
            _ => err(WRONGTYPE),
        },
        "HGETALL" => match entries.get(&args[0]) {
            None => string_array(Vec::new()),
            Some(Entry::Hash(hash)) => {
                let mut flat = Vec::with_capacity(hash.len() * 2);
                for (field, value) in hash {
                    flat.push(field.clone());
                    flat.push(value.clone());
                }
                string_array(flat)
            }
            Some(_) => err(WRONGTYPE),
        },
        "HGET" => match entries.get(&args[0]) {
            None => RespValue::Null,
            Some(Entry::Hash(hash)) => match hash.get(&args[1]) {
                Some(value) => bulk(value),
                None => RespValue::Null,
            },
            Some(_) => err(WRONGTYPE),
        },

        _ => err(&format!("ERR unknown command '{name}'")),
    }
}

/// Sorted-set entries in rank order: ascending score, member string
/// breaking ties.
fn ranked(zset: &[(String, f64)]) -> Vec<(String, f64)> {
    let mut ordered = zset.to_vec();
    ordered.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ordered
}

/// Inclusive start/stop indexing with negative-from-tail and clamping.
fn index_range(items: &[String], start: i64, stop: i64) -> Vec<String> {
    let len = items.len() as i64;
    let mut start = if start < 0 { len + start } else { start };
    let mut stop = if stop < 0 { len + stop } else { stop };
    if start < 0 {
        start = 0;
    }
    if stop >= len {
        stop = len - 1;
    }
    if len == 0 || start >= len || stop < 0 || start > stop {
        return Vec::new();
    }
    items[start as usize..=stop as usize].to_vec()
}

/// LIMIT offset/count window; a negative count means everything from the
/// offset.
fn score_window(members: &[String], offset: i64, count: i64) -> Vec<String> {
    if offset < 0 || offset >= members.len() as i64 {
        return Vec::new();
    }
    let rest = &members[offset as usize..];
    if count < 0 {
        rest.to_vec()
    } else {
        rest.iter().take(count as usize).cloned().collect()
    }
}

fn parse_bound(raw: &str) -> f64 {
    match raw {
        "-inf" => f64::NEG_INFINITY,
        "+inf" | "inf" => f64::INFINITY,
        other => other.parse::<f64>().unwrap_or(f64::NAN),
    }
}

fn parse_i64(raw: &str) -> i64 {
    raw.parse::<i64>().unwrap_or(0)
}

fn ok() -> RespValue {
    RespValue::SimpleString("OK".into())
}

fn int(i: i64) -> RespValue {
    RespValue::Integer(i)
}

fn bulk(s: &str) -> RespValue {
    RespValue::from(s)
}

fn err(msg: &str) -> RespValue {
    RespValue::Error(msg.to_string())
}

fn string_array(items: Vec<String>) -> RespValue {
    RespValue::Array(items.into_iter().map(RespValue::from).collect())
}
