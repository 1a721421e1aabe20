use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use kvbench_protocol::{Command, Reply, Slice};

const WRONG_TYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

enum Value {
    Bytes(Slice),
    List(Vec<Slice>),
}

/// An in-memory store answering the handful of commands the benchmarks use.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<HashMap<Slice, Value>>,
}

/// Resolves redis-style inclusive bounds against a list of `len` elements.
fn range_bounds(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if start > stop || start >= len {
        None
    } else {
        Some((start as usize, stop as usize))
    }
}

impl MemStore {
    pub fn new() -> MemStore {
        MemStore::default()
    }

    fn lock(&self) -> MutexGuard<HashMap<Slice, Value>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn execute(&self, command: Command) -> Reply {
        match command {
            Command::GET(command) => self.get(&command.key),
            Command::SET(command) => self.set(command.key, command.value),
            Command::RPUSH(command) => self.rpush(command.key, command.value),
            Command::LRANGE(command) => self.lrange(&command.key, command.start, command.stop),
            Command::FLUSHDB => self.flushdb(),
        }
    }

    pub fn get(&self, key: &Slice) -> Reply {
        match self.lock().get(key) {
            None => Reply::BulkReply(None),
            Some(Value::Bytes(value)) => Reply::BulkReply(Some(value.clone())),
            Some(Value::List(_)) => Reply::error(WRONG_TYPE),
        }
    }

    pub fn set(&self, key: Slice, value: Slice) -> Reply {
        self.lock().insert(key, Value::Bytes(value));
        Reply::ok()
    }

    pub fn rpush(&self, key: Slice, value: Slice) -> Reply {
        let mut inner = self.lock();
        match inner.entry(key).or_insert_with(|| Value::List(Vec::new())) {
            Value::List(list) => {
                list.push(value);
                Reply::IntegerReply(list.len() as i64)
            }
            Value::Bytes(_) => Reply::error(WRONG_TYPE),
        }
    }

    pub fn lrange(&self, key: &Slice, start: i64, stop: i64) -> Reply {
        match self.lock().get(key) {
            None => Reply::MultiBulkReply(Some(Vec::new())),
            Some(Value::List(list)) => match range_bounds(list.len(), start, stop) {
                Some((start, stop)) => list[start..=stop].to_vec().into(),
                None => Reply::MultiBulkReply(Some(Vec::new())),
            },
            Some(Value::Bytes(_)) => Reply::error(WRONG_TYPE),
        }
    }

    pub fn flushdb(&self) -> Reply {
        self.lock().clear();
        Reply::ok()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
