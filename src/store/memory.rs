//! In-process list store.
//!
//! Same contract as the Redis backend, plus bookkeeping that makes round
//! trips observable: every `push_trim` call is recorded as one
//! [`FlushRecord`], pops are counted, and failures can be injected.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::core::error::StoreError;
use crate::core::message::Message;
use crate::store::ListStore;

/// One `push_trim` round trip as seen by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushRecord {
    pub key: String,
    pub appended: usize,
    pub trimmed_to: usize,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    lists: Mutex<HashMap<String, VecDeque<Message>>>,
    flushes: Mutex<Vec<FlushRecord>>,
    pop_calls: AtomicU64,
    fail_flushes: AtomicUsize,
    fail_pops: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the list under `key`, head first.
    pub fn contents(&self, key: &str) -> Vec<Message> {
        self.lists
            .lock()
            .get(key)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn flushes(&self) -> Vec<FlushRecord> {
        self.flushes.lock().clone()
    }

    /// Number of `pop_front` round trips, including failed ones.
    pub fn pop_calls(&self) -> u64 {
        self.pop_calls.load(Ordering::Relaxed)
    }

    /// The next `n` flushes are refused without touching the list.
    pub fn fail_next_flushes(&self, n: usize) {
        self.fail_flushes.store(n, Ordering::Relaxed);
    }

    /// The next `n` pops fail with a transport error.
    pub fn fail_next_pops(&self, n: usize) {
        self.fail_pops.store(n, Ordering::Relaxed);
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ListStore for MemoryStore {
    async fn pop_front(&self, key: &str, count: usize) -> Result<Vec<Message>, StoreError> {
        self.pop_calls.fetch_add(1, Ordering::Relaxed);
        if Self::take_failure(&self.fail_pops) {
            return Err(StoreError::Transport("injected pop failure".into()));
        }

        let mut lists = self.lists.lock();
        let Some(list) = lists.get_mut(key) else {
            return Ok(Vec::new());
        };
        let n = count.min(list.len());
        let popped: Vec<Message> = list.drain(..n).collect();
        if list.is_empty() {
            lists.remove(key);
        }
        Ok(popped)
    }

    async fn push_back(&self, key: &str, messages: &[Message]) -> Result<(), StoreError> {
        if messages.is_empty() {
            return Ok(());
        }
        self.lists
            .lock()
            .entry(key.to_string())
            .or_default()
            .extend(messages.iter().cloned());
        Ok(())
    }

    async fn push_trim(
        &self,
        key: &str,
        messages: &[Message],
        size: usize,
    ) -> Result<(), StoreError> {
        self.flushes.lock().push(FlushRecord {
            key: key.to_string(),
            appended: messages.len(),
            trimmed_to: size,
        });
        if Self::take_failure(&self.fail_flushes) {
            return Err(StoreError::Rejected("injected flush failure".into()));
        }

        let mut lists = self.lists.lock();
        let list = lists.entry(key.to_string()).or_default();
        list.extend(messages.iter().cloned());
        if list.len() > size {
            let excess = list.len() - size;
            list.drain(..excess);
        }
        if list.is_empty() {
            lists.remove(key);
        }
        Ok(())
    }

    async fn len(&self, key: &str) -> Result<usize, StoreError> {
        Ok(self.lists.lock().get(key).map_or(0, VecDeque::len))
    }
}
