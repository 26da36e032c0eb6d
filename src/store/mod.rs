//! Remote list contract consumed by the bridge.
//!
//! The bridge only needs four operations on a list keyed by string. Any
//! backend offering them with at least per-command atomicity (and an atomic
//! append+trim round trip) can sit behind the engine.

pub mod memory;
pub mod redis;

pub use self::memory::{FlushRecord, MemoryStore};
pub use self::redis::RedisStore;

use async_trait::async_trait;

use crate::core::error::StoreError;
use crate::core::message::Message;

#[async_trait]
pub trait ListStore: Send + Sync + 'static {
    /// Pops up to `count` elements from the head.
    ///
    /// An empty vector means the list was empty (or missing); fewer than
    /// `count` elements is a normal partial batch.
    async fn pop_front(&self, key: &str, count: usize) -> Result<Vec<Message>, StoreError>;

    /// Appends to the tail, no trimming.
    async fn push_back(&self, key: &str, messages: &[Message]) -> Result<(), StoreError>;

    /// Appends to the tail and trims the list to its newest `size` elements
    /// in one atomic round trip.
    async fn push_trim(&self, key: &str, messages: &[Message], size: usize)
        -> Result<(), StoreError>;

    async fn len(&self, key: &str) -> Result<usize, StoreError>;
}
