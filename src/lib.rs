//! rchan – a bounded, batched bridge between local async channels and a
//! capped remote list (Redis in production).
//!
//! This crate exports
//!  * `core`    – message type, local endpoints, the polling reader and
//!                batching writer, and the shutdown/drain lifecycle
//!  * `store`   – the remote list contract with Redis and in-memory backends
//!  * `config`  – TOML-driven bridge configuration
//!  * `logging` – tracing subscriber setup
//!  * `metrics` – process-wide counters
//!
//! Data loss is possible in two documented cases: the remote list exceeding
//! its cap (oldest elements are trimmed) and the process dying while
//! messages sit in a local buffer.

// ───────────────────────────────────────────────────────────
// Public modules
// ───────────────────────────────────────────────────────────
pub mod config;
pub mod core;
pub mod logging;
pub mod metrics;
pub mod store;

// ───────────────────────────────────────────────────────────
// Re-exports
// ───────────────────────────────────────────────────────────
pub use crate::config::{load_config, BridgeConfig, Config, DrainPolicy};
pub use crate::core::bridge::{Bridge, BridgeHandle, StopHandle};
pub use crate::core::endpoint::{ReadHandle, WriteHandle};
pub use crate::core::error::{BridgeError, StoreError};
pub use crate::core::lifecycle::BridgeState;
pub use crate::core::message::{Message, Payload};
pub use crate::core::stats::BridgeStats;
pub use crate::store::{ListStore, MemoryStore, RedisStore};
