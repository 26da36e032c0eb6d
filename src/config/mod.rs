use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::Path};

use crate::core::error::BridgeError;

/// What the reader does with messages still sitting in the local read
/// buffer when the bridge shuts down.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DrainPolicy {
    /// Append them back to the remote list, oldest first.
    #[default]
    PushBack,
    /// Drop them. Lossy; counted and logged.
    Discard,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub key: String,
    /// Remote list is trimmed to this many (newest) elements after each flush.
    #[serde(default = "default_size")]
    pub size: usize,
    /// Capacity of each local buffer.
    #[serde(default = "default_buff")]
    pub buff: usize,
    /// Eager flush threshold and pop count.
    #[serde(default = "default_batch")]
    pub batch: usize,
    #[serde(default = "default_interval_ms")]
    pub poll_ms: u64,
    #[serde(default = "default_interval_ms")]
    pub flush_interval_ms: u64,
    #[serde(default)]
    pub drain_policy: DrainPolicy,
    #[serde(default = "default_resubmit")]
    pub resubmit_failed: bool,
}

fn default_size() -> usize {
    10_000
}

fn default_buff() -> usize {
    10
}

fn default_batch() -> usize {
    1
}

fn default_interval_ms() -> u64 {
    100
}

fn default_resubmit() -> bool {
    true
}

/// Rounds up to the next millisecond, so any non-zero duration stays non-zero.
fn whole_millis(d: Duration) -> u64 {
    let ms = d.as_millis() + u128::from(d.subsec_nanos() % 1_000_000 != 0);
    u64::try_from(ms).unwrap_or(u64::MAX)
}

impl BridgeConfig {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: default_size(),
            buff: default_buff(),
            batch: default_batch(),
            poll_ms: default_interval_ms(),
            flush_interval_ms: default_interval_ms(),
            drain_policy: DrainPolicy::default(),
            resubmit_failed: default_resubmit(),
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_buff(mut self, buff: usize) -> Self {
        self.buff = buff;
        self
    }

    pub fn with_batch(mut self, batch: usize) -> Self {
        self.batch = batch;
        self
    }

    pub fn with_poll(mut self, poll: Duration) -> Self {
        self.poll_ms = whole_millis(poll);
        self
    }

    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval_ms = whole_millis(flush_interval);
        self
    }

    pub fn with_drain_policy(mut self, policy: DrainPolicy) -> Self {
        self.drain_policy = policy;
        self
    }

    pub fn with_resubmit_failed(mut self, resubmit: bool) -> Self {
        self.resubmit_failed = resubmit;
        self
    }

    #[inline]
    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    #[inline]
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Rejects values that would make a loop spin or a trim keep everything.
    pub fn validate(&self) -> Result<(), BridgeError> {
        let invalid = |what: &str| Err(BridgeError::InvalidConfig(what.to_string()));
        if self.key.is_empty() {
            return invalid("key must not be empty");
        }
        if self.size == 0 {
            return invalid("size must be at least 1");
        }
        if self.buff == 0 {
            return invalid("buff must be at least 1");
        }
        if self.batch == 0 {
            return invalid("batch must be at least 1");
        }
        if self.poll_ms == 0 {
            return invalid("poll_ms must be positive");
        }
        if self.flush_interval_ms == 0 {
            return invalid("flush_interval_ms must be positive");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub bridge: BridgeConfig,
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, anyhow::Error> {
    let raw: String = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&raw)?;
    config.bridge.validate()?;
    Ok(config)
}
