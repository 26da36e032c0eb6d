#![allow(dead_code)]

use std::sync::Once;
use std::time::Duration;

use rchan::BridgeConfig;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        rchan::logging::init_logging_with("warn");
    });
}

/// Small buffers and fast timers so tests settle in milliseconds.
pub fn fast_config(key: &str) -> BridgeConfig {
    BridgeConfig::new(key)
        .with_poll(Duration::from_millis(10))
        .with_flush_interval(Duration::from_millis(10))
}

/// Polls `cond` every few milliseconds until it holds or `limit` passes.
pub async fn eventually<F: FnMut() -> bool>(limit: Duration, mut cond: F) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        if cond() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
