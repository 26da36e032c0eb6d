//! Batching writer: local write buffer → remote list tail.
//!
//! Messages accumulate until either `batch` of them are pending or the
//! flush timer fires. Each flush is one `push_trim` round trip.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::core::lifecycle::{BridgeState, Lifecycle};
use crate::core::message::Message;
use crate::core::stats::{BridgeStats, FlushTrigger};
use crate::metrics;
use crate::store::ListStore;

/// Accumulated messages. The first `retried` entries already failed once.
#[derive(Debug, Default)]
struct Pending {
    messages: Vec<Message>,
    retried: usize,
}

pub(crate) struct WriterTask<S> {
    store: Arc<S>,
    key: String,
    size: usize,
    batch: usize,
    flush_interval: Duration,
    resubmit_failed: bool,
    rx: flume::Receiver<Message>,
    lifecycle: Lifecycle,
    stats: Arc<Mutex<BridgeStats>>,
    /// State entered after the final flush.
    finished: BridgeState,
}

impl<S: ListStore> WriterTask<S> {
    pub(crate) fn new(
        store: Arc<S>,
        config: &BridgeConfig,
        rx: flume::Receiver<Message>,
        lifecycle: Lifecycle,
        stats: Arc<Mutex<BridgeStats>>,
        finished: BridgeState,
    ) -> Self {
        Self {
            store,
            key: config.key.clone(),
            size: config.size,
            batch: config.batch,
            flush_interval: config.flush_interval(),
            resubmit_failed: config.resubmit_failed,
            rx,
            lifecycle,
            stats,
            finished,
        }
    }

    pub(crate) async fn run(self) {
        let mut ticker = interval_at(Instant::now() + self.flush_interval, self.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut pending = Pending {
            messages: Vec::with_capacity(self.batch),
            retried: 0,
        };

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !pending.messages.is_empty() {
                        self.flush(&mut pending, FlushTrigger::Timer).await;
                    }
                }
                msg = self.rx.recv_async() => match msg {
                    Ok(msg) => {
                        pending.messages.push(msg);
                        if pending.messages.len() >= self.batch {
                            self.flush(&mut pending, FlushTrigger::Size).await;
                        }
                    }
                    // every write handle closed or dropped
                    Err(_) => break,
                },
            }
        }

        self.lifecycle.advance(BridgeState::DrainingWrite);
        if !pending.messages.is_empty() {
            self.flush(&mut pending, FlushTrigger::Close).await;
        }
        debug!(target: "rchan::writer", key = %self.key, "writer finished");
        self.lifecycle.advance(self.finished);
    }

    async fn flush(&self, pending: &mut Pending, trigger: FlushTrigger) {
        let mut batch = std::mem::take(&mut pending.messages);
        let retried = std::mem::take(&mut pending.retried);
        let n = batch.len();

        let result = self.store.push_trim(&self.key, &batch, self.size).await;

        let mut stats = self.stats.lock();
        stats.record_flush(trigger);
        metrics::inc_flush_batches(1);

        match result {
            Ok(()) => {
                stats.flushed += n as u64;
                metrics::inc_flushed(n as u64);
                debug!(target: "rchan::writer", key = %self.key, count = n, ?trigger, "flushed");
            }
            Err(e) => {
                stats.store_errors += 1;
                metrics::inc_store_errors(1);

                // second failures and anything failing on close are dropped
                let carry = if self.resubmit_failed && trigger != FlushTrigger::Close {
                    batch.split_off(retried)
                } else {
                    Vec::new()
                };
                let dropped = batch.len();

                warn!(
                    target: "rchan::writer",
                    key = %self.key,
                    count = n,
                    resubmitted = carry.len(),
                    dropped,
                    error = %e,
                    "flush failed"
                );

                stats.dropped += dropped as u64;
                stats.resubmitted += carry.len() as u64;
                metrics::inc_dropped_flush(dropped as u64);
                metrics::inc_resubmitted(carry.len() as u64);

                pending.retried = carry.len();
                pending.messages = carry;
            }
        }
    }
}
