//! Polling reader: remote list head → local read buffer.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::config::{BridgeConfig, DrainPolicy};
use crate::core::lifecycle::{BridgeState, Lifecycle};
use crate::core::message::Message;
use crate::core::stats::BridgeStats;
use crate::metrics;
use crate::store::ListStore;

pub(crate) struct ReaderTask<S> {
    store: Arc<S>,
    key: String,
    size: usize,
    buff: usize,
    batch: usize,
    poll: Duration,
    drain_policy: DrainPolicy,
    tx: flume::Sender<Message>,
    // kept so the buffer can be drained back on shutdown
    rx: flume::Receiver<Message>,
    lifecycle: Lifecycle,
    stats: Arc<Mutex<BridgeStats>>,
}

impl<S: ListStore> ReaderTask<S> {
    pub(crate) fn new(
        store: Arc<S>,
        config: &BridgeConfig,
        tx: flume::Sender<Message>,
        rx: flume::Receiver<Message>,
        lifecycle: Lifecycle,
        stats: Arc<Mutex<BridgeStats>>,
    ) -> Self {
        Self {
            store,
            key: config.key.clone(),
            size: config.size,
            buff: config.buff,
            batch: config.batch,
            poll: config.poll(),
            drain_policy: config.drain_policy,
            tx,
            rx,
            lifecycle,
            stats,
        }
    }

    pub(crate) async fn run(self) {
        let mut ticker = interval_at(Instant::now() + self.poll, self.poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        {
            let stopped = self.lifecycle.reached(BridgeState::DrainingRead);
            tokio::pin!(stopped);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut stopped => break,
                    _ = ticker.tick() => self.fill().await,
                }
            }
        }

        let lifecycle = self.lifecycle.clone();
        self.drain().await;
        lifecycle.advance(BridgeState::Closed);
    }

    /// One tick: pop until the buffer is full or the list is empty.
    async fn fill(&self) {
        loop {
            let spare = self.buff.saturating_sub(self.tx.len());
            if spare == 0 {
                break;
            }
            // never pop more than fits, so popped messages are never stranded here
            let want = self.batch.min(spare);

            self.stats.lock().pops += 1;
            let popped = match self.store.pop_front(&self.key, want).await {
                Ok(popped) => popped,
                Err(e) => {
                    warn!(target: "rchan::reader", key = %self.key, count = want, error = %e, "pop failed");
                    self.stats.lock().store_errors += 1;
                    metrics::inc_store_errors(1);
                    break;
                }
            };
            if popped.is_empty() {
                break;
            }

            let n = popped.len();
            for msg in popped {
                // cannot disconnect: this task owns a receiver
                if self.tx.send_async(msg).await.is_err() {
                    return;
                }
            }
            self.stats.lock().received += n as u64;
            metrics::inc_popped(n as u64);
            debug!(target: "rchan::reader", key = %self.key, count = n, "moved into read buffer");
        }
    }

    async fn drain(self) {
        let ReaderTask {
            store,
            key,
            size,
            batch,
            drain_policy,
            tx,
            rx,
            stats,
            ..
        } = self;

        // consumers see end-of-stream once what remains is gone
        drop(tx);
        let resident: Vec<Message> = rx.drain().collect();
        drop(rx);
        if resident.is_empty() {
            return;
        }

        match drain_policy {
            DrainPolicy::Discard => {
                warn!(target: "rchan::reader", key = %key, count = resident.len(), "discarding unread messages");
                stats.lock().discarded += resident.len() as u64;
                metrics::inc_discarded_drain(resident.len() as u64);
            }
            DrainPolicy::PushBack => {
                for chunk in resident.chunks(batch) {
                    match store.push_trim(&key, chunk, size).await {
                        Ok(()) => {
                            stats.lock().drained_back += chunk.len() as u64;
                            metrics::inc_drained_back(chunk.len() as u64);
                        }
                        Err(e) => {
                            warn!(target: "rchan::reader", key = %key, count = chunk.len(), error = %e, "push back failed, messages lost");
                            let mut stats = stats.lock();
                            stats.store_errors += 1;
                            stats.drain_lost += chunk.len() as u64;
                            metrics::inc_store_errors(1);
                            metrics::inc_lost_drain(chunk.len() as u64);
                        }
                    }
                }
                debug!(target: "rchan::reader", key = %key, count = resident.len(), "read buffer drained back");
            }
        }
    }
}
