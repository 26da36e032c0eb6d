//! Wiring of the two loops, their buffers and the shared lifecycle.
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use rchan::{Bridge, BridgeConfig, RedisStore};
//!
//! let store = Arc::new(RedisStore::connect("redis://127.0.0.1:6379").await?);
//! let (read, write, handle) = Bridge::open::<_, String>(store, BridgeConfig::new("my-queue"))?;
//!
//! write.send("hello world 🌏🤍✨".to_string()).await?;
//! println!("{:?}", read.recv().await);
//!
//! write.close();
//! handle.join().await?;
//! # Ok(())
//! # }
//! ```

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::BridgeConfig;
use crate::core::endpoint::{ReadHandle, WriteHandle};
use crate::core::error::BridgeError;
use crate::core::lifecycle::{BridgeState, Lifecycle};
use crate::core::message::Payload;
use crate::core::reader::ReaderTask;
use crate::core::stats::BridgeStats;
use crate::core::writer::WriterTask;
use crate::store::ListStore;

/// Constructors for the combined bridge and its two halves.
///
/// All of them spawn onto the current tokio runtime and panic outside one.
pub struct Bridge;

impl Bridge {
    /// Both loops on one key. Closing the write endpoint flushes what was
    /// written, then drains the read buffer per the drain policy and closes
    /// the read endpoint.
    pub fn open<S, T>(
        store: Arc<S>,
        config: BridgeConfig,
    ) -> Result<(ReadHandle<T>, WriteHandle<T>, BridgeHandle), BridgeError>
    where
        S: ListStore,
        T: Payload,
    {
        config.validate()?;
        let lifecycle = Lifecycle::new(&config.key);
        let stats = Arc::new(Mutex::new(BridgeStats::default()));

        let (read_tx, read_rx) = flume::bounded(config.buff);
        let (write_tx, write_rx) = flume::bounded(config.buff);

        let reader = ReaderTask::new(
            Arc::clone(&store),
            &config,
            read_tx,
            read_rx.clone(),
            lifecycle.clone(),
            Arc::clone(&stats),
        );
        let writer = WriterTask::new(
            store,
            &config,
            write_rx,
            lifecycle.clone(),
            Arc::clone(&stats),
            BridgeState::DrainingRead,
        );

        let tasks = vec![tokio::spawn(writer.run()), tokio::spawn(reader.run())];

        Ok((
            ReadHandle::new(read_rx, config.buff),
            WriteHandle::new(write_tx, lifecycle.clone(), config.buff),
            BridgeHandle::new(config.key, lifecycle, stats, tasks),
        ))
    }

    /// Polling reader only. Stop it with the returned [`StopHandle`]; unread
    /// buffered messages are then handled by the drain policy.
    pub fn reader<S, T>(
        store: Arc<S>,
        config: BridgeConfig,
    ) -> Result<(ReadHandle<T>, StopHandle, BridgeHandle), BridgeError>
    where
        S: ListStore,
        T: Payload,
    {
        config.validate()?;
        let lifecycle = Lifecycle::new(&config.key);
        let stats = Arc::new(Mutex::new(BridgeStats::default()));

        let (read_tx, read_rx) = flume::bounded(config.buff);
        let reader = ReaderTask::new(
            store,
            &config,
            read_tx,
            read_rx.clone(),
            lifecycle.clone(),
            Arc::clone(&stats),
        );
        let tasks = vec![tokio::spawn(reader.run())];

        Ok((
            ReadHandle::new(read_rx, config.buff),
            StopHandle {
                lifecycle: lifecycle.clone(),
            },
            BridgeHandle::new(config.key, lifecycle, stats, tasks),
        ))
    }

    /// Batching writer only. Close the write endpoint to flush and stop.
    pub fn writer<S, T>(
        store: Arc<S>,
        config: BridgeConfig,
    ) -> Result<(WriteHandle<T>, BridgeHandle), BridgeError>
    where
        S: ListStore,
        T: Payload,
    {
        config.validate()?;
        let lifecycle = Lifecycle::new(&config.key);
        let stats = Arc::new(Mutex::new(BridgeStats::default()));

        let (write_tx, write_rx) = flume::bounded(config.buff);
        let writer = WriterTask::new(
            store,
            &config,
            write_rx,
            lifecycle.clone(),
            Arc::clone(&stats),
            BridgeState::Closed,
        );
        let tasks = vec![tokio::spawn(writer.run())];

        Ok((
            WriteHandle::new(write_tx, lifecycle.clone(), config.buff),
            BridgeHandle::new(config.key, lifecycle, stats, tasks),
        ))
    }
}

/// Stops a standalone reader. Idempotent.
#[derive(Debug, Clone)]
pub struct StopHandle {
    lifecycle: Lifecycle,
}

impl StopHandle {
    pub fn stop(&self) {
        self.lifecycle.advance(BridgeState::DrainingRead);
    }
}

/// Observes a running bridge and collects its tasks.
#[derive(Debug)]
pub struct BridgeHandle {
    key: String,
    lifecycle: Lifecycle,
    stats: Arc<Mutex<BridgeStats>>,
    tasks: Vec<JoinHandle<()>>,
}

impl BridgeHandle {
    fn new(
        key: String,
        lifecycle: Lifecycle,
        stats: Arc<Mutex<BridgeStats>>,
        tasks: Vec<JoinHandle<()>>,
    ) -> Self {
        Self {
            key,
            lifecycle,
            stats,
            tasks,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> BridgeState {
        self.lifecycle.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<BridgeState> {
        self.lifecycle.subscribe()
    }

    /// Resolves once both endpoints are closed and buffered state handled.
    pub async fn closed(&self) {
        self.lifecycle.reached(BridgeState::Closed).await;
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats.lock().clone()
    }

    /// Waits for the background tasks to exit and returns final counters.
    pub async fn join(self) -> Result<BridgeStats, BridgeError> {
        for task in self.tasks {
            task.await
                .map_err(|e| BridgeError::Internal(format!("bridge task failed: {e}")))?;
        }
        let stats = self.stats.lock().clone();
        Ok(stats)
    }
}
