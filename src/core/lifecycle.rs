use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Bridge lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BridgeState {
    Running,
    /// Write endpoint closed; writer doing its final flush.
    DrainingWrite,
    /// Reader stopped polling; local read buffer being drained.
    DrainingRead,
    Closed,
}

impl fmt::Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BridgeState::Running => "running",
            BridgeState::DrainingWrite => "draining-write",
            BridgeState::DrainingRead => "draining-read",
            BridgeState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Shared, monotonic state cell observed by both loops and the handles.
#[derive(Debug, Clone)]
pub(crate) struct Lifecycle {
    key: Arc<str>,
    tx: Arc<watch::Sender<BridgeState>>,
}

impl Lifecycle {
    pub(crate) fn new(key: &str) -> Self {
        let (tx, _) = watch::channel(BridgeState::Running);
        Self {
            key: Arc::from(key),
            tx: Arc::new(tx),
        }
    }

    pub(crate) fn current(&self) -> BridgeState {
        *self.tx.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<BridgeState> {
        self.tx.subscribe()
    }

    /// Moves to `to` if that is ahead of the current state. Returns whether
    /// this call made the transition.
    pub(crate) fn advance(&self, to: BridgeState) -> bool {
        let mut from = to;
        let moved = self.tx.send_if_modified(|state| {
            if *state < to {
                from = *state;
                *state = to;
                true
            } else {
                false
            }
        });
        if moved {
            info!(target: "rchan::bridge", key = %self.key, %from, %to, "bridge state changed");
        }
        moved
    }

    /// Resolves once the state is at least `target`.
    pub(crate) async fn reached(&self, target: BridgeState) {
        let mut rx = self.subscribe();
        // the sender lives in `self`, so this cannot observe a closed channel
        let _ = rx.wait_for(|state| *state >= target).await;
    }
}
