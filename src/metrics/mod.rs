use std::sync::atomic::{AtomicU64, Ordering};

// Global counters (low overhead). Process-wide, summed over every bridge.
static POPPED: AtomicU64 = AtomicU64::new(0);
static SENT: AtomicU64 = AtomicU64::new(0);
static FLUSH_BATCHES: AtomicU64 = AtomicU64::new(0);
static FLUSHED: AtomicU64 = AtomicU64::new(0);
static RESUBMITTED: AtomicU64 = AtomicU64::new(0);
static DROPPED_FLUSH: AtomicU64 = AtomicU64::new(0);
static DRAINED_BACK: AtomicU64 = AtomicU64::new(0);
static DISCARDED_DRAIN: AtomicU64 = AtomicU64::new(0);
static LOST_DRAIN: AtomicU64 = AtomicU64::new(0);
static STORE_ERRORS: AtomicU64 = AtomicU64::new(0);

#[inline]
pub fn inc_popped(n: u64) {
    POPPED.fetch_add(n, Ordering::Relaxed);
}
#[inline]
pub fn inc_sent(n: u64) {
    SENT.fetch_add(n, Ordering::Relaxed);
}
#[inline]
pub fn inc_flush_batches(n: u64) {
    FLUSH_BATCHES.fetch_add(n, Ordering::Relaxed);
}
#[inline]
pub fn inc_flushed(n: u64) {
    FLUSHED.fetch_add(n, Ordering::Relaxed);
}
#[inline]
pub fn inc_resubmitted(n: u64) {
    RESUBMITTED.fetch_add(n, Ordering::Relaxed);
}
#[inline]
pub fn inc_dropped_flush(n: u64) {
    DROPPED_FLUSH.fetch_add(n, Ordering::Relaxed);
}
#[inline]
pub fn inc_drained_back(n: u64) {
    DRAINED_BACK.fetch_add(n, Ordering::Relaxed);
}
#[inline]
pub fn inc_discarded_drain(n: u64) {
    DISCARDED_DRAIN.fetch_add(n, Ordering::Relaxed);
}
#[inline]
pub fn inc_lost_drain(n: u64) {
    LOST_DRAIN.fetch_add(n, Ordering::Relaxed);
}
#[inline]
pub fn inc_store_errors(n: u64) {
    STORE_ERRORS.fetch_add(n, Ordering::Relaxed);
}

pub fn snapshot() -> String {
    // Prometheus-style text without HELP/TYPE lines
    format!(
        "rchan_popped {}\nrchan_sent {}\nrchan_flush_batches {}\nrchan_flushed {}\nrchan_resubmitted {}\nrchan_dropped_flush {}\nrchan_drained_back {}\nrchan_discarded_drain {}\nrchan_lost_drain {}\nrchan_store_errors {}\n",
        POPPED.load(Ordering::Relaxed),
        SENT.load(Ordering::Relaxed),
        FLUSH_BATCHES.load(Ordering::Relaxed),
        FLUSHED.load(Ordering::Relaxed),
        RESUBMITTED.load(Ordering::Relaxed),
        DROPPED_FLUSH.load(Ordering::Relaxed),
        DRAINED_BACK.load(Ordering::Relaxed),
        DISCARDED_DRAIN.load(Ordering::Relaxed),
        LOST_DRAIN.load(Ordering::Relaxed),
        STORE_ERRORS.load(Ordering::Relaxed),
    )
}
