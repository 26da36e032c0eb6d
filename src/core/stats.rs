/// Per-bridge counters, snapshot by value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BridgeStats {
    /// `pop_front` round trips issued by the reader.
    pub pops: u64,
    /// Messages moved from the remote list into the read buffer.
    pub received: u64,
    /// `push_trim` round trips issued by the writer (successful or not).
    pub flushes: u64,
    pub flush_by_size: u64,
    pub flush_by_timer: u64,
    /// Messages confirmed appended by a flush.
    pub flushed: u64,
    /// Messages carried into the next flush after a failure.
    pub resubmitted: u64,
    /// Writer messages lost to a failed flush.
    pub dropped: u64,
    /// Read buffer messages appended back on shutdown.
    pub drained_back: u64,
    /// Read buffer messages thrown away on shutdown.
    pub discarded: u64,
    /// Read buffer messages whose push back failed on shutdown.
    pub drain_lost: u64,
    pub store_errors: u64,
}

/// Why a flush happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlushTrigger {
    Size,
    Timer,
    Close,
}

impl BridgeStats {
    pub(crate) fn record_flush(&mut self, trigger: FlushTrigger) {
        self.flushes += 1;
        match trigger {
            FlushTrigger::Size => self.flush_by_size += 1,
            FlushTrigger::Timer => self.flush_by_timer += 1,
            FlushTrigger::Close => {}
        }
    }
}
