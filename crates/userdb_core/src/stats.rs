//! Store statistics.
//!
//! Counters live behind their own synchronization, separate from the data
//! path locks, so recording never contends with store operations.
//!
//! # Usage
//!
//! ```rust
//! use userdb_core::{EntityStore, User};
//!
//! let store = EntityStore::new();
//! store.create(User::new("Alice", "alice@example.com"));
//! store.get_all();
//!
//! let stats = store.stats();
//! assert_eq!(stats.reads, 1);
//! assert_eq!(stats.writes, 1);
//! ```

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
struct OpCounters {
    reads: u64,
    writes: u64,
    lock_wait: Duration,
}

/// Store statistics collector.
///
/// Reads, writes and cumulative lock wait are updated together under one
/// mutex so the average is always computed from a coherent triple.
/// Transaction and cleanup counters are plain atomics.
#[derive(Debug)]
pub(crate) struct StoreStats {
    enabled: bool,
    ops: Mutex<OpCounters>,
    transactions_begun: AtomicU64,
    transactions_committed: AtomicU64,
    transactions_rolled_back: AtomicU64,
    cleanups: AtomicU64,
}

impl Default for StoreStats {
    fn default() -> Self {
        Self::new(true)
    }
}

impl StoreStats {
    /// Creates a collector. A disabled collector ignores every record call.
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ops: Mutex::new(OpCounters::default()),
            transactions_begun: AtomicU64::new(0),
            transactions_committed: AtomicU64::new(0),
            transactions_rolled_back: AtomicU64::new(0),
            cleanups: AtomicU64::new(0),
        }
    }

    /// Records a read operation and the time spent waiting for its locks.
    pub(crate) fn record_read(&self, wait: Duration) {
        if !self.enabled {
            return;
        }
        let mut ops = self.ops.lock();
        ops.reads += 1;
        ops.lock_wait += wait;
    }

    /// Records a write operation and the time spent waiting for its locks.
    pub(crate) fn record_write(&self, wait: Duration) {
        if !self.enabled {
            return;
        }
        let mut ops = self.ops.lock();
        ops.writes += 1;
        ops.lock_wait += wait;
    }

    pub(crate) fn record_transaction_begin(&self) {
        self.bump(&self.transactions_begun);
    }

    pub(crate) fn record_transaction_commit(&self) {
        self.bump(&self.transactions_committed);
    }

    pub(crate) fn record_transaction_rollback(&self) {
        self.bump(&self.transactions_rolled_back);
    }

    pub(crate) fn record_cleanup(&self) {
        self.bump(&self.cleanups);
    }

    fn bump(&self, counter: &AtomicU64) {
        if self.enabled {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns a point-in-time snapshot of all counters.
    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        let (reads, writes, lock_wait) = {
            let ops = self.ops.lock();
            (ops.reads, ops.writes, ops.lock_wait)
        };

        let total = reads + writes;
        let avg_lock_wait = if total > 0 {
            // Saturates for absurd totals instead of panicking on overflow.
            lock_wait / u32::try_from(total).unwrap_or(u32::MAX)
        } else {
            Duration::ZERO
        };

        StatsSnapshot {
            reads,
            writes,
            total_lock_wait: lock_wait,
            avg_lock_wait,
            transactions_begun: self.transactions_begun.load(Ordering::Relaxed),
            transactions_committed: self.transactions_committed.load(Ordering::Relaxed),
            transactions_rolled_back: self.transactions_rolled_back.load(Ordering::Relaxed),
            cleanups: self.cleanups.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of store statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Total number of read operations.
    pub reads: u64,
    /// Total number of write operations.
    pub writes: u64,
    /// Cumulative time spent waiting for locks.
    pub total_lock_wait: Duration,
    /// Average lock wait per operation, zero when nothing was recorded.
    pub avg_lock_wait: Duration,
    /// Transactions begun.
    pub transactions_begun: u64,
    /// Transactions committed.
    pub transactions_committed: u64,
    /// Transactions rolled back.
    pub transactions_rolled_back: u64,
    /// Lock cleanup runs.
    pub cleanups: u64,
}

impl StatsSnapshot {
    /// Returns reads plus writes.
    #[must_use]
    pub fn total_ops(&self) -> u64 {
        self.reads + self.writes
    }
}
