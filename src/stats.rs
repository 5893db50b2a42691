//! Stream statistics.
//!
//! Plain relaxed atomics, shared by the receive and render threads and read
//! by whoever draws the overlay. Counters are individually monotonic but
//! carry no cross-counter consistency guarantee: a reader may transiently
//! observe `fragments_accepted > datagrams_total` under contention, which
//! is acceptable for display-only use. Nothing here feeds control
//! decisions.

use std::array;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::protocol::DropReason;

#[derive(Debug)]
pub struct StreamStats {
    datagrams_total: AtomicU64,
    datagrams_rejected: AtomicU64,
    fragments_accepted: AtomicU64,
    frames_completed: AtomicU64,
    frames_discarded: AtomicU64,
    frames_evicted: AtomicU64,
    frames_presented: AtomicU64,
    drops: [AtomicU64; DropReason::ALL.len()],
}

impl Default for StreamStats {
    fn default() -> Self {
        Self {
            datagrams_total: AtomicU64::new(0),
            datagrams_rejected: AtomicU64::new(0),
            fragments_accepted: AtomicU64::new(0),
            frames_completed: AtomicU64::new(0),
            frames_discarded: AtomicU64::new(0),
            frames_evicted: AtomicU64::new(0),
            frames_presented: AtomicU64::new(0),
            drops: array::from_fn(|_| AtomicU64::new(0)),
        }
    }
}

impl StreamStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One datagram came off the socket, valid or not.
    pub fn record_datagram(&self) {
        self.datagrams_total.fetch_add(1, Ordering::Relaxed);
    }

    /// A datagram was dropped without entering a frame.
    pub fn record_reject(&self, reason: DropReason) {
        self.datagrams_rejected.fetch_add(1, Ordering::Relaxed);
        self.drops[reason.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// A fragment was copied into the in-flight frame.
    pub fn record_fragment(&self) {
        self.fragments_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// A frame was reassembled and validated.
    pub fn record_completed(&self) {
        self.frames_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// An in-flight frame was abandoned.
    pub fn record_discard(&self, reason: DropReason) {
        self.frames_discarded.fetch_add(1, Ordering::Relaxed);
        self.drops[reason.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// A completed frame was evicted from the full handoff queue.
    pub fn record_evicted(&self) {
        self.frames_evicted.fetch_add(1, Ordering::Relaxed);
        self.drops[DropReason::QueueEvicted.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// A frame was handed to the display sink.
    pub fn record_presented(&self) {
        self.frames_presented.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            datagrams_total: self.datagrams_total.load(Ordering::Relaxed),
            datagrams_rejected: self.datagrams_rejected.load(Ordering::Relaxed),
            fragments_accepted: self.fragments_accepted.load(Ordering::Relaxed),
            frames_completed: self.frames_completed.load(Ordering::Relaxed),
            frames_discarded: self.frames_discarded.load(Ordering::Relaxed),
            frames_evicted: self.frames_evicted.load(Ordering::Relaxed),
            frames_presented: self.frames_presented.load(Ordering::Relaxed),
        }
    }

    /// Per-reason drop counts for the overlay.
    #[must_use]
    pub fn drops_snapshot(&self) -> Vec<(&'static str, u64)> {
        DropReason::ALL
            .iter()
            .enumerate()
            .map(|(idx, reason)| (reason.as_str(), self.drops[idx].load(Ordering::Relaxed)))
            .collect()
    }
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub datagrams_total: u64,
    pub datagrams_rejected: u64,
    pub fragments_accepted: u64,
    pub frames_completed: u64,
    pub frames_discarded: u64,
    pub frames_evicted: u64,
    pub frames_presented: u64,
}
