//! Sequence numbers for requests and canvas states.

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out monotonically increasing sequence numbers.
///
/// Every captured canvas state and every canvas reset takes a new number. A
/// finished request is stale once any newer number has been issued.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next sequence number.
    pub fn advance(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// The most recently issued number, 0 before the first call to `advance`.
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// True while no number newer than `sequence` has been issued.
    pub fn is_current(&self, sequence: u64) -> bool {
        self.latest() == sequence
    }
}
