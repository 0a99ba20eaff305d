//! Round-robin locality assignment

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Index of a locality within the pool
pub type LocalityIndex = usize;

/// Hands out localities to new tasks in round-robin order
///
/// Safe to call from any number of threads: every call takes its own
/// ticket from an atomic counter, so no two callers see the same value.
#[derive(Debug)]
pub struct LocalityAssigner {
    next: AtomicUsize,
    count: NonZeroUsize,
}

impl LocalityAssigner {
    pub fn new(count: NonZeroUsize) -> Self {
        Self {
            next: AtomicUsize::new(0),
            count,
        }
    }

    /// Pick the locality for a new task
    pub fn assign(&self) -> LocalityIndex {
        self.next.fetch_add(1, Ordering::Relaxed) % self.count.get()
    }

    /// Number of localities in the pool
    pub fn count(&self) -> usize {
        self.count.get()
    }
}
