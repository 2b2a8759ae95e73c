//! Pool usage counters.

use serde::{Deserialize, Serialize};

/// Statistics for pool usage.
///
/// Counters are plain integers: the pool is single-threaded, so every update
/// happens under `&mut BlockPool`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Number of successful acquires.
    pub acquires: u64,
    /// Number of blocks returned to the free list.
    pub releases: u64,
    /// Number of acquires that found the pool exhausted.
    pub exhaustions: u64,
    /// Largest number of blocks lent out at the same time.
    pub high_water: usize,
}

impl PoolStats {
    /// Create zeroed stats.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            acquires: 0,
            releases: 0,
            exhaustions: 0,
            high_water: 0,
        }
    }

    /// Record a successful acquire leaving `in_use` blocks lent.
    pub(crate) fn record_acquire(&mut self, in_use: usize) {
        self.acquires += 1;
        self.high_water = self.high_water.max(in_use);
    }

    /// Record a release.
    pub(crate) fn record_release(&mut self) {
        self.releases += 1;
    }

    /// Record an acquire against an empty free list.
    pub(crate) fn record_exhaustion(&mut self) {
        self.exhaustions += 1;
    }

    /// Fraction of acquire attempts that succeeded, or `1.0` with no attempts.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let attempts = self.acquires + self.exhaustions;
        if attempts == 0 {
            1.0
        } else {
            self.acquires as f64 / attempts as f64
        }
    }
}
