//! Mutex-guarded pool for callers that share one pool across threads.
//!
//! [`BlockPool`] itself takes no locks. Sharing it means serializing every
//! operation, which is all this wrapper does.

use parking_lot::Mutex;

use crate::error::PoolError;
use crate::pool::{Block, BlockPool};
use crate::stats::PoolStats;

/// A [`BlockPool`] behind a `parking_lot::Mutex`.
#[derive(Debug)]
pub struct SharedBlockPool {
    inner: Mutex<BlockPool>,
}

impl SharedBlockPool {
    /// Wrap an existing pool.
    #[must_use]
    pub fn new(pool: BlockPool) -> Self {
        Self {
            inner: Mutex::new(pool),
        }
    }

    /// Create and wrap a pool, see [`BlockPool::create`].
    pub fn create(block_count: usize, nominal_block_size: usize) -> Result<Self, PoolError> {
        BlockPool::create(block_count, nominal_block_size).map(Self::new)
    }

    /// Take a block off the free list.
    pub fn acquire(&self) -> Option<Block> {
        self.inner.lock().acquire()
    }

    /// Give a block back. `None` is a no-op.
    pub fn release(&self, block: impl Into<Option<Block>>) {
        self.inner.lock().release(block);
    }

    /// Run `f` with exclusive access to the pool, e.g. to touch block bytes.
    pub fn with<R>(&self, f: impl FnOnce(&mut BlockPool) -> R) -> R {
        f(&mut *self.inner.lock())
    }

    /// Snapshot of the usage counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.inner.lock().stats()
    }

    /// Unwrap the pool.
    #[must_use]
    pub fn into_inner(self) -> BlockPool {
        self.inner.into_inner()
    }
}
