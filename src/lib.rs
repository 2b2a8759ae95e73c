//! Shared helpers for the cross-crate integration tests.

use std::collections::HashSet;

use blockpool::{Block, BlockPool};

/// Acquire blocks until the pool is exhausted.
pub fn drain(pool: &mut BlockPool) -> Vec<Block> {
    std::iter::from_fn(|| pool.acquire()).collect()
}

/// Check the free-list invariants: every free index is in range and appears
/// once, and free plus lent blocks cover the whole pool.
pub fn assert_free_list_consistent(pool: &BlockPool) {
    let mut seen = HashSet::new();
    for index in pool.free_indices() {
        assert!(index < pool.block_count(), "free index {index} out of range");
        assert!(seen.insert(index), "free index {index} listed twice");
    }
    assert_eq!(seen.len() + pool.in_use(), pool.block_count());
    assert_eq!(pool.is_exhausted(), seen.is_empty());
}
