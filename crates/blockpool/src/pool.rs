//! Fixed-block pool with an intrusive, index-linked free list.
//!
//! The pool owns one word-aligned buffer split into `block_count` blocks of
//! `block_size` bytes. While a block is free, its first word holds the index
//! of the next free block (or a sentinel); once lent out, the same word is
//! ordinary payload. The free list therefore costs no memory outside the
//! buffer.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::Pod;

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::layout::{self, WORD_SIZE};
use crate::stats::PoolStats;

/// Link value marking the end of the free list.
const NIL: usize = usize::MAX;

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a block lent out by a [`BlockPool`].
///
/// Handles are move-only: the only way to give a block back is to pass the
/// handle itself to [`BlockPool::release`], so a block cannot be released
/// twice. Dropping a handle without releasing it keeps the block lent until
/// the pool is destroyed.
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "a dropped block stays lent until the pool is destroyed"]
pub struct Block {
    pool: u64,
    index: usize,
}

impl Block {
    /// Position of the block in its pool, counted in blocks.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Fixed-size block allocator over a single pre-reserved buffer.
///
/// All operations are O(1) except [`free_count`](Self::free_count), which
/// walks the free list. The pool is single-threaded; wrap it in
/// [`SharedBlockPool`](crate::SharedBlockPool) to share it.
pub struct BlockPool {
    id: u64,
    buffer: Box<[usize]>,
    block_size: usize,
    block_count: usize,
    free_head: Option<usize>,
    in_use: usize,
    stats: PoolStats,
    // Debug-only tag per block: true while lent out.
    #[cfg(debug_assertions)]
    lent: Vec<bool>,
}

impl BlockPool {
    /// Create a pool of `block_count` blocks of at least `nominal_block_size`
    /// bytes each.
    ///
    /// The block size is raised to one word and rounded up to a word
    /// multiple (see [`layout::effective_block_size`]). Blocks are threaded
    /// onto the free list from first to last, so the first `acquire` returns
    /// the last block of the buffer.
    pub fn create(block_count: usize, nominal_block_size: usize) -> Result<Self, PoolError> {
        if block_count == 0 {
            return Err(PoolError::InvalidConfig(
                "block count must be positive".into(),
            ));
        }
        if nominal_block_size == 0 {
            return Err(PoolError::InvalidConfig("block size must be positive".into()));
        }

        let overflow = PoolError::CapacityOverflow {
            blocks: block_count,
            block_size: nominal_block_size,
        };
        let block_size =
            layout::effective_block_size(nominal_block_size).ok_or(overflow.clone())?;
        let total_size = block_count.checked_mul(block_size).ok_or(overflow)?;

        let words = total_size / WORD_SIZE;
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(words)
            .map_err(|_| PoolError::Allocation { bytes: total_size })?;
        buffer.resize(words, 0usize);

        let mut pool = Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            buffer: buffer.into_boxed_slice(),
            block_size,
            block_count,
            free_head: None,
            in_use: 0,
            stats: PoolStats::new(),
            #[cfg(debug_assertions)]
            lent: vec![false; block_count],
        };
        for index in 0..block_count {
            pool.push_free(index);
        }

        tracing::debug!(
            pool = pool.id,
            blocks = block_count,
            block_size,
            total_size,
            "block pool created"
        );
        Ok(pool)
    }

    /// Create a pool from a [`PoolConfig`].
    pub fn from_config(config: &PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        Self::create(config.block_count, config.block_size)
    }

    /// Take a block off the free list.
    ///
    /// Returns `None` when every block is lent out. The block's contents are
    /// whatever its previous user left behind.
    pub fn acquire(&mut self) -> Option<Block> {
        let Some(index) = self.pop_free() else {
            self.stats.record_exhaustion();
            tracing::trace!(pool = self.id, "block pool exhausted");
            return None;
        };

        #[cfg(debug_assertions)]
        {
            debug_assert!(!self.lent[index], "free list holds lent block {index}");
            self.lent[index] = true;
        }
        self.in_use += 1;
        self.stats.record_acquire(self.in_use);
        Some(Block {
            pool: self.id,
            index,
        })
    }

    /// Give a block back to the pool. `None` is a no-op.
    ///
    /// A block from another pool panics in debug builds and is ignored in
    /// release builds; use [`try_release`](Self::try_release) to get an error
    /// instead.
    pub fn release(&mut self, block: impl Into<Option<Block>>) {
        let Some(block) = block.into() else {
            return;
        };
        let index = block.index;
        if let Err(err) = self.try_release(block) {
            tracing::warn!(pool = self.id, block = index, %err, "release ignored");
            #[cfg(debug_assertions)]
            panic!("block {index} released into pool {} it does not belong to", self.id);
        }
    }

    /// Give a block back to the pool, reporting foreign blocks as an error.
    pub fn try_release(&mut self, block: Block) -> Result<(), PoolError> {
        if block.pool != self.id {
            return Err(PoolError::ForeignBlock);
        }

        #[cfg(debug_assertions)]
        {
            assert!(
                self.lent[block.index],
                "block {} released while already free",
                block.index
            );
            self.lent[block.index] = false;
        }
        self.push_free(block.index);
        self.in_use -= 1;
        self.stats.record_release();
        Ok(())
    }

    /// Release the whole buffer at once.
    ///
    /// Block contents are not inspected: any resources referenced from lent
    /// blocks must be cleaned up before. Dropping the pool is equivalent.
    pub fn destroy(self) {
        drop(self);
    }

    /// Usable bytes per block.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks the pool was created with.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Size of the owned buffer in bytes (`block_count * block_size`).
    #[must_use]
    pub fn total_size(&self) -> usize {
        self.block_count * self.block_size
    }

    /// Number of blocks currently lent out.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Number of free blocks, counted by walking the free list.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_indices().count()
    }

    /// Indices of the free blocks in the order `acquire` will hand them out.
    pub fn free_indices(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.free_head, |&index| self.link(index)).take(self.block_count)
    }

    /// Whether the next `acquire` will return `None`.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.free_head.is_none()
    }

    /// Whether `block` was handed out by this pool.
    #[must_use]
    pub fn contains(&self, block: &Block) -> bool {
        block.pool == self.id && block.index < self.block_count
    }

    /// Byte offset of `block` from the start of the buffer.
    #[must_use]
    pub fn offset_of(&self, block: &Block) -> usize {
        block.index * self.block_size
    }

    /// The block's bytes.
    ///
    /// Panics if `block` belongs to another pool.
    #[must_use]
    pub fn bytes(&self, block: &Block) -> &[u8] {
        let words = self.words_of(block);
        bytemuck::cast_slice(&self.buffer[words])
    }

    /// The block's bytes, writable.
    ///
    /// Panics if `block` belongs to another pool.
    pub fn bytes_mut(&mut self, block: &Block) -> &mut [u8] {
        let words = self.words_of(block);
        bytemuck::cast_slice_mut(&mut self.buffer[words])
    }

    /// Copy a plain-old-data value out of the start of the block.
    pub fn read<T: Pod>(&self, block: &Block) -> Result<T, PoolError> {
        let size = std::mem::size_of::<T>();
        self.check_access(block, size)?;
        Ok(bytemuck::pod_read_unaligned(&self.bytes(block)[..size]))
    }

    /// Copy a plain-old-data value into the start of the block.
    pub fn write<T: Pod>(&mut self, block: &Block, value: &T) -> Result<(), PoolError> {
        let src = bytemuck::bytes_of(value);
        self.check_access(block, src.len())?;
        self.bytes_mut(block)[..src.len()].copy_from_slice(src);
        Ok(())
    }

    /// Usage counters since creation or the last [`reset_stats`](Self::reset_stats).
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Reset usage counters.
    pub fn reset_stats(&mut self) {
        self.stats = PoolStats::new();
    }

    fn words_of(&self, block: &Block) -> std::ops::Range<usize> {
        assert!(
            block.pool == self.id,
            "block {} does not belong to pool {}",
            block.index,
            self.id
        );
        let words_per_block = self.block_size / WORD_SIZE;
        let start = block.index * words_per_block;
        start..start + words_per_block
    }

    fn check_access(&self, block: &Block, size: usize) -> Result<(), PoolError> {
        if block.pool != self.id {
            return Err(PoolError::ForeignBlock);
        }
        if size > self.block_size {
            return Err(PoolError::ValueTooLarge {
                size,
                block_size: self.block_size,
            });
        }
        Ok(())
    }

    /// Next free block after `index`, read from the block's first word.
    fn link(&self, index: usize) -> Option<usize> {
        let next = self.buffer[index * (self.block_size / WORD_SIZE)];
        (next != NIL).then_some(next)
    }

    fn push_free(&mut self, index: usize) {
        self.buffer[index * (self.block_size / WORD_SIZE)] = self.free_head.unwrap_or(NIL);
        self.free_head = Some(index);
    }

    fn pop_free(&mut self) -> Option<usize> {
        let index = self.free_head?;
        self.free_head = self.link(index);
        Some(index)
    }
}

impl Drop for BlockPool {
    fn drop(&mut self) {
        tracing::debug!(
            pool = self.id,
            outstanding = self.in_use,
            total_size = self.total_size(),
            "block pool destroyed"
        );
    }
}

impl fmt::Debug for BlockPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockPool")
            .field("id", &self.id)
            .field("block_size", &self.block_size)
            .field("block_count", &self.block_count)
            .field("in_use", &self.in_use)
            .field("free_head", &self.free_head)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn drain(pool: &mut BlockPool) -> Vec<Block> {
        std::iter::from_fn(|| pool.acquire()).collect()
    }

    #[test]
    fn three_blocks_then_exhausted() {
        let mut pool = BlockPool::create(3, 8).unwrap();
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let c = pool.acquire().unwrap();
        let distinct: HashSet<usize> = [a.index(), b.index(), c.index()].into_iter().collect();
        assert_eq!(distinct.len(), 3);
        assert!(pool.acquire().is_none());
        assert!(pool.is_exhausted());

        let reused = b.index();
        pool.release(b);
        let again = pool.acquire().unwrap();
        assert_eq!(again.index(), reused);

        pool.release(a);
        pool.release(c);
        pool.release(again);
        assert_eq!(pool.free_count(), 3);
    }

    #[test]
    fn tiny_blocks_round_up_to_word() {
        let pool = BlockPool::create(4, 1).unwrap();
        assert_eq!(pool.block_size(), WORD_SIZE);
        assert_eq!(pool.total_size(), 4 * WORD_SIZE);
    }

    #[test]
    fn rejects_zero_sizes() {
        assert!(matches!(
            BlockPool::create(0, 8),
            Err(PoolError::InvalidConfig(_))
        ));
        assert!(matches!(
            BlockPool::create(8, 0),
            Err(PoolError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_overflowing_capacity() {
        assert!(matches!(
            BlockPool::create(usize::MAX, 16),
            Err(PoolError::CapacityOverflow { .. })
        ));
        assert!(matches!(
            BlockPool::create(1, usize::MAX),
            Err(PoolError::CapacityOverflow { .. })
        ));
    }

    #[test]
    fn reports_refused_allocation() {
        // Fits in usize, but exceeds isize::MAX bytes.
        let blocks = usize::MAX / WORD_SIZE;
        assert_eq!(
            BlockPool::create(blocks, WORD_SIZE).unwrap_err(),
            PoolError::Allocation {
                bytes: blocks * WORD_SIZE
            }
        );
    }

    #[test]
    fn acquisition_is_lifo_from_last_block() {
        let mut pool = BlockPool::create(5, 16).unwrap();
        let order: Vec<usize> = pool.free_indices().collect();
        assert_eq!(order, vec![4, 3, 2, 1, 0]);
        let blocks = drain(&mut pool);
        let indices: Vec<usize> = blocks.iter().map(Block::index).collect();
        assert_eq!(indices, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn blocks_lie_inside_buffer_and_are_aligned() {
        let mut pool = BlockPool::create(7, 12).unwrap();
        let blocks = drain(&mut pool);
        assert_eq!(blocks.len(), 7);
        for block in &blocks {
            let offset = pool.offset_of(block);
            assert!(offset < pool.total_size());
            assert_eq!(offset % pool.block_size(), 0);
            let bytes = pool.bytes(block);
            assert_eq!(bytes.len(), pool.block_size());
            assert_eq!(bytes.as_ptr() as usize % WORD_SIZE, 0);
        }
    }

    #[test]
    fn release_none_is_noop() {
        let mut pool = BlockPool::create(2, 8).unwrap();
        pool.release(None::<Block>);
        assert_eq!(pool.free_count(), 2);
        assert_eq!(drain(&mut pool).len(), 2);
        assert_eq!(pool.stats().releases, 0);
    }

    #[test]
    fn released_block_keeps_size_and_offset() {
        let mut pool = BlockPool::create(4, 24).unwrap();
        let block = pool.acquire().unwrap();
        let offset = pool.offset_of(&block);
        pool.release(block);
        let block = pool.acquire().unwrap();
        assert_eq!(pool.offset_of(&block), offset);
        assert_eq!(pool.bytes(&block).len(), 24);
    }

    #[test]
    fn payload_survives_until_release() {
        let mut pool = BlockPool::create(3, 32).unwrap();
        let blocks = drain(&mut pool);
        for (i, block) in blocks.iter().enumerate() {
            pool.bytes_mut(block).fill(u8::try_from(i).unwrap() + 1);
        }
        for (i, block) in blocks.iter().enumerate() {
            let expected = u8::try_from(i).unwrap() + 1;
            assert!(pool.bytes(block).iter().all(|&b| b == expected));
        }
        for block in blocks {
            pool.release(block);
        }
        assert_eq!(pool.free_count(), 3);
    }

    #[test]
    fn release_overwrites_only_the_link_word() {
        let mut pool = BlockPool::create(2, 32).unwrap();
        let block = pool.acquire().unwrap();
        pool.bytes_mut(&block).fill(0xAB);
        pool.release(block);
        let block = pool.acquire().unwrap();
        assert!(pool.bytes(&block)[WORD_SIZE..].iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn typed_read_write() {
        let mut pool = BlockPool::create(2, 16).unwrap();
        let block = pool.acquire().unwrap();
        pool.write(&block, &[7u32, 11, 13, 17]).unwrap();
        assert_eq!(pool.read::<[u32; 4]>(&block).unwrap(), [7, 11, 13, 17]);
        assert_eq!(pool.read::<u32>(&block).unwrap(), 7);
    }

    #[test]
    fn typed_access_rejects_oversized_values() {
        let mut pool = BlockPool::create(1, 8).unwrap();
        let block = pool.acquire().unwrap();
        assert_eq!(
            pool.write(&block, &[0u64; 2]),
            Err(PoolError::ValueTooLarge {
                size: 16,
                block_size: 8
            })
        );
        assert!(pool.read::<[u8; 9]>(&block).is_err());
    }

    #[test]
    fn foreign_blocks_are_detected() {
        let mut first = BlockPool::create(2, 8).unwrap();
        let mut second = BlockPool::create(2, 8).unwrap();
        let block = first.acquire().unwrap();
        assert!(first.contains(&block));
        assert!(!second.contains(&block));
        assert_eq!(second.read::<u64>(&block), Err(PoolError::ForeignBlock));
        assert_eq!(second.try_release(block), Err(PoolError::ForeignBlock));
        assert_eq!(second.free_count(), 2);
        assert_eq!(first.in_use(), 1);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "does not belong")]
    fn foreign_release_panics_in_debug() {
        let mut first = BlockPool::create(2, 8).unwrap();
        let mut second = BlockPool::create(2, 8).unwrap();
        let block = first.acquire().unwrap();
        second.release(block);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn foreign_release_is_ignored_in_release() {
        let mut first = BlockPool::create(2, 8).unwrap();
        let mut second = BlockPool::create(2, 8).unwrap();
        let block = first.acquire().unwrap();
        second.release(block);
        assert_eq!(second.free_count(), 2);
        assert_eq!(second.in_use(), 0);
        assert_eq!(second.stats().releases, 0);
        assert_eq!(first.in_use(), 1);
    }

    #[test]
    #[should_panic(expected = "does not belong")]
    fn foreign_bytes_access_panics() {
        let mut first = BlockPool::create(1, 8).unwrap();
        let second = BlockPool::create(1, 8).unwrap();
        let block = first.acquire().unwrap();
        let _ = second.bytes(&block);
    }

    #[test]
    fn stats_track_operations() {
        let mut pool = BlockPool::create(2, 8).unwrap();
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert!(pool.acquire().is_none());
        pool.release(a);
        let stats = pool.stats();
        assert_eq!(stats.acquires, 2);
        assert_eq!(stats.releases, 1);
        assert_eq!(stats.exhaustions, 1);
        assert_eq!(stats.high_water, 2);

        pool.reset_stats();
        assert_eq!(pool.stats(), PoolStats::default());
        pool.release(b);
        assert_eq!(pool.stats().releases, 1);
    }

    #[test]
    fn occupancy_accounting() {
        let mut pool = BlockPool::create(6, 8).unwrap();
        let mut held = Vec::new();
        for step in 0..20 {
            if step % 3 == 2 {
                pool.release(held.pop());
            } else if let Some(block) = pool.acquire() {
                held.push(block);
            }
            assert_eq!(pool.in_use(), held.len());
            assert_eq!(pool.free_count() + pool.in_use(), pool.block_count());
        }
    }

    #[test]
    fn from_config_uses_config_shape() {
        let config = PoolConfig {
            block_count: 10,
            block_size: 20,
        };
        let pool = BlockPool::from_config(&config).unwrap();
        assert_eq!(pool.block_count(), 10);
        assert_eq!(pool.block_size(), layout::effective_block_size(20).unwrap());
    }

    #[test]
    fn debug_output_omits_buffer() {
        let pool = BlockPool::create(2, 8).unwrap();
        let text = format!("{pool:?}");
        assert!(text.starts_with("BlockPool"));
        assert!(text.contains("block_count: 2"));
        assert!(!text.contains("buffer"));
    }

    #[test]
    fn destroy_with_outstanding_blocks() {
        let mut pool = BlockPool::create(3, 8).unwrap();
        let _kept = pool.acquire().unwrap();
        pool.destroy();
    }
}
