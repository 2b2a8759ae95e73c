//! # blockpool
//!
//! Fixed-block memory pool for workloads that repeatedly allocate and free
//! same-sized objects.
//!
//! A [`BlockPool`] reserves one contiguous buffer up front and lends it out as
//! fixed-size blocks in O(1). Unused blocks form a singly linked free list
//! whose links live inside the blocks themselves, so the pool keeps no
//! per-block metadata outside its buffer.
//!
//! ```
//! use blockpool::BlockPool;
//!
//! let mut pool = BlockPool::create(3, 8)?;
//! let block = pool.acquire().expect("fresh pool has free blocks");
//! pool.write(&block, &42u64)?;
//! assert_eq!(pool.read::<u64>(&block)?, 42);
//! pool.release(block);
//! # Ok::<(), blockpool::PoolError>(())
//! ```
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod layout;
pub mod pool;
pub mod shared;
pub mod stats;

pub use config::PoolConfig;
pub use error::PoolError;
pub use pool::{Block, BlockPool};
pub use shared::SharedBlockPool;
pub use stats::PoolStats;
