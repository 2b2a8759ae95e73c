//! Pool shape configuration.

use serde::{Deserialize, Serialize};

use crate::error::PoolError;
use crate::layout;

/// Default number of blocks.
pub const DEFAULT_BLOCK_COUNT: usize = 64;

/// Default nominal block size in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// Requested shape of a [`BlockPool`](crate::BlockPool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of blocks to reserve.
    pub block_count: usize,
    /// Nominal block size in bytes, before word rounding.
    pub block_size: usize,
}

impl PoolConfig {
    /// Check the shape without allocating.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.block_count == 0 {
            return Err(PoolError::InvalidConfig(
                "block count must be positive".into(),
            ));
        }
        if self.block_size == 0 {
            return Err(PoolError::InvalidConfig("block size must be positive".into()));
        }
        self.total_size().map(|_| ())
    }

    /// Effective block size after word rounding.
    pub fn effective_block_size(&self) -> Result<usize, PoolError> {
        layout::effective_block_size(self.block_size).ok_or(self.overflow())
    }

    /// Buffer size the pool will reserve.
    pub fn total_size(&self) -> Result<usize, PoolError> {
        self.block_count
            .checked_mul(self.effective_block_size()?)
            .ok_or(self.overflow())
    }

    fn overflow(&self) -> PoolError {
        PoolError::CapacityOverflow {
            blocks: self.block_count,
            block_size: self.block_size,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            block_count: DEFAULT_BLOCK_COUNT,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}
