//! Error type for pool construction and checked block access.

/// Errors reported by [`BlockPool`](crate::BlockPool).
///
/// Exhaustion is not an error: `acquire` reports it as `None`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Block count or block size is out of range.
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),

    /// `blocks * block_size` does not fit in the address space.
    #[error("pool of {blocks} blocks x {block_size} bytes overflows usize")]
    CapacityOverflow {
        /// Requested block count.
        blocks: usize,
        /// Effective block size in bytes.
        block_size: usize,
    },

    /// The system allocator refused the buffer.
    #[error("failed to reserve {bytes} bytes for the pool buffer")]
    Allocation {
        /// Size of the refused reservation.
        bytes: usize,
    },

    /// The block was handed out by a different pool.
    #[error("block does not belong to this pool")]
    ForeignBlock,

    /// The value does not fit in one block.
    #[error("value of {size} bytes does not fit in a {block_size}-byte block")]
    ValueTooLarge {
        /// Size of the value in bytes.
        size: usize,
        /// Block size of the pool.
        block_size: usize,
    },
}

impl PoolError {
    /// Whether the error stems from the requested pool shape rather than from
    /// the allocator or from block misuse.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::CapacityOverflow { .. })
    }
}
