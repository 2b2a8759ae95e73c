//! Block size arithmetic.
//!
//! Every block must be able to hold one free-list link (a `usize`) while it
//! is free, and every block boundary must be word-aligned. Both requirements
//! reduce to one rule: the effective block size is the nominal size, raised
//! to at least one word, then rounded up to a multiple of the word size.

/// Width of a free-list link in bytes (the pointer width of the target).
pub const WORD_SIZE: usize = std::mem::size_of::<usize>();

/// Round `size` up to the next multiple of [`WORD_SIZE`].
///
/// Computed as `(size + W - 1) & !(W - 1)`, which relies on `W` being a
/// power of two. Returns `None` if the rounded value overflows.
#[must_use]
pub const fn align_to_word(size: usize) -> Option<usize> {
    match size.checked_add(WORD_SIZE - 1) {
        Some(padded) => Some(padded & !(WORD_SIZE - 1)),
        None => None,
    }
}

/// Usable size of each block for a requested (nominal) block size.
///
/// `align_to_word(max(nominal, WORD_SIZE))`.
#[must_use]
pub const fn effective_block_size(nominal: usize) -> Option<usize> {
    let floor = if nominal > WORD_SIZE {
        nominal
    } else {
        WORD_SIZE
    };
    align_to_word(floor)
}
