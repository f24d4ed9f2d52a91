//! Zigzag reordering between an 8x8 block and a 64-byte sequence.
//!
//! The permutation walks the block by ascending diagonal, so low spatial
//! frequencies come first in the linear sequence. It is fixed across the
//! whole system; both directions are pure table lookups.

use crate::{QuantizedBlock, BLOCK_SIZE};

/// `(row, column)` visited at each position of the linear sequence.
pub const ZIGZAG_ORDER: [(usize, usize); BLOCK_SIZE * BLOCK_SIZE] = [
    (0, 0), (0, 1), (1, 0), (2, 0), (1, 1), (0, 2), (0, 3), (1, 2),
    (2, 1), (3, 0), (4, 0), (3, 1), (2, 2), (1, 3), (0, 4), (0, 5),
    (1, 4), (2, 3), (3, 2), (4, 1), (5, 0), (6, 0), (5, 1), (4, 2),
    (3, 3), (2, 4), (1, 5), (0, 6), (0, 7), (1, 6), (2, 5), (3, 4),
    (4, 3), (5, 2), (6, 1), (7, 0), (7, 1), (6, 2), (5, 3), (4, 4),
    (3, 5), (2, 6), (1, 7), (2, 7), (3, 6), (4, 5), (5, 4), (6, 3),
    (7, 2), (7, 3), (6, 4), (5, 5), (4, 6), (3, 7), (4, 7), (5, 6),
    (6, 5), (7, 4), (7, 5), (6, 6), (5, 7), (6, 7), (7, 6), (7, 7),
];

/// Flatten a block into zigzag order.
pub fn scan(block: &QuantizedBlock, output: &mut [u8; BLOCK_SIZE * BLOCK_SIZE]) {
    for (out, &(y, x)) in output.iter_mut().zip(ZIGZAG_ORDER.iter()) {
        *out = block[y][x];
    }
}

/// Rebuild a block from a zigzag-ordered sequence.
pub fn unscan(sequence: &[u8; BLOCK_SIZE * BLOCK_SIZE], output: &mut QuantizedBlock) {
    for (&value, &(y, x)) in sequence.iter().zip(ZIGZAG_ORDER.iter()) {
        output[y][x] = value;
    }
}
