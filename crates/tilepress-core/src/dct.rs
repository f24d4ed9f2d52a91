//! Forward and inverse 2D discrete cosine transform over 8x8 blocks.
//!
//! Uses the direct O(N^4) double-sum definition of the DCT-II/DCT-III
//! pair rather than a fast factorization. The cosine basis is evaluated
//! once per process and reused for every block.

use std::f64::consts::PI;

use once_cell::sync::Lazy;

use crate::{SampleBlock, BLOCK_SIZE};

/// `BASIS[x][u] = cos((2x + 1) * u * PI / (2 * BLOCK_SIZE))`.
static BASIS: Lazy<[[f64; BLOCK_SIZE]; BLOCK_SIZE]> = Lazy::new(|| {
    let mut basis = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
    for (x, row) in basis.iter_mut().enumerate() {
        for (u, value) in row.iter_mut().enumerate() {
            *value = ((2 * x + 1) as f64 * u as f64 * PI / (2 * BLOCK_SIZE) as f64).cos();
        }
    }
    basis
});

#[inline]
fn alpha(u: usize) -> f64 {
    if u == 0 {
        std::f64::consts::FRAC_1_SQRT_2
    } else {
        1.0
    }
}

#[inline]
fn beta() -> f64 {
    1.0 / BLOCK_SIZE as f64 + 1.0 / BLOCK_SIZE as f64
}

/// Forward 2D DCT-II: spatial samples to frequency coefficients.
pub fn forward(input: &SampleBlock, output: &mut SampleBlock) {
    let basis = &*BASIS;
    let beta = beta();
    for v in 0..BLOCK_SIZE {
        for u in 0..BLOCK_SIZE {
            let mut sum = 0.0;
            for (y, row) in input.iter().enumerate() {
                for (x, &sample) in row.iter().enumerate() {
                    sum += sample * basis[x][u] * basis[y][v];
                }
            }
            output[v][u] = sum * beta * alpha(u) * alpha(v);
        }
    }
}

/// Inverse 2D DCT-III: frequency coefficients back to spatial samples.
pub fn inverse(input: &SampleBlock, output: &mut SampleBlock) {
    let basis = &*BASIS;
    let beta = beta();
    for (y, out_row) in output.iter_mut().enumerate() {
        for (x, out) in out_row.iter_mut().enumerate() {
            let mut sum = 0.0;
            for (v, row) in input.iter().enumerate() {
                for (u, &coeff) in row.iter().enumerate() {
                    sum += coeff * alpha(u) * alpha(v) * basis[x][u] * basis[y][v];
                }
            }
            *out = sum * beta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Level-shifted luma block and its expected coefficients, a standard
    // worked example of the 8x8 DCT-II.
    const INPUT: [[i32; 8]; 8] = [
        [-76, -73, -67, -62, -58, -67, -64, -55],
        [-65, -69, -73, -38, -19, -43, -59, -56],
        [-66, -69, -60, -15, 16, -24, -62, -55],
        [-65, -70, -57, -6, 26, -22, -58, -59],
        [-61, -67, -60, -24, -2, -40, -60, -58],
        [-49, -63, -68, -58, -51, -60, -70, -53],
        [-43, -57, -64, -69, -73, -67, -63, -45],
        [-41, -49, -59, -60, -63, -52, -50, -34],
    ];
    const EXPECTED: [[i32; 8]; 8] = [
        [-415, -30, -61, 27, 56, -20, -2, 0],
        [4, -22, -61, 10, 13, -7, -9, 5],
        [-47, 7, 77, -25, -29, 10, 5, -6],
        [-49, 12, 34, -15, -10, 6, 2, 2],
        [12, -7, -13, -4, -2, 2, -3, 3],
        [-8, 3, 2, -6, -2, 1, 4, 2],
        [-1, 0, 0, -2, -1, -3, 4, -1],
        [0, 0, -1, -4, -1, 0, 1, 2],
    ];

    fn to_block(values: &[[i32; 8]; 8]) -> SampleBlock {
        let mut block = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        for y in 0..BLOCK_SIZE {
            for x in 0..BLOCK_SIZE {
                block[y][x] = values[y][x] as f64;
            }
        }
        block
    }

    #[test]
    fn test_forward_known_answer() {
        let input = to_block(&INPUT);
        let mut output = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        forward(&input, &mut output);

        for y in 0..BLOCK_SIZE {
            for x in 0..BLOCK_SIZE {
                assert_eq!(
                    output[y][x].round() as i32,
                    EXPECTED[y][x],
                    "coefficient ({}, {})",
                    y,
                    x
                );
            }
        }
    }

    #[test]
    fn test_constant_block_has_dc_only() {
        let input = [[-3.0; BLOCK_SIZE]; BLOCK_SIZE];
        let mut output = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        forward(&input, &mut output);

        // DC = beta * alpha(0)^2 * sum = 0.125 * 64 * -3.
        assert!((output[0][0] - (-24.0)).abs() < 1e-9);
        for (v, row) in output.iter().enumerate() {
            for (u, &coeff) in row.iter().enumerate() {
                if (v, u) != (0, 0) {
                    assert!(coeff.abs() < 1e-9, "AC ({}, {}) = {}", v, u, coeff);
                }
            }
        }
    }

    #[test]
    fn test_roundtrip_known_block() {
        let input = to_block(&INPUT);
        let mut freq = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        let mut back = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        forward(&input, &mut freq);
        inverse(&freq, &mut back);

        for y in 0..BLOCK_SIZE {
            for x in 0..BLOCK_SIZE {
                assert!((back[y][x] - input[y][x]).abs() < 1e-6);
            }
        }
    }
}
