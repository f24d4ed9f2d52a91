//! Quality-driven coefficient quantization.
//!
//! A [`Quantizer`] is constructed once per compress or uncompress call and
//! shared by reference across all workers, so the divisor table is derived
//! exactly once per quality value with no process-wide state.

use crate::error::CodecError;
use crate::{QuantizedBlock, SampleBlock, BLOCK_SIZE};

/// Base luminance divisor table from the JPEG standard, scaled per quality.
const BASE_TABLE: [[i32; BLOCK_SIZE]; BLOCK_SIZE] = [
    [16, 11, 10, 16, 24, 40, 51, 61],
    [12, 12, 14, 19, 26, 58, 60, 55],
    [14, 13, 16, 24, 40, 57, 69, 56],
    [14, 17, 22, 29, 51, 87, 80, 62],
    [18, 22, 37, 56, 68, 109, 103, 77],
    [24, 35, 55, 64, 81, 104, 113, 92],
    [49, 64, 78, 87, 103, 121, 120, 101],
    [72, 92, 95, 98, 112, 100, 103, 99],
];

/// Quality-parameterized divisor table for one codec call.
#[derive(Debug, Clone)]
pub struct Quantizer {
    quality: u8,
    table: [[i32; BLOCK_SIZE]; BLOCK_SIZE],
}

impl Quantizer {
    /// Derive the divisor table for `quality`.
    ///
    /// Entries are clamped to a minimum of 1: the integer scaling formula
    /// reaches 0 for the smallest base entries at quality >= 96, which
    /// would divide by zero during quantization.
    pub fn new(quality: u8) -> Result<Self, CodecError> {
        if !(1..=99).contains(&quality) {
            return Err(CodecError::InvalidQuality(quality));
        }

        let multiplier = if quality < 50 {
            5000 / quality as i32
        } else {
            200 - 2 * quality as i32
        };

        let mut table = BASE_TABLE;
        for row in table.iter_mut() {
            for entry in row.iter_mut() {
                *entry = ((multiplier * *entry + 50) / 100).max(1);
            }
        }
        Ok(Self { quality, table })
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Divide each coefficient by its table entry, truncating toward zero
    /// and narrowing to the signed 8-bit range stored as unsigned bytes.
    pub fn quantize(&self, freqs: &SampleBlock, output: &mut QuantizedBlock) {
        for (y, row) in freqs.iter().enumerate() {
            for (x, &coeff) in row.iter().enumerate() {
                output[y][x] = (coeff / self.table[y][x] as f64) as i8 as u8;
            }
        }
    }

    /// Multiply each stored byte, reinterpreted as signed, by its table
    /// entry. The sign reinterpretation is mandatory: quantized values are
    /// logically signed even though stored as unsigned bytes.
    pub fn dequantize(&self, quantized: &QuantizedBlock, output: &mut SampleBlock) {
        for (y, row) in quantized.iter().enumerate() {
            for (x, &byte) in row.iter().enumerate() {
                output[y][x] = (byte as i8) as f64 * self.table[y][x] as f64;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_bounds_rejected() {
        assert!(matches!(
            Quantizer::new(0),
            Err(CodecError::InvalidQuality(0))
        ));
        assert!(matches!(
            Quantizer::new(100),
            Err(CodecError::InvalidQuality(100))
        ));
    }

    #[test]
    fn test_extreme_qualities_have_no_zero_entries() {
        for quality in [1, 50, 95, 99] {
            let q = Quantizer::new(quality).unwrap();
            assert!(
                q.table.iter().flatten().all(|&e| e >= 1),
                "quality {} produced a zero divisor",
                quality
            );
        }
    }

    #[test]
    fn test_table_scaling_follows_quality() {
        // quality 50 keeps the base table unchanged; lower quality scales
        // divisors up, higher quality scales them down.
        let q50 = Quantizer::new(50).unwrap();
        assert_eq!(q50.table, BASE_TABLE);

        let q10 = Quantizer::new(10).unwrap();
        let q90 = Quantizer::new(90).unwrap();
        assert!(q10.table[0][0] > q50.table[0][0]);
        assert!(q90.table[0][0] < q50.table[0][0]);
    }

    #[test]
    fn test_quantize_truncates_toward_zero() {
        let q = Quantizer::new(50).unwrap();
        let mut freqs = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        freqs[0][0] = -24.0; // divisor 16 -> -1.5 -> -1
        freqs[0][1] = 24.0; // divisor 11 -> 2.18 -> 2

        let mut out = [[0u8; BLOCK_SIZE]; BLOCK_SIZE];
        q.quantize(&freqs, &mut out);
        assert_eq!(out[0][0] as i8, -1);
        assert_eq!(out[0][1] as i8, 2);
    }

    #[test]
    fn test_negative_coefficients_survive_roundtrip() {
        let q = Quantizer::new(70).unwrap();
        let mut freqs = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        freqs[0][0] = -415.0;
        freqs[1][2] = -61.0;
        freqs[7][7] = 13.0;

        let mut quantized = [[0u8; BLOCK_SIZE]; BLOCK_SIZE];
        let mut back = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        q.quantize(&freqs, &mut quantized);
        q.dequantize(&quantized, &mut back);

        // Reconstruction error is bounded by one divisor step.
        for y in 0..BLOCK_SIZE {
            for x in 0..BLOCK_SIZE {
                let step = q.table[y][x] as f64;
                assert!(
                    (back[y][x] - freqs[y][x]).abs() < step,
                    "({}, {}): {} vs {}",
                    y,
                    x,
                    back[y][x],
                    freqs[y][x]
                );
            }
        }
        // And the signs must be preserved.
        assert!(back[0][0] < 0.0);
        assert!(back[1][2] < 0.0);
    }

    #[test]
    fn test_out_of_range_coefficients_saturate() {
        // quality 99 shrinks the DC divisor to 1, so a large DC term
        // saturates at the signed 8-bit limits instead of wrapping.
        let q = Quantizer::new(99).unwrap();
        let mut freqs = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        freqs[0][0] = 1016.0;
        freqs[0][1] = -1016.0;

        let mut out = [[0u8; BLOCK_SIZE]; BLOCK_SIZE];
        q.quantize(&freqs, &mut out);
        assert_eq!(out[0][0] as i8, i8::MAX);
        assert_eq!(out[0][1] as i8, i8::MIN);
    }
}
