//! Macroblock compression and decompression pipeline.
//!
//! The image is partitioned into non-overlapping 16x16 macroblocks, each
//! contributing four 8x8 luma blocks plus two average-pooled 8x8 chroma
//! blocks (384 quantized bytes). Macroblocks are independent, so the block
//! phase runs data-parallel over disjoint ranges of the shared buffers:
//! each compression task owns one 384-byte chunk of the quantized stream,
//! each decompression task owns one 16-row band of the destination grid.
//! The entropy stage is inherently serial and runs before/after the
//! parallel phase.

use rayon::prelude::*;

use crate::container::CompressedImage;
use crate::error::CodecError;
use crate::huffman;
use crate::matrix::Matrix;
use crate::pixel::{Channel, Pixel};
use crate::quantize::Quantizer;
use crate::zigzag;
use crate::{dct, QuantizedBlock, SampleBlock, BLOCK_SIZE, MACROBLOCK_SIZE, SUBSAMPLE};

const BLOCK_AREA: usize = BLOCK_SIZE * BLOCK_SIZE;
const LUMA_BLOCKS: usize = SUBSAMPLE * SUBSAMPLE;
/// Quantized bytes one macroblock contributes: 4 luma + 2 chroma blocks.
const MACROBLOCK_BYTES: usize = (LUMA_BLOCKS + 2) * BLOCK_AREA;

/// Worker-local scratch for the compression phase, allocated once per
/// worker and reused across its macroblocks.
struct CompressScratch {
    samples: SampleBlock,
    freqs: SampleBlock,
    quantized: QuantizedBlock,
    sequence: [u8; BLOCK_AREA],
}

impl CompressScratch {
    fn new() -> Self {
        Self {
            samples: [[0.0; BLOCK_SIZE]; BLOCK_SIZE],
            freqs: [[0.0; BLOCK_SIZE]; BLOCK_SIZE],
            quantized: [[0u8; BLOCK_SIZE]; BLOCK_SIZE],
            sequence: [0u8; BLOCK_AREA],
        }
    }
}

/// Worker-local scratch for the decompression phase.
struct UncompressScratch {
    sequence: [u8; BLOCK_AREA],
    quantized: QuantizedBlock,
    freqs: SampleBlock,
    luma: [SampleBlock; LUMA_BLOCKS],
    cb: SampleBlock,
    cr: SampleBlock,
}

impl UncompressScratch {
    fn new() -> Self {
        Self {
            sequence: [0u8; BLOCK_AREA],
            quantized: [[0u8; BLOCK_SIZE]; BLOCK_SIZE],
            freqs: [[0.0; BLOCK_SIZE]; BLOCK_SIZE],
            luma: [[[0.0; BLOCK_SIZE]; BLOCK_SIZE]; LUMA_BLOCKS],
            cb: [[0.0; BLOCK_SIZE]; BLOCK_SIZE],
            cr: [[0.0; BLOCK_SIZE]; BLOCK_SIZE],
        }
    }
}

fn level_shift(block: &mut SampleBlock, delta: f64) {
    for row in block.iter_mut() {
        for sample in row.iter_mut() {
            *sample += delta;
        }
    }
}

/// Level shift, transform, quantize, and zigzag one extracted block into
/// its 64-byte slot of the quantized stream.
fn compress_block(quantizer: &Quantizer, scratch: &mut CompressScratch, out: &mut [u8]) {
    level_shift(&mut scratch.samples, -128.0);
    dct::forward(&scratch.samples, &mut scratch.freqs);
    quantizer.quantize(&scratch.freqs, &mut scratch.quantized);
    zigzag::scan(&scratch.quantized, &mut scratch.sequence);
    out.copy_from_slice(&scratch.sequence);
}

/// Compress one 16x16 macroblock into its owned 384-byte chunk:
/// four luma blocks in row-major order, then pooled Cb, then pooled Cr.
fn compress_macroblock(
    matrix: &Matrix,
    quantizer: &Quantizer,
    scratch: &mut CompressScratch,
    y: usize,
    x: usize,
    out: &mut [u8],
) {
    let mut offset = 0;
    for yy in (0..MACROBLOCK_SIZE).step_by(BLOCK_SIZE) {
        for xx in (0..MACROBLOCK_SIZE).step_by(BLOCK_SIZE) {
            matrix.copy_block(y + yy, x + xx, Channel::Luma, &mut scratch.samples);
            compress_block(quantizer, scratch, &mut out[offset..offset + BLOCK_AREA]);
            offset += BLOCK_AREA;
        }
    }
    for channel in [Channel::Cb, Channel::Cr] {
        matrix.pool_block(y, x, channel, &mut scratch.samples);
        compress_block(quantizer, scratch, &mut out[offset..offset + BLOCK_AREA]);
        offset += BLOCK_AREA;
    }
}

/// Compress a pixel grid at the given quality.
pub fn compress(matrix: &Matrix, quality: u8) -> Result<CompressedImage, CodecError> {
    let quantizer = Quantizer::new(quality)?;
    let mbs_per_row = matrix.width() / MACROBLOCK_SIZE;
    let mbs_per_col = matrix.height() / MACROBLOCK_SIZE;

    let mut quantized = vec![0u8; mbs_per_row * mbs_per_col * MACROBLOCK_BYTES];
    quantized
        .par_chunks_mut(MACROBLOCK_BYTES)
        .enumerate()
        .for_each_init(CompressScratch::new, |scratch, (index, chunk)| {
            let y = index / mbs_per_row * MACROBLOCK_SIZE;
            let x = index % mbs_per_row * MACROBLOCK_SIZE;
            compress_macroblock(matrix, &quantizer, scratch, y, x, chunk);
        });

    let encoded = huffman::encode(&quantized);
    log::debug!(
        "compressed {}x{} at quality {}: {} quantized bytes -> {} payload bytes",
        matrix.width(),
        matrix.height(),
        quality,
        quantized.len(),
        encoded.payload.len()
    );

    Ok(CompressedImage {
        quality,
        height: matrix.height() as u32,
        width: matrix.width() as u32,
        bit_count: encoded.bit_count,
        decode_table: encoded.decode_table,
        payload: encoded.payload,
    })
}

/// Unscan, dequantize, inverse-transform, and level-shift one 64-byte slot
/// of the quantized stream back into a spatial sample block.
fn uncompress_block(
    quantizer: &Quantizer,
    bytes: &[u8],
    sequence: &mut [u8; BLOCK_AREA],
    quantized: &mut QuantizedBlock,
    freqs: &mut SampleBlock,
    out: &mut SampleBlock,
) {
    sequence.copy_from_slice(bytes);
    zigzag::unscan(sequence, quantized);
    quantizer.dequantize(quantized, freqs);
    dct::inverse(freqs, out);
    level_shift(out, 128.0);
}

/// Reconstruct one macroblock into its 16-row band of the pixel grid.
///
/// Each pooled chroma sample is replicated over its `SUBSAMPLE x
/// SUBSAMPLE` pixel group (the inverse of average pooling); all channels
/// recombine through the YCbCr pixel constructor.
fn uncompress_macroblock(
    quantizer: &Quantizer,
    scratch: &mut UncompressScratch,
    bytes: &[u8],
    band: &mut [Pixel],
    width: usize,
    x0: usize,
) {
    let mut offset = 0;
    for i in 0..LUMA_BLOCKS {
        uncompress_block(
            quantizer,
            &bytes[offset..offset + BLOCK_AREA],
            &mut scratch.sequence,
            &mut scratch.quantized,
            &mut scratch.freqs,
            &mut scratch.luma[i],
        );
        offset += BLOCK_AREA;
    }
    for chroma in [&mut scratch.cb, &mut scratch.cr] {
        uncompress_block(
            quantizer,
            &bytes[offset..offset + BLOCK_AREA],
            &mut scratch.sequence,
            &mut scratch.quantized,
            &mut scratch.freqs,
            chroma,
        );
        offset += BLOCK_AREA;
    }

    let mut block = 0;
    for yy in 0..SUBSAMPLE {
        for xx in 0..SUBSAMPLE {
            let luma = &scratch.luma[block];
            for y in 0..BLOCK_SIZE {
                for x in 0..BLOCK_SIZE {
                    let cy = (yy * BLOCK_SIZE + y) / SUBSAMPLE;
                    let cx = (xx * BLOCK_SIZE + x) / SUBSAMPLE;
                    let row = yy * BLOCK_SIZE + y;
                    let col = x0 + xx * BLOCK_SIZE + x;
                    band[row * width + col] =
                        Pixel::from_ycbcr(luma[y][x], scratch.cb[cy][cx], scratch.cr[cy][cx]);
                }
            }
            block += 1;
        }
    }
}

/// Decompress a container back into a pixel grid.
pub fn uncompress(image: &CompressedImage) -> Result<Matrix, CodecError> {
    let quantizer = Quantizer::new(image.quality)?;
    let height = image.height as usize;
    let width = image.width as usize;
    if height == 0
        || width == 0
        || height % MACROBLOCK_SIZE != 0
        || width % MACROBLOCK_SIZE != 0
    {
        return Err(CodecError::MalformedContainer(format!(
            "dimensions {}x{} are not multiples of the macroblock size",
            width, height
        )));
    }

    let quantized = huffman::decode(&image.payload, &image.decode_table, image.bit_count)?;
    let mbs_per_row = width / MACROBLOCK_SIZE;
    let expected = height / MACROBLOCK_SIZE * mbs_per_row * MACROBLOCK_BYTES;
    if quantized.len() != expected {
        return Err(CodecError::MalformedContainer(format!(
            "decoded stream is {} bytes, expected {}",
            quantized.len(),
            expected
        )));
    }

    let mut pixels = vec![Pixel::default(); height * width];
    pixels
        .par_chunks_mut(MACROBLOCK_SIZE * width)
        .enumerate()
        .for_each_init(UncompressScratch::new, |scratch, (band_index, band)| {
            let band_base = band_index * mbs_per_row * MACROBLOCK_BYTES;
            for mb in 0..mbs_per_row {
                let offset = band_base + mb * MACROBLOCK_BYTES;
                uncompress_macroblock(
                    &quantizer,
                    scratch,
                    &quantized[offset..offset + MACROBLOCK_BYTES],
                    band,
                    width,
                    mb * MACROBLOCK_SIZE,
                );
            }
        });

    log::debug!("decompressed {}x{} at quality {}", width, height, image.quality);
    Ok(Matrix::from_pixels(height, width, pixels))
}
