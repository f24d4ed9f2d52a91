//! Tilepress Core - Block-based lossy image codec
//!
//! This crate implements a JPEG-family compression pipeline: color-space
//! conversion, chroma subsampling, a discrete cosine transform,
//! quality-driven quantization, zigzag coefficient reordering, and Huffman
//! entropy coding over a packed bitstream. Macroblocks are processed in
//! parallel; the bitmap I/O boundary and the command-line surface live in
//! the companion CLI crate.

pub mod codec;
pub mod container;
pub mod dct;
pub mod error;
pub mod huffman;
pub mod matrix;
pub mod pixel;
pub mod quantize;
pub mod zigzag;

pub use codec::{compress, uncompress};
pub use container::CompressedImage;
pub use error::CodecError;
pub use matrix::Matrix;
pub use pixel::{Channel, Pixel};
pub use quantize::Quantizer;

/// Side length of a transform block.
pub const BLOCK_SIZE: usize = 8;
/// Side length of a macroblock: four luma blocks plus subsampled chroma.
pub const MACROBLOCK_SIZE: usize = 16;
/// Linear subsampling ratio between macroblock and chroma block.
pub const SUBSAMPLE: usize = MACROBLOCK_SIZE / BLOCK_SIZE;

/// An 8x8 block of real-valued samples or frequency coefficients.
pub type SampleBlock = [[f64; BLOCK_SIZE]; BLOCK_SIZE];
/// An 8x8 block of quantized coefficient bytes.
pub type QuantizedBlock = [[u8; BLOCK_SIZE]; BLOCK_SIZE];
