//! Serialized compressed-image container.
//!
//! The container is self-describing: the Huffman decode table and the
//! exact bit count travel with the payload, so a decoder needs no
//! out-of-band agreement with the encoder. Rebuilding a byte-identical
//! tree from quality alone is not guaranteed (tree shape depends on the
//! image's own byte statistics), so the table is always embedded.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::huffman::DecodeTable;

/// A compressed image: quality, dimensions, and the entropy-coded stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressedImage {
    /// Quality the image was compressed at, in `[1, 99]`.
    pub quality: u8,
    /// Grid height in pixels, a multiple of the macroblock size.
    pub height: u32,
    /// Grid width in pixels, a multiple of the macroblock size.
    pub width: u32,
    /// Number of meaningful bits in `payload`.
    pub bit_count: u64,
    /// Huffman decode table for `payload`.
    pub decode_table: DecodeTable,
    /// Packed entropy-coded bytes.
    pub payload: Vec<u8>,
}

impl CompressedImage {
    /// Write the container to `path`.
    pub fn save(&self, path: &Path) -> Result<(), CodecError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        bincode::serialize_into(writer, self)
            .map_err(|e| CodecError::MalformedContainer(e.to_string()))
    }

    /// Read a container back from `path`.
    pub fn load(path: &Path) -> Result<Self, CodecError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        bincode::deserialize_from(reader)
            .map_err(|e| CodecError::MalformedContainer(e.to_string()))
    }

    /// Serialized payload size in bytes, for reporting.
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}
