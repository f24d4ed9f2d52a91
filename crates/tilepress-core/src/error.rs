//! Error types for the codec.

use thiserror::Error;

/// Errors that can occur while compressing or decompressing an image.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The quality parameter is outside the accepted `1..=99` range.
    #[error("quality must be in the [1, 99] interval, got {0}")]
    InvalidQuality(u8),

    /// The compressed payload is truncated or corrupt.
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// I/O error while reading or writing a container file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
