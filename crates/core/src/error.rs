//! Error types for the adaptive Huffman codec.
//!
//! Only genuine failures are errors here. Running out of input while reading
//! a symbol is the normal end-of-data signal and is reported through
//! [`crate::bitio::ReadOutcome`] instead.

use thiserror::Error;

/// Top-level error type for all codec operations.
///
/// Each variant corresponds to a specific failure domain:
/// - Bit I/O: invalid requests to the bit writer
/// - Codec: a compressed stream that cannot be decoded
/// - I/O: the byte source or sink failed
/// - Config: invalid codec or application settings
#[derive(Debug, Error)]
pub enum Error {
    /// Bit I/O operation failed
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Compressed stream could not be decoded
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Underlying reader or writer failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Bit-level I/O errors.
#[derive(Debug, Error)]
pub enum BitIoError {
    /// Invalid bit count (more than 64 bits in one call)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Errors raised while setting up or decoding an adaptive Huffman stream.
///
/// The format carries no checksum, so most corruption decodes to garbage
/// rather than to one of these variants. Only structural problems that the
/// decoder can actually observe are reported.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Symbol size outside the range representable in the 4-bit header
    #[error("invalid symbol size {size}: must be between 1 and 15 bytes")]
    InvalidSymbolSize { size: usize },

    /// Input too short to hold the 4-bit symbol size header
    #[error("missing stream header")]
    MissingHeader,

    /// Input ended before the end-of-stream marker was read
    #[error("stream truncated after {bits_read} bits: no end-of-stream marker")]
    TruncatedStream { bits_read: u64 },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
