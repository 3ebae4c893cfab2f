//! Compression and decompression drivers.
//!
//! Both directions build an [`AdaptiveTree`] from scratch and feed it the
//! same sequence of symbols, so the decoder always holds the tree the encoder
//! used for the next code. Nothing about the tree is transmitted.
//!
//! # Stream Format
//!
//! ```text
//! +--------------------+
//! | symbol size (4)    |  bits, unsigned, 1..=15
//! +--------------------+
//! | record             |  path to leaf          (symbol seen before)
//! |                    |  path to NYT + literal (new symbol, raw bytes)
//! +--------------------+
//! | framing bit (1)    |  0 = another record follows
//! +--------------------+
//! | ... more records   |
//! +--------------------+
//! | end marker (1)     |  1, in place of the last framing 0
//! +--------------------+
//! | padding (0-7)      |  zero bits up to the byte boundary
//! +--------------------+
//! ```
//!
//! All fields are MSB-first. The last record may carry a literal shorter
//! than the symbol size when the input length is not a multiple of it.
//!
//! # Short final literals
//!
//! The decoder reads a literal one whole byte at a time until it has a full
//! symbol or fewer than 8 bits remain, then reads the framing bit. If no bit
//! is left at that point, the last "byte" it took was the end marker plus
//! seven padding zeros (`0x80`); it is dropped and decoding stops.
//!
//! # Corruption
//!
//! There is no checksum. A damaged stream usually decodes to wrong bytes
//! without any error; only a stream that ends before its end marker is
//! reported (as [`CodecError::TruncatedStream`]).

use crate::bitio::{BitReader, BitWriter, ReadOutcome};
use crate::bits::{bits_to_u64, to_bit_string, u64_to_bits, Bit};
use crate::error::{CodecError, Result};
use crate::metrics::{CodecMetrics, Direction};
use crate::symbol::Symbol;
use crate::tree::AdaptiveTree;
use std::io::{Read, Write};
use tracing::{debug, trace};

/// Width of the symbol size header in bits.
pub const HEADER_BITS: usize = 4;

/// Largest symbol size the header can carry.
pub const MAX_SYMBOL_SIZE: usize = (1 << HEADER_BITS) - 1;

/// Symbol size used when none is configured.
pub const DEFAULT_SYMBOL_SIZE: usize = 1;

/// The byte the end marker and its padding form when they fill a whole byte.
const MARKER_BYTE: u8 = 0x80;

/// Compressor for one fixed symbol size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compressor {
    symbol_size: usize,
}

impl Compressor {
    /// Create a compressor for `symbol_size`-byte symbols.
    ///
    /// A size of 0 is silently raised to 1.
    ///
    /// # Errors
    /// `CodecError::InvalidSymbolSize` if the size exceeds [`MAX_SYMBOL_SIZE`].
    pub fn new(symbol_size: usize) -> Result<Self> {
        let symbol_size = symbol_size.max(1);
        if symbol_size > MAX_SYMBOL_SIZE {
            return Err(CodecError::InvalidSymbolSize { size: symbol_size }.into());
        }
        Ok(Self { symbol_size })
    }

    pub fn symbol_size(&self) -> usize {
        self.symbol_size
    }

    /// Compress everything `input` yields into `output`.
    ///
    /// The sink is flushed before returning. On error the sink may hold a
    /// partial stream; removing it is up to the caller.
    pub fn compress<R: Read, W: Write>(&self, input: R, output: W) -> Result<CodecMetrics> {
        let size = self.symbol_size;
        let mut metrics = CodecMetrics::new(Direction::Compress, size);
        debug!(symbol_size = size, "compression started");

        let mut reader = BitReader::new(input);
        let mut writer = BitWriter::new(output);
        let mut tree = AdaptiveTree::for_symbol_size(size);
        let mut scratch = Vec::with_capacity(size);

        write_path(&mut writer, &u64_to_bits(size as u64, HEADER_BITS))?;

        let mut next = read_symbol(&mut reader, size, &mut scratch)?;
        while let Some(symbol) = next {
            metrics.input_bytes += symbol.len() as u64;
            metrics.symbols += 1;

            match tree.lookup(&symbol) {
                Some(leaf) => {
                    let path = tree.path_from_root(leaf);
                    metrics.code_bits += path.len() as u64;
                    write_path(&mut writer, &path)?;
                    tree.update(leaf);
                }
                None => {
                    let path = tree.path_from_root(tree.current_nyt());
                    trace!(?symbol, nyt_path = %to_bit_string(&path), "new symbol");
                    write_path(&mut writer, &path)?;
                    for &byte in symbol.as_bytes() {
                        writer.write_byte(byte)?;
                    }
                    metrics.new_symbols += 1;
                    tree.add_new_symbol(symbol);
                }
            }

            next = read_symbol(&mut reader, size, &mut scratch)?;
            if next.is_some() {
                writer.write_bit(false)?;
            }
        }

        writer.write_bit(true)?;
        metrics.output_bytes = writer.bit_len().div_ceil(8);
        writer.finish()?;

        metrics.tree_nodes = tree.len();
        metrics.complete();
        debug!(
            input_bytes = metrics.input_bytes,
            output_bytes = metrics.output_bytes,
            distinct = tree.distinct_symbols(),
            tree_nodes = metrics.tree_nodes,
            "compression finished"
        );
        Ok(metrics)
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self {
            symbol_size: DEFAULT_SYMBOL_SIZE,
        }
    }
}

/// Decompress a stream produced by [`Compressor::compress`].
///
/// The symbol size is taken from the stream header.
///
/// # Errors
/// - `CodecError::MissingHeader` if the input holds fewer than 4 bits
/// - `CodecError::InvalidSymbolSize` if the header is 0
/// - `CodecError::TruncatedStream` if the input ends before the end marker
pub fn decompress<R: Read, W: Write>(input: R, output: W) -> Result<CodecMetrics> {
    let mut reader = BitReader::new(input);
    let mut writer = BitWriter::new(output);

    let size = read_header(&mut reader)?;
    let mut metrics = CodecMetrics::new(Direction::Decompress, size);
    debug!(symbol_size = size, "decompression started");

    let mut tree = AdaptiveTree::for_symbol_size(size);
    let mut literal = Vec::with_capacity(size + 1);

    loop {
        // Walk from the root to a leaf
        let mut cursor = tree.root();
        let mut depth = 0u64;
        while !tree.node(cursor).is_leaf() {
            let bit = match reader.read_bit()? {
                ReadOutcome::Value(bit) => bit,
                ReadOutcome::Exhausted => return Err(truncated(&reader)),
            };
            let Some(next) = tree.node(cursor).child(bit) else {
                break;
            };
            cursor = next;
            depth += 1;
        }

        let end_of_stream = if cursor == tree.current_nyt() {
            literal.clear();
            while literal.len() < size {
                match reader.read_byte()? {
                    ReadOutcome::Value(byte) => literal.push(byte),
                    ReadOutcome::Exhausted => break,
                }
            }

            let end = match reader.read_bit()? {
                ReadOutcome::Value(bit) => bit,
                ReadOutcome::Exhausted => {
                    // The marker and its padding were taken as a literal byte
                    if literal.pop() != Some(MARKER_BYTE) {
                        return Err(truncated(&reader));
                    }
                    true
                }
            };

            if literal.is_empty() {
                // Only an empty input has a NYT record without a literal
                if end && metrics.symbols == 0 {
                    break;
                }
                return Err(truncated(&reader));
            }

            let symbol = Symbol::new(&literal);
            trace!(?symbol, "new symbol");
            for &byte in symbol.as_bytes() {
                writer.write_byte(byte)?;
            }
            metrics.output_bytes += symbol.len() as u64;
            metrics.new_symbols += 1;
            tree.add_new_symbol(symbol);
            end
        } else {
            if let Some(symbol) = tree.node(cursor).symbol() {
                for &byte in symbol.as_bytes() {
                    writer.write_byte(byte)?;
                }
                metrics.output_bytes += symbol.len() as u64;
            }
            metrics.code_bits += depth;
            tree.update(cursor);

            match reader.read_bit()? {
                ReadOutcome::Value(bit) => bit,
                ReadOutcome::Exhausted => return Err(truncated(&reader)),
            }
        };

        metrics.symbols += 1;
        if end_of_stream {
            break;
        }
    }

    writer.finish()?;

    metrics.input_bytes = reader.bits_read().div_ceil(8);
    metrics.tree_nodes = tree.len();
    metrics.complete();
    debug!(
        input_bytes = metrics.input_bytes,
        output_bytes = metrics.output_bytes,
        distinct = tree.distinct_symbols(),
        tree_nodes = metrics.tree_nodes,
        "decompression finished"
    );
    Ok(metrics)
}

/// Compress an in-memory buffer.
pub fn compress_bytes(data: &[u8], symbol_size: usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    Compressor::new(symbol_size)?.compress(data, &mut out)?;
    Ok(out)
}

/// Decompress an in-memory buffer.
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress(data, &mut out)?;
    Ok(out)
}

/// Read the next symbol, or `None` once the source is empty.
fn read_symbol<R: Read>(
    reader: &mut BitReader<R>,
    size: usize,
    scratch: &mut Vec<u8>,
) -> Result<Option<Symbol>> {
    scratch.clear();
    while scratch.len() < size {
        match reader.read_byte()? {
            ReadOutcome::Value(byte) => scratch.push(byte),
            ReadOutcome::Exhausted => break,
        }
    }
    if scratch.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Symbol::new(scratch)))
    }
}

fn write_path<W: Write>(writer: &mut BitWriter<W>, path: &[Bit]) -> Result<()> {
    for &bit in path {
        writer.write_bit(bit)?;
    }
    Ok(())
}

fn read_header<R: Read>(reader: &mut BitReader<R>) -> Result<usize> {
    let mut header = Vec::with_capacity(HEADER_BITS);
    for _ in 0..HEADER_BITS {
        match reader.read_bit()? {
            ReadOutcome::Value(bit) => header.push(bit),
            ReadOutcome::Exhausted => return Err(CodecError::MissingHeader.into()),
        }
    }
    let size = bits_to_u64(&header) as usize;
    if size == 0 {
        return Err(CodecError::InvalidSymbolSize { size }.into());
    }
    Ok(size)
}

fn truncated<R: Read>(reader: &BitReader<R>) -> crate::error::Error {
    CodecError::TruncatedStream {
        bits_read: reader.bits_read(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_repeated_byte_stream() {
        let compressed = compress_bytes(b"AAAA", 1).unwrap();
        // 0001 | 01000001 | 0 1 0 1 0 1 | 1 | pad
        assert_eq!(compressed, vec![0x14, 0x15, 0x60]);
        assert_eq!(decompress_bytes(&compressed).unwrap(), b"AAAA");
    }

    #[test]
    fn test_empty_input() {
        let compressed = compress_bytes(b"", 1).unwrap();
        // Header then the end marker
        assert_eq!(compressed, vec![0b0001_1000]);
        assert!(decompress_bytes(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_short_final_symbol() {
        let compressed = compress_bytes(b"ABCDEFG", 3).unwrap();
        assert_eq!(
            compressed,
            vec![0x34, 0x14, 0x24, 0x31, 0x11, 0x15, 0x18, 0x23, 0xc0]
        );
        assert_eq!(decompress_bytes(&compressed).unwrap(), b"ABCDEFG");
    }

    #[test]
    fn test_marker_on_byte_boundary() {
        // The short final literal ends on a byte boundary, so the marker
        // and its padding read as a whole 0x80 byte
        let compressed = compress_bytes(b"CCCCCCC", 3).unwrap();
        assert_eq!(compressed, vec![0x34, 0x34, 0x34, 0x34, 0x43, 0x80]);
        assert_eq!(decompress_bytes(&compressed).unwrap(), b"CCCCCCC");
    }

    #[test]
    fn test_single_short_symbol() {
        let compressed = compress_bytes(b"A", 2).unwrap();
        assert_eq!(compressed, vec![0x24, 0x18]);
        assert_eq!(decompress_bytes(&compressed).unwrap(), b"A");
    }

    #[test]
    fn test_symbol_size_clamped() {
        assert_eq!(Compressor::new(0).unwrap().symbol_size(), 1);
        assert_eq!(compress_bytes(b"xy", 0).unwrap(), compress_bytes(b"xy", 1).unwrap());
    }

    #[test]
    fn test_symbol_size_too_large() {
        assert!(matches!(
            Compressor::new(16),
            Err(Error::Codec(CodecError::InvalidSymbolSize { size: 16 }))
        ));
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            decompress_bytes(&[]),
            Err(Error::Codec(CodecError::MissingHeader))
        ));
    }

    #[test]
    fn test_zero_symbol_size_header() {
        assert!(matches!(
            decompress_bytes(&[0x08]),
            Err(Error::Codec(CodecError::InvalidSymbolSize { size: 0 }))
        ));
    }

    #[test]
    fn test_truncated_stream() {
        let compressed = compress_bytes(b"abracadabra abracadabra", 1).unwrap();
        let cut = &compressed[..compressed.len() / 2];
        assert!(matches!(
            decompress_bytes(cut),
            Err(Error::Codec(CodecError::TruncatedStream { .. }))
        ));
    }

    #[test]
    fn test_metrics() {
        let data = b"abracadabra";
        let mut out = Vec::new();
        let metrics = Compressor::new(1).unwrap().compress(&data[..], &mut out).unwrap();

        assert_eq!(out, vec![0x16, 0x11, 0x88, 0x39, 0x08, 0xc6, 0x31, 0x90, 0x66, 0x20]);
        assert_eq!(metrics.input_bytes, 11);
        assert_eq!(metrics.output_bytes, out.len() as u64);
        assert_eq!(metrics.symbols, 11);
        assert_eq!(metrics.new_symbols, 5);
        assert_eq!(metrics.tree_nodes, 11);
        assert!(metrics.end_time.is_some());

        let mut back = Vec::new();
        let metrics = decompress(&out[..], &mut back).unwrap();
        assert_eq!(back, data);
        assert_eq!(metrics.output_bytes, 11);
        assert_eq!(metrics.input_bytes, out.len() as u64);
        assert_eq!(metrics.symbols, 11);
        assert_eq!(metrics.new_symbols, 5);
    }
}
