//! Bit-level I/O over byte streams.
//!
//! This module provides BitWriter and BitReader for the compressed stream.
//! Both operate in MSB-first (most significant bit first) order within each
//! byte.
//!
//! # Padding Rules
//! - BitWriter: pads the final incomplete byte with trailing zeros
//! - BitReader: cannot tell padding from data; the codec relies on its own
//!   end-of-stream marker, never on the source running dry
//!
//! # Exhaustion
//! Running out of input is not an error. Reads return
//! [`ReadOutcome::Exhausted`] and leave the reader untouched, so a caller
//! can try a byte read and fall back to a bit read afterwards.
//!
//! # Example
//! ```
//! use vhuff_core::bitio::{BitReader, BitWriter, ReadOutcome};
//!
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_byte(0xFF).unwrap();
//! let bytes = writer.finish().unwrap();
//! assert_eq!(bytes, vec![0b1011_1111, 0b1110_0000]);
//!
//! let mut reader = BitReader::new(&bytes[..]);
//! assert_eq!(reader.read_bit().unwrap(), ReadOutcome::Value(true));
//! assert_eq!(reader.read_bit().unwrap(), ReadOutcome::Value(false));
//! assert_eq!(reader.read_bit().unwrap(), ReadOutcome::Value(true));
//! assert_eq!(reader.read_byte().unwrap(), ReadOutcome::Value(0xFF));
//! ```

use crate::error::{BitIoError, Result};
use std::io::{ErrorKind, Read, Write};

/// Completed bytes are handed to the sink in batches of this size.
const WRITE_BATCH: usize = 8 * 1024;

/// Bytes pulled from the source per refill.
const READ_BATCH: usize = 8 * 1024;

/// Result of a read that may hit the end of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome<T> {
    /// The requested value
    Value(T),
    /// Not enough input left; nothing was consumed
    Exhausted,
}

/// Writes bits MSB-first into a byte sink.
///
/// # Invariants
/// - `bit_count` is always < 8
/// - `pending` never grows past `WRITE_BATCH` bytes
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    /// Destination for completed bytes
    inner: W,
    /// Completed bytes not yet handed to `inner`
    pending: Vec<u8>,
    /// Accumulator for the current partial byte (MSB-aligned)
    bit_buffer: u8,
    /// Number of bits in bit_buffer (0-7)
    bit_count: u8,
    /// Complete bytes produced so far
    bytes_out: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new BitWriter over `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            pending: Vec::with_capacity(WRITE_BATCH),
            bit_buffer: 0,
            bit_count: 0,
            bytes_out: 0,
        }
    }

    /// Write up to 64 bits to the output.
    ///
    /// Bits are written MSB-first. For example, writing value=0b101 with count=3
    /// writes bits 1, 0, 1 in that order.
    ///
    /// # Errors
    /// Returns `BitIoError::InvalidBitCount` if count > 64, or an I/O error
    /// if the sink rejects a batch.
    pub fn write_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        let mut remaining = count;
        let mut val = value;

        while remaining > 0 {
            let bits_to_write = remaining.min(8 - self.bit_count as usize);

            // Extract the top bits_to_write bits from val
            let shift = remaining - bits_to_write;
            let bits = ((val >> shift) & ((1u64 << bits_to_write) - 1)) as u8;

            self.bit_buffer |= bits << (8 - self.bit_count as usize - bits_to_write);
            self.bit_count += bits_to_write as u8;

            if self.bit_count == 8 {
                self.push_byte(self.bit_buffer)?;
                self.bit_buffer = 0;
                self.bit_count = 0;
            }

            // Clear the bits we just wrote from val
            val &= (1u64 << shift) - 1;
            remaining -= bits_to_write;
        }

        Ok(())
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(bit as u64, 1)
    }

    /// Write a full byte, MSB first.
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.write_bits(byte as u64, 8)
    }

    /// Return the total number of bits written (including partial byte).
    pub fn bit_len(&self) -> u64 {
        self.bytes_out * 8 + self.bit_count as u64
    }

    /// Pad the final byte with zeros, flush everything, and return the sink.
    pub fn finish(mut self) -> Result<W> {
        if self.bit_count > 0 {
            let last = self.bit_buffer;
            self.push_byte(last)?;
            self.bit_buffer = 0;
            self.bit_count = 0;
        }
        self.inner.write_all(&self.pending)?;
        self.pending.clear();
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn push_byte(&mut self, byte: u8) -> Result<()> {
        self.pending.push(byte);
        self.bytes_out += 1;
        if self.pending.len() >= WRITE_BATCH {
            self.inner.write_all(&self.pending)?;
            self.pending.clear();
        }
        Ok(())
    }
}

/// Reads bits MSB-first from a byte source.
///
/// Bytes are pulled from the source lazily, so a reader can sit on top of a
/// file without loading it. A read that cannot be fully satisfied returns
/// [`ReadOutcome::Exhausted`] and consumes nothing.
///
/// # Invariants
/// - `acc_bits` never exceeds 15 (at most one partial byte plus one fresh byte)
/// - only the low `acc_bits` bits of `acc` are meaningful
#[derive(Debug)]
pub struct BitReader<R: Read> {
    /// Byte source
    inner: R,
    /// Raw bytes fetched from the source but not yet moved into `acc`
    buf: Box<[u8]>,
    buf_pos: usize,
    buf_len: usize,
    /// Source has reported end of input
    eof: bool,
    /// Bit accumulator, oldest bit highest
    acc: u32,
    acc_bits: u32,
    /// Bits handed out so far
    bits_read: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a new BitReader for the given source.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: vec![0u8; READ_BATCH].into_boxed_slice(),
            buf_pos: 0,
            buf_len: 0,
            eof: false,
            acc: 0,
            acc_bits: 0,
            bits_read: 0,
        }
    }

    /// Read a single bit (true = 1).
    pub fn read_bit(&mut self) -> Result<ReadOutcome<bool>> {
        if !self.fill(1)? {
            return Ok(ReadOutcome::Exhausted);
        }
        Ok(ReadOutcome::Value(self.take(1) == 1))
    }

    /// Read 8 bits as a byte.
    ///
    /// If fewer than 8 bits remain, returns `Exhausted` and the remaining
    /// bits are still available to `read_bit`.
    pub fn read_byte(&mut self) -> Result<ReadOutcome<u8>> {
        if !self.fill(8)? {
            return Ok(ReadOutcome::Exhausted);
        }
        Ok(ReadOutcome::Value(self.take(8) as u8))
    }

    /// Return the number of bits consumed so far.
    pub fn bits_read(&self) -> u64 {
        self.bits_read
    }

    /// Try to hold at least `need` bits in the accumulator.
    fn fill(&mut self, need: u32) -> Result<bool> {
        while self.acc_bits < need {
            match self.next_byte()? {
                Some(byte) => {
                    self.acc = (self.acc << 8) | byte as u32;
                    self.acc_bits += 8;
                }
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    fn take(&mut self, count: u32) -> u32 {
        let shift = self.acc_bits - count;
        let value = (self.acc >> shift) & ((1u32 << count) - 1);
        self.acc_bits = shift;
        self.acc &= (1u32 << shift) - 1;
        self.bits_read += count as u64;
        value
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        if self.buf_pos == self.buf_len {
            if self.eof {
                return Ok(None);
            }
            loop {
                match self.inner.read(&mut self.buf) {
                    Ok(0) => {
                        self.eof = true;
                        return Ok(None);
                    }
                    Ok(n) => {
                        self.buf_pos = 0;
                        self.buf_len = n;
                        break;
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            }
        }
        let byte = self.buf[self.buf_pos];
        self.buf_pos += 1;
        Ok(Some(byte))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(f: impl FnOnce(&mut BitWriter<Vec<u8>>)) -> Vec<u8> {
        let mut writer = BitWriter::new(Vec::new());
        f(&mut writer);
        writer.finish().unwrap()
    }

    #[test]
    fn test_write_read_single_byte() {
        let bytes = written(|w| w.write_bits(0b10110011, 8).unwrap());
        assert_eq!(bytes, vec![0b10110011]);

        let mut reader = BitReader::new(&bytes[..]);
        assert_eq!(reader.read_byte().unwrap(), ReadOutcome::Value(0b10110011));
        assert_eq!(reader.read_bit().unwrap(), ReadOutcome::Exhausted);
    }

    #[test]
    fn test_write_partial_bits() {
        let bytes = written(|w| {
            w.write_bits(0b101, 3).unwrap();
            w.write_bits(0b11, 2).unwrap();
            w.write_bits(0b000, 3).unwrap();
        });
        assert_eq!(bytes, vec![0b10111000]);
    }

    #[test]
    fn test_padding() {
        let bytes = written(|w| w.write_bit(true).unwrap());
        assert_eq!(bytes, vec![0b10000000]);
    }

    #[test]
    fn test_multi_byte() {
        let bytes = written(|w| w.write_bits(0b1010101111110000, 16).unwrap());
        assert_eq!(bytes, vec![0b10101011, 0b11110000]);
    }

    #[test]
    fn test_zero_bits() {
        let bytes = written(|w| w.write_bits(0xFF, 0).unwrap());
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_invalid_bit_count() {
        let mut writer = BitWriter::new(Vec::new());
        assert!(matches!(
            writer.write_bits(0, 65),
            Err(crate::error::Error::BitIo(BitIoError::InvalidBitCount(65)))
        ));
    }

    #[test]
    fn test_64_bit_values() {
        let val = 0x123456789ABCDEF0u64;
        let bytes = written(|w| w.write_bits(val, 64).unwrap());
        assert_eq!(bytes, val.to_be_bytes().to_vec());
    }

    #[test]
    fn test_unaligned_byte() {
        let bytes = written(|w| {
            w.write_bits(0b0001, 4).unwrap();
            w.write_byte(0x41).unwrap();
        });
        assert_eq!(bytes, vec![0x14, 0x10]);

        let mut reader = BitReader::new(&bytes[..]);
        for expected in [false, false, false, true] {
            assert_eq!(reader.read_bit().unwrap(), ReadOutcome::Value(expected));
        }
        assert_eq!(reader.read_byte().unwrap(), ReadOutcome::Value(0x41));
        assert_eq!(reader.bits_read(), 12);
    }

    #[test]
    fn test_bit_by_bit() {
        let pattern = [true, false, true, true, false, false, true, false];
        let bytes = written(|w| {
            for &bit in &pattern {
                w.write_bit(bit).unwrap();
            }
        });
        assert_eq!(bytes, vec![0b10110010]);

        let mut reader = BitReader::new(&bytes[..]);
        for &exp in &pattern {
            assert_eq!(reader.read_bit().unwrap(), ReadOutcome::Value(exp));
        }
        assert_eq!(reader.read_bit().unwrap(), ReadOutcome::Exhausted);
    }

    #[test]
    fn test_short_byte_read_consumes_nothing() {
        let data = [0b1010_1010u8];
        let mut reader = BitReader::new(&data[..]);

        assert_eq!(reader.read_bit().unwrap(), ReadOutcome::Value(true));
        assert_eq!(reader.read_byte().unwrap(), ReadOutcome::Exhausted);
        assert_eq!(reader.bits_read(), 1);

        // The seven remaining bits are still there
        let mut rest = Vec::new();
        while let ReadOutcome::Value(bit) = reader.read_bit().unwrap() {
            rest.push(bit);
        }
        assert_eq!(rest, vec![false, true, false, true, false, true, false]);
    }

    #[test]
    fn test_empty_source() {
        let mut reader = BitReader::new(std::io::empty());
        assert_eq!(reader.read_bit().unwrap(), ReadOutcome::Exhausted);
        assert_eq!(reader.read_byte().unwrap(), ReadOutcome::Exhausted);
        assert_eq!(reader.bits_read(), 0);
    }

    #[test]
    fn test_large_stream_crosses_batches() {
        let data: Vec<u8> = (0..3 * READ_BATCH).map(|i| (i % 251) as u8).collect();

        let mut writer = BitWriter::new(Vec::new());
        for &b in &data {
            writer.write_byte(b).unwrap();
        }
        assert_eq!(writer.bit_len(), data.len() as u64 * 8);
        let bytes = writer.finish().unwrap();
        assert_eq!(bytes, data);

        let mut reader = BitReader::new(&bytes[..]);
        let mut back = Vec::new();
        while let ReadOutcome::Value(b) = reader.read_byte().unwrap() {
            back.push(b);
        }
        assert_eq!(back, data);
    }

    #[test]
    fn test_bit_len() {
        let mut writer = BitWriter::new(Vec::new());
        assert_eq!(writer.bit_len(), 0);
        writer.write_bits(0b11111, 5).unwrap();
        assert_eq!(writer.bit_len(), 5);
        writer.write_byte(0).unwrap();
        assert_eq!(writer.bit_len(), 13);
    }
}
