//! In-memory round trips with checksum verification.

use tracing::{debug, warn};
use vhuff_core::{decompress, CodecMetrics, Compressor, Result};

/// Outcome of compressing and decompressing one buffer.
#[derive(Debug, Clone)]
pub struct RoundTrip {
    pub symbol_size: usize,
    pub original_len: usize,
    pub original_crc: u32,
    pub decoded_len: usize,
    pub decoded_crc: u32,
    pub compress: CodecMetrics,
    pub decompress: CodecMetrics,
}

impl RoundTrip {
    pub fn passed(&self) -> bool {
        self.original_len == self.decoded_len && self.original_crc == self.decoded_crc
    }

    /// One-line result, as printed by the self-test sweep.
    pub fn summary_line(&self) -> String {
        format!(
            "size {:>2}: {} {} -> {} bytes ({:.1}%), crc {:08x}",
            self.symbol_size,
            if self.passed() { "PASS" } else { "FAIL" },
            self.original_len,
            self.compress.output_bytes,
            self.compress.compression_ratio() * 100.0,
            self.decoded_crc,
        )
    }
}

/// Compress `data` at `symbol_size`, decode it back, and compare.
///
/// Codec errors are returned as errors; a decoded buffer that differs from
/// the input is a successful run whose [`RoundTrip::passed`] is false.
pub fn round_trip(data: &[u8], symbol_size: usize) -> Result<RoundTrip> {
    let compressor = Compressor::new(symbol_size)?;

    let mut packed = Vec::new();
    let packed_metrics = compressor.compress(data, &mut packed)?;

    let mut decoded = Vec::with_capacity(data.len());
    let unpacked_metrics = decompress(&packed[..], &mut decoded)?;

    let result = RoundTrip {
        symbol_size: compressor.symbol_size(),
        original_len: data.len(),
        original_crc: crc32fast::hash(data),
        decoded_len: decoded.len(),
        decoded_crc: crc32fast::hash(&decoded),
        compress: packed_metrics,
        decompress: unpacked_metrics,
    };

    if result.passed() {
        debug!(
            symbol_size = result.symbol_size,
            bytes = result.original_len,
            packed = packed.len(),
            "round trip verified"
        );
    } else {
        warn!(
            symbol_size = result.symbol_size,
            expected_len = result.original_len,
            decoded_len = result.decoded_len,
            expected_crc = result.original_crc,
            decoded_crc = result.decoded_crc,
            "round trip mismatch"
        );
    }

    Ok(result)
}

/// Round-trip `data` at every symbol size in `1..=max_symbol_size`.
pub fn sweep(data: &[u8], max_symbol_size: usize) -> Result<Vec<RoundTrip>> {
    (1..=max_symbol_size)
        .map(|size| round_trip(data, size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_gen::generate_sample_data;

    #[test]
    fn test_round_trip_passes() {
        let data = generate_sample_data(3, 10_000);
        let result = round_trip(&data, 2).unwrap();
        assert!(result.passed());
        assert_eq!(result.original_len, 10_000);
        assert_eq!(result.compress.input_bytes, 10_000);
        assert_eq!(result.decompress.output_bytes, 10_000);
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let result = round_trip(b"hello", 0).unwrap();
        assert_eq!(result.symbol_size, 1);
        assert!(result.passed());
    }

    #[test]
    fn test_sweep_covers_every_size() {
        let data = generate_sample_data(11, 3001);
        let results = sweep(&data, 15).unwrap();
        assert_eq!(results.len(), 15);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.symbol_size, i + 1);
            assert!(result.passed(), "{}", result.summary_line());
        }
    }

    #[test]
    fn test_summary_line() {
        let result = round_trip(b"", 1).unwrap();
        let line = result.summary_line();
        assert!(line.starts_with("size  1: PASS 0 -> 1 bytes"));
    }

    #[test]
    fn test_oversized_symbol_rejected() {
        assert!(round_trip(b"abc", 16).is_err());
    }
}
