//! Per-job counters for one compression or decompression pass.
//!
//! The driver fills these in as it goes and returns them when the job
//! finishes, so callers can report ratios and throughput without reading
//! the output back.

use std::time::{Duration, Instant};

/// Which way a job ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Compress,
    Decompress,
}

/// Counters collected while running the codec.
#[derive(Debug, Clone)]
pub struct CodecMetrics {
    pub direction: Direction,

    /// When the job started
    pub start_time: Instant,

    /// When the job ended (set on completion)
    pub end_time: Option<Instant>,

    /// Symbol width in bytes
    pub symbol_size: usize,

    /// Bytes consumed from the source
    pub input_bytes: u64,

    /// Bytes produced into the sink
    pub output_bytes: u64,

    /// Symbols coded, including the final short one
    pub symbols: u64,

    /// Symbols sent as NYT escapes with a literal
    pub new_symbols: u64,

    /// Path bits spent on previously seen symbols
    pub code_bits: u64,

    /// Tree size at the end of the job
    pub tree_nodes: usize,
}

impl CodecMetrics {
    pub fn new(direction: Direction, symbol_size: usize) -> Self {
        Self {
            direction,
            start_time: Instant::now(),
            end_time: None,
            symbol_size,
            input_bytes: 0,
            output_bytes: 0,
            symbols: 0,
            new_symbols: 0,
            code_bits: 0,
            tree_nodes: 0,
        }
    }

    /// Mark the job as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Size of the raw side of the job.
    pub fn raw_bytes(&self) -> u64 {
        match self.direction {
            Direction::Compress => self.input_bytes,
            Direction::Decompress => self.output_bytes,
        }
    }

    /// Size of the compressed side of the job.
    pub fn compressed_bytes(&self) -> u64 {
        match self.direction {
            Direction::Compress => self.output_bytes,
            Direction::Decompress => self.input_bytes,
        }
    }

    /// Compute compression ratio (compressed / raw).
    ///
    /// Returns 0.0 if there was no raw data.
    pub fn compression_ratio(&self) -> f64 {
        if self.raw_bytes() == 0 {
            0.0
        } else {
            self.compressed_bytes() as f64 / self.raw_bytes() as f64
        }
    }

    /// Average path length per previously seen symbol, in bits.
    pub fn mean_code_bits(&self) -> f64 {
        let repeats = self.symbols - self.new_symbols;
        if repeats == 0 {
            0.0
        } else {
            self.code_bits as f64 / repeats as f64
        }
    }

    /// Raw bytes processed per second.
    pub fn throughput_bps(&self) -> f64 {
        let duration_secs = self.duration().as_secs_f64();
        if duration_secs == 0.0 {
            0.0
        } else {
            self.raw_bytes() as f64 / duration_secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        let label = match self.direction {
            Direction::Compress => "Compression",
            Direction::Decompress => "Decompression",
        };

        println!("\n=== {} Summary ===", label);
        println!("Duration: {} ms", self.duration().as_millis());
        println!("Symbol size: {} byte(s)", self.symbol_size);
        println!();
        println!("Input:  {} bytes", self.input_bytes);
        println!("Output: {} bytes", self.output_bytes);
        println!("Ratio: {:.1}%", self.compression_ratio() * 100.0);
        println!();
        println!("Symbols: {} ({} distinct)", self.symbols, self.new_symbols);
        println!("Mean code length: {:.2} bits", self.mean_code_bits());
        println!("Tree nodes: {}", self.tree_nodes);
        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
        println!();
    }

    /// Export metrics as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             symbol_size={}\n\
             input_bytes={}\n\
             output_bytes={}\n\
             symbols={}\n\
             new_symbols={}\n\
             code_bits={}\n\
             tree_nodes={}\n\
             compression_ratio={:.4}\n",
            self.duration().as_millis(),
            self.symbol_size,
            self.input_bytes,
            self.output_bytes,
            self.symbols,
            self.new_symbols,
            self.code_bits,
            self.tree_nodes,
            self.compression_ratio(),
        )
    }
}
