//! vhuff-core: single-pass adaptive Huffman compression
//!
//! No code table is built ahead of time or transmitted. Encoder and decoder
//! each grow an identical prefix-code tree symbol by symbol, rebalancing it
//! after every observation so that frequent symbols drift toward the root.
//!
//! # Architecture
//!
//! - `bitio`: MSB-first bit reader/writer over `std::io` streams
//! - `bits`: bit/integer/string conversions shared by the codec and tests
//! - `symbol`: the fixed-width (or shorter, at the end) coding unit
//! - `node`: tree vertices and the arena that owns them
//! - `tree`: the adaptive tree and its sibling-property update
//! - `codec`: the stream format and compress/decompress drivers
//! - `metrics`: per-job counters
//!
//! # Example
//! ```
//! use vhuff_core::codec::{compress_bytes, decompress_bytes};
//!
//! let packed = compress_bytes(b"mississippi", 1).unwrap();
//! assert_eq!(decompress_bytes(&packed).unwrap(), b"mississippi");
//! ```

pub mod bitio;
pub mod bits;
pub mod codec;
pub mod error;
pub mod metrics;
pub mod node;
pub mod symbol;
pub mod tree;

// Re-export commonly used types
pub use codec::{compress_bytes, decompress, decompress_bytes, Compressor};
pub use error::{Error, Result};
pub use metrics::CodecMetrics;
pub use symbol::Symbol;
pub use tree::AdaptiveTree;
