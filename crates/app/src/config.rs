//! Command-line parsing and resolved configuration.
//!
//! `Cli` is the raw clap surface; `Config` is what the rest of the binary
//! works with, after defaults are filled in and values are validated.
//! Runs that generate their own input print the seed so they can be
//! reproduced.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use vhuff_core::codec::{DEFAULT_SYMBOL_SIZE, MAX_SYMBOL_SIZE};
use vhuff_core::Error;

/// Default size of generated sample input
const DEFAULT_SAMPLE_BYTES: usize = 64 * 1024;

/// Default upper bound for the self-test sweep
const DEFAULT_SWEEP_MAX: usize = 8;

/// Adaptive Huffman compressor
#[derive(Parser, Debug)]
#[command(name = "vhuff", version)]
#[command(about = "Single-pass adaptive Huffman compression")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Print resolved configuration
    #[arg(long, global = true)]
    pub print_config: bool,

    /// Don't print metrics summary
    #[arg(long, global = true)]
    pub no_metrics: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compress a file
    Compress {
        #[arg(long = "in")]
        input: PathBuf,
        #[arg(long = "out")]
        output: PathBuf,
        /// Symbol size in bytes (1-15; 0 is treated as 1)
        #[arg(long, default_value_t = DEFAULT_SYMBOL_SIZE)]
        symbol_size: usize,
    },
    /// Decompress a file; the symbol size comes from the stream header
    Decompress {
        #[arg(long = "in")]
        input: PathBuf,
        #[arg(long = "out")]
        output: PathBuf,
    },
    /// Compress and decompress in memory and verify the result
    Roundtrip {
        #[command(flatten)]
        sample: SampleArgs,
        #[arg(long, default_value_t = DEFAULT_SYMBOL_SIZE)]
        symbol_size: usize,
    },
    /// Round-trip one input at every symbol size from 1 up to a maximum
    Selftest {
        #[command(flatten)]
        sample: SampleArgs,
        #[arg(long, default_value_t = DEFAULT_SWEEP_MAX)]
        max_symbol_size: usize,
    },
}

/// Where in-memory runs get their data.
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Input file (default: generate sample)
    #[arg(long = "in")]
    pub input: Option<PathBuf>,
    /// Random seed for generated input
    #[arg(long)]
    pub seed: Option<u64>,
    /// Size of generated input in bytes
    #[arg(long, default_value_t = DEFAULT_SAMPLE_BYTES)]
    pub size: usize,
}

/// Data source for round-trip runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Generated { seed: u64, size: usize },
}

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Compress {
        input: PathBuf,
        output: PathBuf,
        symbol_size: usize,
    },
    Decompress {
        input: PathBuf,
        output: PathBuf,
    },
    RoundTrip {
        source: InputSource,
        symbol_size: usize,
    },
    SelfTest {
        source: InputSource,
        max_symbol_size: usize,
    },
}

/// Complete configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub task: Task,

    /// Whether to print detailed config
    pub print_config: bool,

    /// Whether to print detailed metrics summary
    pub print_metrics: bool,
}

impl Config {
    /// Resolve and validate parsed arguments.
    ///
    /// Symbol sizes above 15 cannot be written in the stream header and are
    /// rejected here; a size of 0 passes through and is clamped by the codec.
    pub fn from_cli(cli: Cli) -> Result<Self, Error> {
        let task = match cli.command {
            Command::Compress {
                input,
                output,
                symbol_size,
            } => Task::Compress {
                input,
                output,
                symbol_size: check_symbol_size(symbol_size)?,
            },
            Command::Decompress { input, output } => Task::Decompress { input, output },
            Command::Roundtrip {
                sample,
                symbol_size,
            } => Task::RoundTrip {
                source: resolve_source(sample),
                symbol_size: check_symbol_size(symbol_size)?,
            },
            Command::Selftest {
                sample,
                max_symbol_size,
            } => {
                if max_symbol_size == 0 {
                    return Err(Error::Config("--max-symbol-size must be at least 1".to_string()));
                }
                Task::SelfTest {
                    source: resolve_source(sample),
                    max_symbol_size: check_symbol_size(max_symbol_size)?,
                }
            }
        };

        Ok(Config {
            task,
            print_config: cli.print_config,
            print_metrics: !cli.no_metrics,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        match &self.task {
            Task::Compress {
                input,
                output,
                symbol_size,
            } => {
                println!("Task: compress");
                println!("Input file:  {}", input.display());
                println!("Output file: {}", output.display());
                println!("Symbol size: {} byte(s)", (*symbol_size).max(1));
            }
            Task::Decompress { input, output } => {
                println!("Task: decompress");
                println!("Input file:  {}", input.display());
                println!("Output file: {}", output.display());
            }
            Task::RoundTrip {
                source,
                symbol_size,
            } => {
                println!("Task: roundtrip");
                print_source(source);
                println!("Symbol size: {} byte(s)", (*symbol_size).max(1));
            }
            Task::SelfTest {
                source,
                max_symbol_size,
            } => {
                println!("Task: selftest");
                print_source(source);
                println!("Symbol sizes: 1..={}", max_symbol_size);
            }
        }
        println!();
    }
}

fn check_symbol_size(size: usize) -> Result<usize, Error> {
    if size > MAX_SYMBOL_SIZE {
        return Err(Error::Config(format!(
            "symbol size {} exceeds maximum {}",
            size, MAX_SYMBOL_SIZE
        )));
    }
    Ok(size)
}

fn resolve_source(sample: SampleArgs) -> InputSource {
    match sample.input {
        Some(path) => InputSource::File(path),
        None => InputSource::Generated {
            seed: sample.seed.unwrap_or_else(time_seed),
            size: sample.size,
        },
    }
}

fn time_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn print_source(source: &InputSource) {
    match source {
        InputSource::File(path) => println!("Input file:  {}", path.display()),
        InputSource::Generated { seed, size } => {
            println!("Input: generated sample ({} bytes, seed {})", size, seed)
        }
    }
}
