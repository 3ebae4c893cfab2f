//! `vhuff`: command-line front end for the adaptive Huffman codec.

mod config;
mod input_gen;
mod job;
mod verify;

use anyhow::{bail, Context};
use clap::Parser;
use config::{Cli, Config, InputSource, Task};
use job::Job;
use tracing::info;

fn init_tracing(verbose: bool) {
    // RUST_LOG wins; otherwise info, or debug with --verbose
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::from_cli(cli).context("invalid arguments")?;
    if config.print_config {
        config.print();
    }

    match &config.task {
        Task::Compress {
            input,
            output,
            symbol_size,
        } => run_job(
            &config,
            Job::Compress {
                input: input.clone(),
                output: output.clone(),
                symbol_size: *symbol_size,
            },
        ),
        Task::Decompress { input, output } => run_job(
            &config,
            Job::Decompress {
                input: input.clone(),
                output: output.clone(),
            },
        ),
        Task::RoundTrip {
            source,
            symbol_size,
        } => {
            let data = load(source)?;
            let result = verify::round_trip(&data, *symbol_size)?;
            if config.print_metrics {
                result.compress.print_summary();
                result.decompress.print_summary();
            }
            println!("{}", result.summary_line());
            if !result.passed() {
                bail!(
                    "round trip mismatch: {} bytes (crc {:08x}) in, {} bytes (crc {:08x}) out",
                    result.original_len,
                    result.original_crc,
                    result.decoded_len,
                    result.decoded_crc
                );
            }
            Ok(())
        }
        Task::SelfTest {
            source,
            max_symbol_size,
        } => {
            let data = load(source)?;
            info!(bytes = data.len(), max_symbol_size, "self-test started");

            let results = verify::sweep(&data, *max_symbol_size)?;
            for result in &results {
                println!("{}", result.summary_line());
            }

            let failed: Vec<usize> = results
                .iter()
                .filter(|r| !r.passed())
                .map(|r| r.symbol_size)
                .collect();
            if !failed.is_empty() {
                bail!("self-test failed for symbol sizes {:?}", failed);
            }
            println!("All {} symbol sizes passed", results.len());
            Ok(())
        }
    }
}

fn run_job(config: &Config, job: Job) -> anyhow::Result<()> {
    let handle = job::spawn(job)?;
    let metrics = handle.wait()?;
    if config.print_metrics {
        metrics.print_summary();
    }
    Ok(())
}

fn load(source: &InputSource) -> anyhow::Result<Vec<u8>> {
    match source {
        InputSource::File(path) => {
            std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))
        }
        InputSource::Generated { seed, size } => {
            info!(seed, size, "generating sample input");
            Ok(input_gen::generate_sample_data(*seed, *size))
        }
    }
}
