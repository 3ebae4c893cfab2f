//! File compression and decompression jobs.
//!
//! A job runs on its own thread so the caller stays free while large files
//! are coded. The caller gets a [`JobHandle`] back and collects the metrics
//! (or the error) with [`JobHandle::wait`]. A job that fails removes its
//! partial output file.

use anyhow::{anyhow, Context};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use tracing::{info, warn};
use vhuff_core::{decompress, CodecMetrics, Compressor};

/// One file-to-file codec run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Compress {
        input: PathBuf,
        output: PathBuf,
        symbol_size: usize,
    },
    Decompress {
        input: PathBuf,
        output: PathBuf,
    },
}

impl Job {
    pub fn input(&self) -> &Path {
        match self {
            Job::Compress { input, .. } | Job::Decompress { input, .. } => input,
        }
    }

    pub fn output(&self) -> &Path {
        match self {
            Job::Compress { output, .. } | Job::Decompress { output, .. } => output,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Job::Compress { .. } => "compress",
            Job::Decompress { .. } => "decompress",
        }
    }
}

/// Handle to a job running in the background.
pub struct JobHandle {
    job: Job,
    handle: JoinHandle<anyhow::Result<CodecMetrics>>,
}

impl JobHandle {
    /// Block until the job ends and return its metrics.
    pub fn wait(self) -> anyhow::Result<CodecMetrics> {
        self.handle
            .join()
            .map_err(|_| anyhow!("{} job panicked", self.job.name()))?
    }
}

/// Start `job` on a new thread.
pub fn spawn(job: Job) -> anyhow::Result<JobHandle> {
    let worker_job = job.clone();
    let handle = thread::Builder::new()
        .name(format!("vhuff-{}", job.name()))
        .spawn(move || run(&worker_job))
        .context("failed to start job thread")?;
    Ok(JobHandle { job, handle })
}

/// Run `job` on the calling thread.
pub fn run(job: &Job) -> anyhow::Result<CodecMetrics> {
    info!(
        job = job.name(),
        input = %job.input().display(),
        output = %job.output().display(),
        "job started"
    );

    let mut created_output = false;
    let result = execute(job, &mut created_output);
    match &result {
        Ok(metrics) => info!(
            job = job.name(),
            input_bytes = metrics.input_bytes,
            output_bytes = metrics.output_bytes,
            duration_ms = metrics.duration().as_millis() as u64,
            "job finished"
        ),
        Err(e) => {
            warn!(job = job.name(), error = %e, "job failed");
            // Only a file this job created counts as partial output
            if created_output {
                if let Err(remove_err) = fs::remove_file(job.output()) {
                    warn!(
                        output = %job.output().display(),
                        error = %remove_err,
                        "could not remove partial output"
                    );
                }
            }
        }
    }
    result
}

/// Code one file into another. `created_output` is set once the output file
/// exists because of this call.
fn execute(job: &Job, created_output: &mut bool) -> anyhow::Result<CodecMetrics> {
    let input = File::open(job.input())
        .with_context(|| format!("cannot open {}", job.input().display()))?;
    let compressor = match job {
        Job::Compress { symbol_size, .. } => Some(Compressor::new(*symbol_size)?),
        Job::Decompress { .. } => None,
    };

    let output = File::create(job.output())
        .with_context(|| format!("cannot create {}", job.output().display()))?;
    *created_output = true;

    let reader = BufReader::new(input);
    let writer = BufWriter::new(output);

    let metrics = match compressor {
        Some(compressor) => compressor
            .compress(reader, writer)
            .with_context(|| format!("compressing {}", job.input().display()))?,
        None => decompress(reader, writer)
            .with_context(|| format!("decompressing {}", job.input().display()))?,
    };
    Ok(metrics)
}
