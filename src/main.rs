//! Command-line interface for sizefs
//!
//! # Usage Examples
//!
//! ## Reading
//! ```bash
//! # Bytes 1000..1100 of a 4M file filled with random digits
//! sizefs read 4M --filler '[0-9]' --offset 1000 --length 100
//!
//! # Whole file into out.bin, contents from a YAML config
//! sizefs read 4M-1B --config contents.yaml --output out.bin
//! ```
//!
//! ## Writing
//! ```bash
//! # Stream a 2G file to disk in 1M chunks, reproducibly
//! SIZEFS_SEED=42 sizefs write 2G big.bin --filler 'a(bcd)*e{4}' --chunk-size 1048576
//! ```
//!
//! ## Checking Patterns
//! ```bash
//! sizefs check '[a-z]{3}(xy)+' --max-random 4 --samples 5
//! ```
//!
//! ## Config Format
//! ```yaml
//! filler: "a(bc)*d"
//! prefix: "HEADER"
//! suffix: "[A-Z]{8}"
//! padder: "-"
//! max_random: 10
//! seed: 42
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use sizefs::{parse_size_spec, ContentOpts};
use sizefs_contents::{WindowedReader, DEFAULT_MAX_RANDOM};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use xeger::Expand;

const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Parser)]
#[command(name = "sizefs")]
#[command(about = "Generate synthetic files of any size from regex-like patterns")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a byte range of a synthetic file
    Read {
        /// File size, e.g. 4M, 128K or 4M-1B
        size: String,

        /// First byte to read
        #[arg(long, default_value = "0")]
        offset: u64,

        /// Number of bytes to read (default: up to the end of the file)
        #[arg(long)]
        length: Option<u64>,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        content: ContentOpts,
    },

    /// Stream a whole synthetic file to disk
    Write {
        /// File size, e.g. 4M, 128K or 4M-1B
        size: String,

        /// Destination file
        output: PathBuf,

        /// Bytes generated per read
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        #[command(flatten)]
        content: ContentOpts,
    },

    /// Compile a pattern and show sample expansions
    Check {
        /// Pattern to compile
        pattern: String,

        /// Upper bound for `*` and `+` repetitions
        #[arg(long, default_value_t = DEFAULT_MAX_RANDOM)]
        max_random: u32,

        /// Seed for reproducible samples
        #[arg(long, env = "SIZEFS_SEED")]
        seed: Option<u64>,

        /// Number of expansions to print
        #[arg(long, default_value = "3")]
        samples: usize,
    },
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Read {
            size,
            offset,
            length,
            output,
            content,
        } => run_read(&size, offset, length, output.as_deref(), &content),
        Commands::Write {
            size,
            output,
            chunk_size,
            content,
        } => run_write(&size, &output, chunk_size, &content),
        Commands::Check {
            pattern,
            max_random,
            seed,
            samples,
        } => run_check(&pattern, max_random, seed, samples),
    }
}

fn build_reader(size: &str, content: &ContentOpts) -> anyhow::Result<WindowedReader> {
    let total_size = parse_size_spec(size)?;
    let config = content.to_content_config()?;
    debug!("Content configuration: {config:?}");
    WindowedReader::new(total_size, &config)
        .with_context(|| format!("Failed to build contents for a {size} file"))
}

fn open_output(output: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn run_read(
    size: &str,
    offset: u64,
    length: Option<u64>,
    output: Option<&Path>,
    content: &ContentOpts,
) -> anyhow::Result<()> {
    let mut reader = build_reader(size, content)?;
    let total_size = reader.total_size();
    let end = match length {
        Some(length) => offset.saturating_add(length).min(total_size),
        None => total_size,
    };

    let mut out = open_output(output)?;
    let mut position = offset.min(end);
    while position < end {
        let window_end = position.saturating_add(DEFAULT_CHUNK_SIZE as u64).min(end);
        let chunk = reader.read(position, window_end);
        out.write_all(&chunk).context("Failed to write output")?;
        position = window_end;
    }
    out.flush().context("Failed to flush output")?;

    info!(
        "Read {} bytes at offset {offset} of a {size} file",
        end.saturating_sub(offset)
    );
    Ok(())
}

fn run_write(
    size: &str,
    output: &Path,
    chunk_size: usize,
    content: &ContentOpts,
) -> anyhow::Result<()> {
    if chunk_size == 0 {
        anyhow::bail!("--chunk-size must be greater than zero");
    }

    let mut reader = build_reader(size, content)?;
    let total_size = reader.total_size();
    let mut out = open_output(Some(output))?;

    info!(
        "Writing {total_size} bytes to {} in {chunk_size}-byte chunks",
        output.display()
    );

    let mut written = 0u64;
    for chunk in reader.chunks(chunk_size) {
        out.write_all(&chunk)
            .with_context(|| format!("Failed to write to {}", output.display()))?;
        written += chunk.len() as u64;
    }
    out.flush()
        .with_context(|| format!("Failed to flush {}", output.display()))?;

    info!("Wrote {written} bytes to {}", output.display());
    Ok(())
}

fn run_check(
    pattern: &str,
    max_random: u32,
    seed: Option<u64>,
    samples: usize,
) -> anyhow::Result<()> {
    let mut compiled = match seed {
        Some(seed) => xeger::compile_seeded(pattern, max_random, seed),
        None => xeger::compile(pattern, max_random),
    }
    .with_context(|| format!("Invalid pattern {pattern:?}"))?;

    let mut out = io::stdout().lock();
    writeln!(out, "pattern: {compiled}")?;
    writeln!(out, "max length: {}", compiled.max_len())?;
    for index in 0..samples {
        let sample = compiled.expand();
        writeln!(out, "sample {index}: {}", String::from_utf8_lossy(&sample))?;
    }
    Ok(())
}
