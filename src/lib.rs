//! SizeFS Library
//!
//! A synthetic filesystem whose files have no stored contents: a file's size
//! comes from its name (`4M`, `128K`, `4M-1B`) and its bytes are generated
//! on demand from regex-like patterns configured on its folder.
//!
//! # Crates
//!
//! - `xeger` - compiles patterns such as `a(bcd)*e{4}` into content generators
//! - `sizefs_contents` - serves exact byte ranges of a synthetic file
//!
//! # CLI Usage
//!
//! ```bash
//! # Print the first kilobyte of a 4M file filled with "ab"
//! sizefs read 4M --filler ab --length 1024
//!
//! # Write a framed 1G file to disk
//! sizefs write 1G out.bin --prefix HEADER --suffix '[A-Z]{8}' --padder '-'
//!
//! # See what a pattern expands to
//! sizefs check 'a(bcd)*e{4}' --samples 3
//! ```

use anyhow::Context;
use clap::Parser;
use sizefs_contents::{ContentConfig, PatternRole};
use std::path::PathBuf;

pub mod config;
pub mod fs;

pub use config::{parse_size_spec, SizeSpecError};
pub use fs::{EntryAttributes, EntryKind, FsError, FsStats, SizeFs};

/// Content options shared by the commands that generate files.
#[derive(Parser, Clone, Debug, Default)]
pub struct ContentOpts {
    /// YAML file with filler, prefix, suffix, padder, max_random and seed
    #[arg(long, env = "SIZEFS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pattern repeated to fill the body of the file
    #[arg(long)]
    pub filler: Option<String>,

    /// Pattern placed once at the start of the file
    #[arg(long)]
    pub prefix: Option<String>,

    /// Pattern placed once at the end of the file
    #[arg(long)]
    pub suffix: Option<String>,

    /// Pattern used to close the gap before the suffix
    #[arg(long)]
    pub padder: Option<String>,

    /// Upper bound for `*` and `+` repetitions
    #[arg(long)]
    pub max_random: Option<u32>,

    /// Seed for reproducible contents
    #[arg(long, env = "SIZEFS_SEED")]
    pub seed: Option<u64>,
}

impl ContentOpts {
    /// Build the content configuration: the config file first, then the
    /// command line values on top of it.
    pub fn to_content_config(&self) -> anyhow::Result<ContentConfig> {
        let mut config = match &self.config {
            Some(path) => ContentConfig::from_file(path)
                .with_context(|| format!("Failed to load content config {}", path.display()))?,
            None => ContentConfig::default(),
        };

        for role in PatternRole::ALL {
            if let Some(pattern) = self.pattern(role) {
                config.set(role, Some(pattern.to_string()));
            }
        }
        if let Some(max_random) = self.max_random {
            config.max_random = max_random;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        Ok(config)
    }

    fn pattern(&self, role: PatternRole) -> Option<&str> {
        match role {
            PatternRole::Prefix => self.prefix.as_deref(),
            PatternRole::Filler => self.filler.as_deref(),
            PatternRole::Padder => self.padder.as_deref(),
            PatternRole::Suffix => self.suffix.as_deref(),
        }
    }
}
