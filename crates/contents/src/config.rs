//! Content configuration: which patterns make up a synthetic file.
//!
//! A configuration can be built in code or loaded from YAML:
//!
//! ```yaml
//! filler: "a(bc)*d"
//! prefix: "HEADER"
//! suffix: "TRAILER"
//! padder: "0"
//! max_random: 10
//! seed: 42
//! ```
//!
//! Every field is optional. Missing fields fall back to the defaults below.

use crate::error::ContentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_FILLER: &str = "0";
pub const DEFAULT_PADDER: &str = "0";
pub const DEFAULT_PREFIX: &str = "";
pub const DEFAULT_SUFFIX: &str = "";
pub const DEFAULT_MAX_RANDOM: u32 = 10;

/// The part of a file a pattern is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternRole {
    Prefix,
    Filler,
    Padder,
    Suffix,
}

impl PatternRole {
    pub const ALL: [PatternRole; 4] = [
        PatternRole::Prefix,
        PatternRole::Filler,
        PatternRole::Padder,
        PatternRole::Suffix,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PatternRole::Prefix => "prefix",
            PatternRole::Filler => "filler",
            PatternRole::Padder => "padder",
            PatternRole::Suffix => "suffix",
        }
    }

    pub fn default_pattern(self) -> &'static str {
        match self {
            PatternRole::Prefix => DEFAULT_PREFIX,
            PatternRole::Filler => DEFAULT_FILLER,
            PatternRole::Padder => DEFAULT_PADDER,
            PatternRole::Suffix => DEFAULT_SUFFIX,
        }
    }

    /// Salt mixed into the configured seed so every role draws its own stream.
    pub(crate) fn seed_salt(self) -> u64 {
        match self {
            PatternRole::Prefix => 1,
            PatternRole::Filler => 2,
            PatternRole::Padder => 3,
            PatternRole::Suffix => 4,
        }
    }
}

impl fmt::Display for PatternRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatternRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("Unknown pattern role: {s}"))
    }
}

/// Patterns and randomness settings for one synthetic file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Repeating body pattern
    pub filler: Option<String>,

    /// Fixed pattern at the start of the file
    pub prefix: Option<String>,

    /// Fixed pattern at the end of the file
    pub suffix: Option<String>,

    /// Pattern used to fill up to the suffix exactly
    pub padder: Option<String>,

    /// Upper bound for `*` and `+` repeat counts
    pub max_random: u32,

    /// Seed for reproducible content; `None` draws from the thread RNG
    pub seed: Option<u64>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            filler: None,
            prefix: None,
            suffix: None,
            padder: None,
            max_random: DEFAULT_MAX_RANDOM,
            seed: None,
        }
    }
}

impl ContentConfig {
    /// Configuration with only a filler set.
    pub fn with_filler(filler: impl Into<String>) -> Self {
        Self {
            filler: Some(filler.into()),
            ..Self::default()
        }
    }

    /// Parse a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ContentError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ContentError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// The configured pattern for `role`, if any (empty strings included).
    pub fn get(&self, role: PatternRole) -> Option<&str> {
        match role {
            PatternRole::Prefix => self.prefix.as_deref(),
            PatternRole::Filler => self.filler.as_deref(),
            PatternRole::Padder => self.padder.as_deref(),
            PatternRole::Suffix => self.suffix.as_deref(),
        }
    }

    pub fn set(&mut self, role: PatternRole, pattern: Option<String>) {
        let slot = match role {
            PatternRole::Prefix => &mut self.prefix,
            PatternRole::Filler => &mut self.filler,
            PatternRole::Padder => &mut self.padder,
            PatternRole::Suffix => &mut self.suffix,
        };
        *slot = pattern;
    }

    /// The pattern that will actually be compiled for `role`.
    ///
    /// An empty override counts as not provided and falls back to the default.
    pub fn pattern(&self, role: PatternRole) -> &str {
        match self.get(role) {
            Some("") => {
                tracing::warn!(
                    "Empty {role} pattern configured, using default {:?}",
                    role.default_pattern()
                );
                role.default_pattern()
            }
            Some(pattern) => pattern,
            None => role.default_pattern(),
        }
    }

    /// Seed for the given role, derived from the configured seed.
    pub fn role_seed(&self, role: PatternRole) -> Option<u64> {
        self.seed
            .map(|seed| seed.wrapping_add(role.seed_salt().wrapping_mul(0x9E3779B97F4A7C15)))
    }
}
