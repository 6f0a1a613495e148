//! Errors raised while building a reader.

use crate::config::PatternRole;
use xeger::ParseError;

/// Error type for content configuration and reader construction.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// A configured pattern failed to compile
    #[error("Failed to compile {role} pattern {pattern:?}: {source}")]
    Pattern {
        role: PatternRole,
        pattern: String,
        #[source]
        source: ParseError,
    },

    /// A repeating pattern that can never produce a byte
    #[error("The {role} pattern {pattern:?} never produces any content")]
    EmptyPattern { role: PatternRole, pattern: String },

    /// Error reading a configuration file
    #[error("Failed to read content config: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
}
