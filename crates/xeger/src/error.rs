//! Parse errors for pattern compilation.

/// Error type for pattern parsing.
///
/// Every variant carries the character position (counted from the start of
/// the top-level pattern) at which the problem was detected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A `(` without a matching `)`
    #[error("Incomplete expression: unbalanced '(' at position {position}")]
    UnbalancedGroup { position: usize },

    /// A `{` that is never closed
    #[error("Incomplete multiplier starting at position {position}")]
    IncompleteMultiplier { position: usize },

    /// A `}` with no digits before it
    #[error("Illegal end of multiplier at position {position}: no repeat count before '}}'")]
    IllegalMultiplierEnd { position: usize },

    /// Non-numeric or out-of-range content between `{` and `}`
    #[error("Malformed multiplier at position {position}: {reason}")]
    MalformedMultiplier { position: usize, reason: String },

    /// A multiplier token with nothing to repeat
    #[error("Multiplier '{symbol}' at position {position} has no preceding expression")]
    MultiplierWithoutExpression { position: usize, symbol: char },

    /// Empty set, dangling range or unterminated set
    #[error("Malformed set at position {position}: {reason}")]
    MalformedSet { position: usize, reason: String },

    /// One of `[ { } * + ?` used unescaped inside a set
    #[error("Unescaped reserved character '{character}' in set at position {position}")]
    UnescapedReservedCharacterInSet { position: usize, character: char },
}

impl ParseError {
    /// Position in the pattern where the error was detected.
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnbalancedGroup { position }
            | ParseError::IncompleteMultiplier { position }
            | ParseError::IllegalMultiplierEnd { position }
            | ParseError::MalformedMultiplier { position, .. }
            | ParseError::MultiplierWithoutExpression { position, .. }
            | ParseError::MalformedSet { position, .. }
            | ParseError::UnescapedReservedCharacterInSet { position, .. } => *position,
        }
    }
}
