//! Pattern compiler for SizeFS content generation.
//!
//! `xeger` is "regex" backwards: instead of matching text against a pattern,
//! it produces text that a pattern would match. Patterns use a small subset
//! of regular expression syntax:
//!
//! ```text
//! <Pattern>    ::= <Expression>*
//! <Expression> ::= <Char> [<Multiplier>]
//!                | "(" <Pattern> ")" [<Multiplier>]
//!                | "[" <Set> "]" [<Multiplier>]
//! <Multiplier> ::= "*" | "+" | "?" | "{" <Digits> "}"
//! <Set>        ::= (<Char> | <Char> "-" <Char>)+
//! ```
//!
//! `\` escapes any character, reserved ones included. Random multipliers are
//! bounded: `*` repeats `0..=max_random` times, `+` repeats
//! `1..=max_random` times and `?` repeats zero or one time.
//!
//! # Architecture
//!
//! ```text
//! "a(bc)*[0-9]"
//!        │  compile()
//!        ▼
//! Pattern
//!  ├─ Expression { Literal "a",  {1} }
//!  ├─ Expression { Group(Pattern["bc"]), * }   ── BoundedRandomSource
//!  └─ Expression { Set['0'..='9'], {1} }       ── BoundedRandomSource
//! ```
//!
//! Every random decision is served from a [`BoundedRandomSource`] owned by
//! the node that needs it. Sources are filled at compile time from an
//! explicit RNG, so compiling with a fixed seed yields reproducible output.
//!
//! # Example
//!
//! ```rust
//! use xeger::{compile_seeded, Expand};
//!
//! let mut pattern = compile_seeded("a(bc){2}d", 10, 42).unwrap();
//! assert_eq!(pattern.expand(), b"abcbcd");
//! ```

pub mod error;
pub mod multiplier;
pub mod node;
pub mod parser;
pub mod pattern;
pub mod random;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Re-exports for convenience
pub use error::ParseError;
pub use multiplier::{Multiplier, RandomRepeat};
pub use node::{CharacterSet, ContentNode, Expand, Group, LiteralRun};
pub use pattern::{Expression, Pattern};
pub use random::{BoundedRandomSource, POOL_SIZE};

/// Compile a pattern, filling random pools from the thread RNG.
pub fn compile(pattern: &str, max_random: u32) -> Result<Pattern, ParseError> {
    compile_with_rng(pattern, max_random, &mut rand::rng())
}

/// Compile a pattern with reproducible random pools.
pub fn compile_seeded(pattern: &str, max_random: u32, seed: u64) -> Result<Pattern, ParseError> {
    compile_with_rng(pattern, max_random, &mut StdRng::seed_from_u64(seed))
}

/// Compile a pattern, filling random pools from the given RNG.
pub fn compile_with_rng<R: Rng>(
    pattern: &str,
    max_random: u32,
    rng: &mut R,
) -> Result<Pattern, ParseError> {
    let chars: Vec<char> = pattern.chars().collect();
    let compiled = parser::Parser::new(&chars, 0, max_random, rng).parse_pattern()?;

    tracing::trace!(
        "Compiled pattern {pattern:?} into {} expressions",
        compiled.expressions().len()
    );

    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_seeded_is_reproducible() {
        let mut a = compile_seeded("[a-z]{8}(xy)*", 10, 7).unwrap();
        let mut b = compile_seeded("[a-z]{8}(xy)*", 10, 7).unwrap();
        for _ in 0..20 {
            assert_eq!(a.expand(), b.expand());
        }
    }

    #[test]
    fn test_compile_reports_errors() {
        assert!(compile("a(b", 10).is_err());
        assert!(compile("[", 10).is_err());
    }

    #[test]
    fn test_display_recompiles_to_same_content() {
        let source = r"x\*[0-2](ab){2}\(";
        let mut original = compile_seeded(source, 10, 3).unwrap();
        let rendered = original.to_string();
        let mut reparsed = compile_seeded(&rendered, 10, 3).unwrap();

        assert_eq!(rendered, r"x\*[012](ab){2}\(");
        assert_eq!(original.expand(), reparsed.expand());
    }

    #[test]
    fn test_max_len() {
        assert_eq!(compile("abc", 10).unwrap().max_len(), 3);
        assert_eq!(compile("a(bc)+", 10).unwrap().max_len(), 21);
        assert_eq!(compile("a{0}", 10).unwrap().max_len(), 0);
        assert_eq!(compile("", 10).unwrap().max_len(), 0);
    }
}
