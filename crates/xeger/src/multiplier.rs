//! Repeat counts attached to expressions.

use crate::random::BoundedRandomSource;
use rand::Rng;
use std::fmt;

/// The token a random multiplier was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomRepeat {
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
    /// `?`
    Optional,
}

impl RandomRepeat {
    /// Inclusive count bounds for this token under the given `max_random`.
    pub fn bounds(self, max_random: u32) -> (u32, u32) {
        match self {
            RandomRepeat::ZeroOrMore => (0, max_random),
            RandomRepeat::OneOrMore => (1, max_random.max(1)),
            RandomRepeat::Optional => (0, 1),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            RandomRepeat::ZeroOrMore => '*',
            RandomRepeat::OneOrMore => '+',
            RandomRepeat::Optional => '?',
        }
    }
}

/// Repeat count of an expression: either fixed, or drawn per expansion.
#[derive(Debug, Clone)]
pub enum Multiplier {
    Constant(u32),
    Random {
        repeat: RandomRepeat,
        source: BoundedRandomSource,
    },
}

impl Multiplier {
    /// The implicit multiplier of an expression written without one.
    pub fn once() -> Self {
        Multiplier::Constant(1)
    }

    /// Random multiplier with a freshly filled pool of its own.
    pub fn random<R: Rng>(repeat: RandomRepeat, max_random: u32, rng: &mut R) -> Self {
        let (min, max) = repeat.bounds(max_random);
        Multiplier::Random {
            repeat,
            source: BoundedRandomSource::new(min, max, rng),
        }
    }

    /// Resolve the repeat count for one expansion.
    pub fn count(&mut self) -> u32 {
        match self {
            Multiplier::Constant(count) => *count,
            Multiplier::Random { source, .. } => source.draw(),
        }
    }

    pub fn is_random(&self) -> bool {
        matches!(self, Multiplier::Random { .. })
    }

    /// Inclusive bounds on the count this multiplier can produce.
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            Multiplier::Constant(count) => (*count, *count),
            Multiplier::Random { source, .. } => source.bounds(),
        }
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multiplier::Constant(1) => Ok(()),
            Multiplier::Constant(count) => write!(f, "{{{count}}}"),
            Multiplier::Random { repeat, .. } => write!(f, "{}", repeat.symbol()),
        }
    }
}
