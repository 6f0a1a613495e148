//! Content-generating nodes.
//!
//! A node produces one complete expansion of itself per call. Repetition is
//! not a node concern: the owning [`Expression`](crate::Expression) applies
//! its multiplier by expanding the node that many times.

use crate::pattern::Pattern;
use crate::random::BoundedRandomSource;
use rand::Rng;
use std::fmt;

/// Characters that must be escaped to appear literally outside a set.
pub(crate) const LITERAL_RESERVED: [char; 10] = ['(', ')', '[', ']', '\\', '{', '}', '*', '+', '?'];

/// Characters that must be escaped to appear literally inside a set.
pub(crate) const SET_RESERVED: [char; 9] = ['[', ']', '\\', '-', '{', '}', '*', '+', '?'];

/// Trait for anything that can append generated content to a buffer.
pub trait Expand {
    /// Append one complete expansion to `out` and return the number of bytes written.
    fn expand_into(&mut self, out: &mut Vec<u8>) -> usize;

    /// Upper bound on the number of bytes a single expansion can produce.
    fn max_len(&self) -> usize;

    /// Produce one complete expansion as a new buffer.
    fn expand(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        self.expand_into(&mut out);
        out
    }
}

/// A fixed run of characters, escapes already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralRun {
    text: String,
}

impl LiteralRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Expand for LiteralRun {
    fn expand_into(&mut self, out: &mut Vec<u8>) -> usize {
        out.extend_from_slice(self.text.as_bytes());
        self.text.len()
    }

    fn max_len(&self) -> usize {
        self.text.len()
    }
}

/// A choice of one character out of an ordered member list.
#[derive(Debug, Clone)]
pub struct CharacterSet {
    members: Vec<char>,
    source: BoundedRandomSource,
}

impl CharacterSet {
    /// Build a set whose pool picks uniformly among `members`.
    pub fn new<R: Rng>(members: Vec<char>, rng: &mut R) -> Self {
        let last = members.len().saturating_sub(1) as u32;
        Self {
            source: BoundedRandomSource::new(0, last, rng),
            members,
        }
    }

    pub fn members(&self) -> &[char] {
        &self.members
    }
}

impl Expand for CharacterSet {
    fn expand_into(&mut self, out: &mut Vec<u8>) -> usize {
        let index = self.source.draw() as usize;
        let Some(member) = self.members.get(index) else {
            return 0;
        };
        let mut encoded = [0u8; 4];
        let bytes = member.encode_utf8(&mut encoded).as_bytes();
        out.extend_from_slice(bytes);
        bytes.len()
    }

    fn max_len(&self) -> usize {
        self.members
            .iter()
            .map(|member| member.len_utf8())
            .max()
            .unwrap_or(0)
    }
}

/// A parenthesised sub-pattern.
#[derive(Debug, Clone)]
pub struct Group {
    pattern: Pattern,
}

impl Group {
    pub fn new(pattern: Pattern) -> Self {
        Self { pattern }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}

impl Expand for Group {
    fn expand_into(&mut self, out: &mut Vec<u8>) -> usize {
        self.pattern.expand_into(out)
    }

    fn max_len(&self) -> usize {
        self.pattern.max_len()
    }
}

/// Any node an expression can repeat.
#[derive(Debug, Clone)]
pub enum ContentNode {
    Literal(LiteralRun),
    Set(CharacterSet),
    Group(Group),
}

impl Expand for ContentNode {
    fn expand_into(&mut self, out: &mut Vec<u8>) -> usize {
        match self {
            ContentNode::Literal(literal) => literal.expand_into(out),
            ContentNode::Set(set) => set.expand_into(out),
            ContentNode::Group(group) => group.expand_into(out),
        }
    }

    fn max_len(&self) -> usize {
        match self {
            ContentNode::Literal(literal) => literal.max_len(),
            ContentNode::Set(set) => set.max_len(),
            ContentNode::Group(group) => group.max_len(),
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, c: char, reserved: &[char]) -> fmt::Result {
    if reserved.contains(&c) {
        write!(f, "\\{c}")
    } else {
        write!(f, "{c}")
    }
}

impl fmt::Display for LiteralRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.text
            .chars()
            .try_for_each(|c| write_escaped(f, c, &LITERAL_RESERVED))
    }
}

impl fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for &member in &self.members {
            write_escaped(f, member, &SET_RESERVED)?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.pattern)
    }
}

impl fmt::Display for ContentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentNode::Literal(literal) => fmt::Display::fmt(literal, f),
            ContentNode::Set(set) => fmt::Display::fmt(set, f),
            ContentNode::Group(group) => fmt::Display::fmt(group, f),
        }
    }
}
