//! Expressions and the patterns they concatenate into.

use crate::multiplier::Multiplier;
use crate::node::{ContentNode, Expand, LiteralRun};
use std::fmt;

/// A content node paired with its repeat count.
#[derive(Debug, Clone)]
pub struct Expression {
    node: ContentNode,
    multiplier: Multiplier,
}

impl Expression {
    pub fn new(node: ContentNode, multiplier: Multiplier) -> Self {
        Self { node, multiplier }
    }

    /// A literal run emitted exactly once.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(
            ContentNode::Literal(LiteralRun::new(text)),
            Multiplier::once(),
        )
    }

    pub fn node(&self) -> &ContentNode {
        &self.node
    }

    pub fn multiplier(&self) -> &Multiplier {
        &self.multiplier
    }
}

impl Expand for Expression {
    fn expand_into(&mut self, out: &mut Vec<u8>) -> usize {
        let count = self.multiplier.count();
        (0..count).map(|_| self.node.expand_into(out)).sum()
    }

    fn max_len(&self) -> usize {
        let (_, max_count) = self.multiplier.bounds();
        self.node.max_len().saturating_mul(max_count as usize)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repeated_run = matches!(
            (&self.node, &self.multiplier),
            (ContentNode::Literal(run), multiplier)
                if run.text().chars().count() > 1 && !matches!(multiplier, Multiplier::Constant(1))
        );

        // A multi-character run only repeats as a whole when grouped.
        if repeated_run {
            write!(f, "({}){}", self.node, self.multiplier)
        } else {
            write!(f, "{}{}", self.node, self.multiplier)
        }
    }
}

/// An ordered list of expressions, expanded by concatenation.
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    expressions: Vec<Expression>,
}

impl Pattern {
    pub fn new(expressions: Vec<Expression>) -> Self {
        Self { expressions }
    }

    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Expand the pattern a single time and discard it.
    ///
    /// Used for prefixes and suffixes, whose content is fixed once generated.
    pub fn expand_once(mut self) -> Vec<u8> {
        self.expand()
    }
}

impl Expand for Pattern {
    fn expand_into(&mut self, out: &mut Vec<u8>) -> usize {
        self.expressions
            .iter_mut()
            .map(|expression| expression.expand_into(out))
            .sum()
    }

    fn max_len(&self) -> usize {
        self.expressions
            .iter()
            .fold(0usize, |total, expression| {
                total.saturating_add(expression.max_len())
            })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.expressions
            .iter()
            .try_for_each(|expression| write!(f, "{expression}"))
    }
}
