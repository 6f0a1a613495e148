//! Recursive-descent parser from pattern strings to [`Pattern`] trees.
//!
//! The parser walks an immutable character slice with an explicit cursor.
//! Groups are handed to a nested parser as a sub-slice together with the
//! absolute offset of that slice, so error positions always refer to the
//! original pattern string.

use crate::error::ParseError;
use crate::multiplier::{Multiplier, RandomRepeat};
use crate::node::{CharacterSet, ContentNode, Group, LiteralRun};
use crate::pattern::{Expression, Pattern};
use rand::Rng;

/// Unescaped characters that are rejected inside a set.
const RESERVED_IN_SET: [char; 6] = ['[', '{', '}', '*', '+', '?'];

pub(crate) struct Parser<'a, R> {
    chars: &'a [char],
    pos: usize,
    offset: usize,
    max_random: u32,
    rng: &'a mut R,
}

impl<'a, R: Rng> Parser<'a, R> {
    pub(crate) fn new(chars: &'a [char], offset: usize, max_random: u32, rng: &'a mut R) -> Self {
        Self {
            chars,
            pos: 0,
            offset,
            max_random,
            rng,
        }
    }

    pub(crate) fn parse_pattern(mut self) -> Result<Pattern, ParseError> {
        let mut expressions = Vec::new();
        let mut pending: Vec<char> = Vec::new();

        while let Some(c) = self.peek() {
            match c {
                '(' | '[' if !pending.is_empty() => {
                    expressions.push(flush(&mut pending));
                }
                '(' => {
                    let group = self.parse_group()?;
                    let multiplier = self.parse_multiplier()?;
                    expressions.push(Expression::new(group, multiplier));
                }
                '[' => {
                    let set = self.parse_set()?;
                    let multiplier = self.parse_multiplier()?;
                    expressions.push(Expression::new(set, multiplier));
                }
                '\\' => {
                    self.pos += 1;
                    // A trailing backslash stands for itself.
                    let escaped = self.bump().unwrap_or('\\');
                    pending.push(escaped);
                }
                '{' | '*' | '+' | '?' => {
                    let Some(last) = pending.pop() else {
                        return Err(ParseError::MultiplierWithoutExpression {
                            position: self.absolute(self.pos),
                            symbol: c,
                        });
                    };
                    if !pending.is_empty() {
                        expressions.push(flush(&mut pending));
                    }
                    let multiplier = self.parse_multiplier()?;
                    expressions.push(Expression::new(
                        ContentNode::Literal(LiteralRun::new(last)),
                        multiplier,
                    ));
                }
                _ => {
                    pending.push(c);
                    self.pos += 1;
                }
            }
        }

        if !pending.is_empty() {
            expressions.push(flush(&mut pending));
        }

        Ok(Pattern::new(expressions))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn absolute(&self, index: usize) -> usize {
        self.offset + index
    }

    /// Parse `( ... )` starting at the cursor.
    fn parse_group(&mut self) -> Result<ContentNode, ParseError> {
        let open = self.pos;
        let close = self
            .matching_paren(open)
            .ok_or(ParseError::UnbalancedGroup {
                position: self.absolute(open),
            })?;

        let chars = self.chars;
        let nested = Parser::new(
            &chars[open + 1..close],
            self.absolute(open + 1),
            self.max_random,
            &mut *self.rng,
        )
        .parse_pattern()?;

        self.pos = close + 1;
        Ok(ContentNode::Group(Group::new(nested)))
    }

    /// Index of the `)` closing the `(` at `open`.
    ///
    /// Escaped characters and parentheses inside sets do not affect the depth.
    fn matching_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut in_set = false;
        let mut index = open;

        while index < self.chars.len() {
            match self.chars[index] {
                '\\' => index += 1,
                '[' if !in_set => in_set = true,
                ']' if in_set => in_set = false,
                '(' if !in_set => depth += 1,
                ')' if !in_set => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(index);
                    }
                }
                _ => {}
            }
            index += 1;
        }

        None
    }

    /// Parse `[ ... ]` starting at the cursor.
    fn parse_set(&mut self) -> Result<ContentNode, ParseError> {
        let open = self.absolute(self.pos);
        self.pos += 1;

        let mut members: Vec<char> = Vec::new();
        // Last unescaped member, available as the lower bound of a range.
        let mut range_start: Option<char> = None;
        // Lower bound of a range whose `-` has been seen.
        let mut open_range: Option<char> = None;

        loop {
            let position = self.absolute(self.pos);
            let Some(c) = self.bump() else {
                return Err(ParseError::MalformedSet {
                    position: open,
                    reason: "set is not closed with ']'".to_string(),
                });
            };

            match c {
                ']' => {
                    if open_range.is_some() {
                        return Err(ParseError::MalformedSet {
                            position,
                            reason: "range has no upper bound".to_string(),
                        });
                    }
                    if members.is_empty() {
                        return Err(ParseError::MalformedSet {
                            position,
                            reason: "set has no members".to_string(),
                        });
                    }
                    break;
                }
                '\\' => {
                    let Some(escaped) = self.bump() else {
                        return Err(ParseError::MalformedSet {
                            position: open,
                            reason: "set is not closed with ']'".to_string(),
                        });
                    };
                    if open_range.is_some() {
                        return Err(ParseError::MalformedSet {
                            position,
                            reason: "range bounds cannot be escaped".to_string(),
                        });
                    }
                    members.push(escaped);
                    range_start = None;
                }
                '-' => match (range_start.take(), open_range) {
                    (Some(low), None) => open_range = Some(low),
                    _ => {
                        return Err(ParseError::MalformedSet {
                            position,
                            reason: "'-' has no lower bound".to_string(),
                        })
                    }
                },
                c if RESERVED_IN_SET.contains(&c) => {
                    return Err(ParseError::UnescapedReservedCharacterInSet {
                        position,
                        character: c,
                    });
                }
                c => {
                    if let Some(low) = open_range.take() {
                        if low > c {
                            return Err(ParseError::MalformedSet {
                                position,
                                reason: format!("range '{low}-{c}' is out of order"),
                            });
                        }
                        // `low` was pushed as a plain member before the `-`.
                        members.pop();
                        members.extend(low..=c);
                        range_start = None;
                    } else {
                        members.push(c);
                        range_start = Some(c);
                    }
                }
            }
        }

        Ok(ContentNode::Set(CharacterSet::new(members, &mut *self.rng)))
    }

    /// Parse an optional multiplier at the cursor.
    fn parse_multiplier(&mut self) -> Result<Multiplier, ParseError> {
        let start = self.pos;
        let repeat = match self.peek() {
            Some('*') => RandomRepeat::ZeroOrMore,
            Some('+') => RandomRepeat::OneOrMore,
            Some('?') => RandomRepeat::Optional,
            Some('{') => {
                self.pos += 1;
                return self.parse_counted(start);
            }
            _ => return Ok(Multiplier::once()),
        };

        self.pos += 1;
        Ok(Multiplier::random(repeat, self.max_random, &mut *self.rng))
    }

    /// Parse the `digits}` part of `{digits}`; the `{` is already consumed.
    fn parse_counted(&mut self, start: usize) -> Result<Multiplier, ParseError> {
        let mut digits = String::new();

        loop {
            let position = self.absolute(self.pos);
            match self.bump() {
                None => {
                    return Err(ParseError::IncompleteMultiplier {
                        position: self.absolute(start),
                    })
                }
                Some('}') if digits.is_empty() => {
                    return Err(ParseError::IllegalMultiplierEnd { position })
                }
                Some('}') => break,
                Some(d) if d.is_ascii_digit() => digits.push(d),
                Some(other) => {
                    return Err(ParseError::MalformedMultiplier {
                        position,
                        reason: format!("expected a digit, found '{other}'"),
                    })
                }
            }
        }

        let count = digits
            .parse::<u32>()
            .map_err(|_| ParseError::MalformedMultiplier {
                position: self.absolute(start),
                reason: format!("repeat count {digits} is too large"),
            })?;

        Ok(Multiplier::Constant(count))
    }
}

fn flush(pending: &mut Vec<char>) -> Expression {
    Expression::literal(pending.drain(..).collect::<String>())
}
