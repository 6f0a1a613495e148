//! Windowed reads over a synthetic file.
//!
//! A file of `total_size` bytes is laid out as:
//!
//! ```text
//! 0            prefix_len                      suffix_start     total_size
//! ├── prefix ──┼──── filler ... filler │ padding ┼──── suffix ────┤
//! ```
//!
//! Prefix and suffix are expanded once when the reader is built and are
//! served by slicing, so any read of them is reproducible. The body is
//! generated on demand. Filler expansions are emitted whole while they fit
//! before `suffix_start`. The first expansion that would cross it is
//! replaced by padder output cut to land exactly on the boundary.
//!
//! Generation is sequential. Bytes generated past the end of a read are kept
//! as a remainder and handed to the next read if it starts exactly where
//! this one ended. Any other read discards the remainder and starts a fresh
//! filler expansion at its own start offset.

use crate::config::{ContentConfig, PatternRole};
use crate::error::ContentError;
use tracing::{debug, trace, warn};
use xeger::{Expand, Pattern};

/// Consecutive empty expansions tolerated before falling back.
const IDLE_EXPANSION_LIMIT: usize = 4096;

/// Byte used to complete padding when the padder stops producing content.
const FALLBACK_PAD_BYTE: u8 = b'0';

/// Answers byte-range reads for one synthetic file.
///
/// `read` mutates the remainder and the read cursor, so a reader must not be
/// shared between concurrent readers of the same file without a lock.
#[derive(Debug)]
pub struct WindowedReader {
    total_size: u64,
    prefix: Vec<u8>,
    suffix: Vec<u8>,
    filler: Pattern,
    padder: Pattern,
    last_read_end: u64,
    remainder: Vec<u8>,
}

impl WindowedReader {
    /// Build a reader for a file of `total_size` bytes.
    ///
    /// Fails if any pattern does not compile, or if the filler or padder can
    /// never produce content.
    pub fn new(total_size: u64, config: &ContentConfig) -> Result<Self, ContentError> {
        let prefix = compile_role(config, PatternRole::Prefix)?.expand_once();
        let suffix = compile_role(config, PatternRole::Suffix)?.expand_once();
        let filler = compile_repeating(config, PatternRole::Filler)?;
        let padder = compile_repeating(config, PatternRole::Padder)?;

        let (prefix, suffix) = fit_fixed_regions(total_size, prefix, suffix);

        debug!(
            "Created reader for {total_size} bytes (prefix: {} bytes, suffix: {} bytes, filler: {filler}, padder: {padder})",
            prefix.len(),
            suffix.len()
        );

        Ok(Self {
            total_size,
            prefix,
            suffix,
            filler,
            padder,
            last_read_end: 0,
            remainder: Vec::new(),
        })
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// The fixed bytes at the start of the file.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// The fixed bytes at the end of the file.
    pub fn suffix(&self) -> &[u8] {
        &self.suffix
    }

    /// Offset of the first suffix byte.
    pub fn suffix_start(&self) -> u64 {
        self.total_size - self.suffix.len() as u64
    }

    /// Read the half-open window `[start, end)`.
    ///
    /// Out-of-range windows are clamped to the file. The returned buffer is
    /// exactly `end - start` bytes long after clamping.
    pub fn read(&mut self, start: u64, end: u64) -> Vec<u8> {
        let (start, end) = self.clamp(start, end);
        let prefix_len = self.prefix.len() as u64;
        let suffix_start = self.suffix_start();

        let mut out = Vec::with_capacity((end - start) as usize);
        let mut position = start;

        if start < prefix_len {
            self.remainder.clear();
            let prefix_end = end.min(prefix_len);
            out.extend_from_slice(&self.prefix[start as usize..prefix_end as usize]);
            position = prefix_end;
        } else if start != self.last_read_end {
            if !self.remainder.is_empty() {
                trace!(
                    "Read at {start} does not continue previous read ending at {}, dropping {} buffered bytes",
                    self.last_read_end,
                    self.remainder.len()
                );
            }
            self.remainder.clear();
        }

        let body_end = end.min(suffix_start);
        if position < body_end {
            self.fill_body(position, body_end, &mut out);
        }

        if end > suffix_start {
            self.remainder.clear();
            let from = (start.max(suffix_start) - suffix_start) as usize;
            let to = (end - suffix_start) as usize;
            out.extend_from_slice(&self.suffix[from..to]);
        }

        self.last_read_end = end;
        out
    }

    /// Read `size` bytes starting at `offset`.
    pub fn read_at(&mut self, offset: u64, size: u64) -> Vec<u8> {
        self.read(offset, offset.saturating_add(size))
    }

    /// Sequential reads of `chunk_size` bytes covering the whole file.
    pub fn chunks(&mut self, chunk_size: usize) -> ReadChunks<'_> {
        ReadChunks {
            reader: self,
            position: 0,
            chunk_size: chunk_size.max(1) as u64,
        }
    }

    fn clamp(&self, start: u64, end: u64) -> (u64, u64) {
        let clamped_end = end.min(self.total_size);
        let clamped_start = start.min(clamped_end);

        if (clamped_start, clamped_end) != (start, end) {
            warn!(
                "Read window [{start}, {end}) is outside the file of {} bytes, clamped to [{clamped_start}, {clamped_end})",
                self.total_size
            );
        }

        (clamped_start, clamped_end)
    }

    /// Append generated body bytes for `[position, body_end)` to `out`.
    fn fill_body(&mut self, mut position: u64, body_end: u64, out: &mut Vec<u8>) {
        let suffix_start = self.suffix_start();

        if !self.remainder.is_empty() {
            let take = self.remainder.len().min((body_end - position) as usize);
            out.extend(self.remainder.drain(..take));
            position += take as u64;
        }

        let mut idle = 0;
        while position < body_end {
            let needed = (body_end - position) as usize;
            let mut chunk = self.filler.expand();

            if chunk.is_empty() {
                idle += 1;
                if idle < IDLE_EXPANSION_LIMIT {
                    continue;
                }
                warn!(
                    "Filler {} produced no content {IDLE_EXPANSION_LIMIT} times in a row, padding {needed} bytes",
                    self.filler
                );
                chunk = self.pad(needed);
            } else if position + chunk.len() as u64 > suffix_start {
                chunk = self.pad((suffix_start - position) as usize);
            }
            idle = 0;

            if chunk.len() > needed {
                self.remainder = chunk.split_off(needed);
            }
            position += chunk.len() as u64;
            out.append(&mut chunk);
        }
    }

    /// Exactly `len` bytes of padder output.
    fn pad(&mut self, len: usize) -> Vec<u8> {
        let mut padding = Vec::with_capacity(len);
        let mut idle = 0;

        while padding.len() < len {
            if self.padder.expand_into(&mut padding) > 0 {
                idle = 0;
                continue;
            }
            idle += 1;
            if idle >= IDLE_EXPANSION_LIMIT {
                warn!(
                    "Padder {} produced no content {IDLE_EXPANSION_LIMIT} times in a row, completing with {:?}",
                    self.padder, FALLBACK_PAD_BYTE as char
                );
                padding.resize(len, FALLBACK_PAD_BYTE);
            }
        }

        padding.truncate(len);
        padding
    }
}

/// Iterator over sequential fixed-size reads of a whole file.
pub struct ReadChunks<'a> {
    reader: &'a mut WindowedReader,
    position: u64,
    chunk_size: u64,
}

impl Iterator for ReadChunks<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        let total_size = self.reader.total_size();
        if self.position >= total_size {
            return None;
        }

        let end = self.position.saturating_add(self.chunk_size).min(total_size);
        let chunk = self.reader.read(self.position, end);
        self.position = end;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.reader.total_size().saturating_sub(self.position);
        let chunks = left.div_ceil(self.chunk_size) as usize;
        (chunks, Some(chunks))
    }
}

impl ExactSizeIterator for ReadChunks<'_> {}

fn compile_role(config: &ContentConfig, role: PatternRole) -> Result<Pattern, ContentError> {
    let pattern = config.pattern(role);
    let compiled = match config.role_seed(role) {
        Some(seed) => xeger::compile_seeded(pattern, config.max_random, seed),
        None => xeger::compile(pattern, config.max_random),
    };

    compiled.map_err(|source| ContentError::Pattern {
        role,
        pattern: pattern.to_string(),
        source,
    })
}

/// Compile a filler or padder, which must be able to produce content.
fn compile_repeating(config: &ContentConfig, role: PatternRole) -> Result<Pattern, ContentError> {
    let compiled = compile_role(config, role)?;
    if compiled.max_len() == 0 {
        return Err(ContentError::EmptyPattern {
            role,
            pattern: compiled.to_string(),
        });
    }
    Ok(compiled)
}

/// Shrink prefix and suffix so that together they fit in `total_size`.
///
/// The prefix is kept from its start, the suffix from its end.
fn fit_fixed_regions(total_size: u64, mut prefix: Vec<u8>, mut suffix: Vec<u8>) -> (Vec<u8>, Vec<u8>) {
    let fixed_len = prefix.len() as u64 + suffix.len() as u64;
    if fixed_len <= total_size {
        return (prefix, suffix);
    }

    warn!(
        "Prefix ({} bytes) and suffix ({} bytes) do not fit in a file of {total_size} bytes, truncating",
        prefix.len(),
        suffix.len()
    );

    let prefix_len = (prefix.len() as u64).min(total_size);
    prefix.truncate(prefix_len as usize);

    let suffix_room = (total_size - prefix_len) as usize;
    suffix.drain(..suffix.len() - suffix_room);

    (prefix, suffix)
}
