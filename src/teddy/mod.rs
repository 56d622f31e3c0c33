//! Teddy multi-pattern search
//!
//! Patterns are spread over buckets and the first `masks` bytes of every
//! pattern are fingerprinted into nibble tables. A shuffle of the haystack
//! nibbles through those tables yields, per position, the set of buckets that
//! may start a match there; only those buckets are verified.
//!
//! Slim Teddy uses 128-bit registers and 8 buckets (SSSE3). Fat Teddy
//! broadcasts each 16-byte chunk into both halves of a 256-bit register and
//! carries 16 buckets (AVX2). Without the needed instructions, or for short
//! haystacks, the same tables are walked one position at a time.
//!
//! ```
//! use simdstr::teddy::Teddy;
//!
//! let teddy = Teddy::new(&["foo", "bar", "baz"]).unwrap();
//! let m = teddy.find(b"xx bar foo").unwrap();
//! assert_eq!((m.pattern(), m.start(), m.end()), (1, 3, 6));
//! assert_eq!(teddy.find_iter(b"xx bar foo").count(), 2);
//! ```

#[cfg(target_arch = "x86_64")]
mod fat;
mod masks;
#[cfg(target_arch = "x86_64")]
mod slim;

use crate::cpu::Backend;
use masks::{MAX_MASKS, Masks};
use std::fmt;
use std::ops::Range;
use thiserror::Error;

/// Slim Teddy pattern limit
pub const SLIM_MAX_PATTERNS: usize = 64;
/// Fat Teddy pattern limit
pub const FAT_MAX_PATTERNS: usize = 256;
/// `Flavor::Auto` picks Slim up to this many patterns
pub const AUTO_SLIM_LIMIT: usize = 32;

const DEFAULT_MASKS: usize = 3;

/// Errors from building a [`Teddy`] searcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TeddyError {
    #[error("at least one pattern is required")]
    NoPatterns,

    #[error("pattern {id} is empty")]
    EmptyPattern { id: usize },

    #[error("{count} patterns exceed the {max} pattern limit of {flavor} Teddy")]
    TooManyPatterns {
        count: usize,
        max: usize,
        flavor: Flavor,
    },

    #[error("mask count {masks} is outside 1..=4")]
    InvalidMaskCount { masks: usize },

    #[error("pattern {id} is {len} bytes, shorter than the {masks} fingerprinted bytes")]
    PatternTooShort { id: usize, len: usize, masks: usize },
}

/// Register width and bucket count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flavor {
    /// Slim for small pattern sets, Fat otherwise
    #[default]
    Auto,
    /// 128-bit, 8 buckets
    Slim,
    /// 256-bit, 16 buckets
    Fat,
}

impl Flavor {
    /// Number of buckets (Auto reports Fat's)
    #[must_use]
    pub const fn buckets(self) -> usize {
        match self {
            Self::Slim => 8,
            Self::Fat | Self::Auto => 16,
        }
    }

    /// Largest pattern set this flavor accepts
    #[must_use]
    pub const fn max_patterns(self) -> usize {
        match self {
            Self::Slim => SLIM_MAX_PATTERNS,
            Self::Fat | Self::Auto => FAT_MAX_PATTERNS,
        }
    }

    const fn resolve(self, patterns: usize) -> Self {
        match self {
            Self::Auto if patterns <= AUTO_SLIM_LIMIT => Self::Slim,
            Self::Auto => Self::Fat,
            other => other,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Slim => "slim",
            Self::Fat => "fat",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Construction options for [`Teddy::with_options`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeddyOptions {
    pub flavor: Flavor,
    /// Fingerprinted leading bytes, `None` for `min(3, shortest pattern)`
    pub masks: Option<usize>,
    /// `Scalar` disables the vector kernels
    pub backend: Backend,
}

impl Default for TeddyOptions {
    fn default() -> Self {
        Self {
            flavor: Flavor::Auto,
            masks: None,
            backend: Backend::detect(),
        }
    }
}

/// One pattern occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Match {
    pattern: usize,
    start: usize,
    end: usize,
}

impl Match {
    /// Index of the matched pattern in the construction order
    #[must_use]
    pub const fn pattern(&self) -> usize {
        self.pattern
    }

    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Exclusive end offset
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Compiled multi-pattern searcher
#[derive(Debug, Clone)]
pub struct Teddy {
    patterns: Vec<Vec<u8>>,
    buckets: Vec<Vec<usize>>,
    masks: Masks,
    flavor: Flavor,
    min_len: usize,
    #[cfg_attr(not(target_arch = "x86_64"), allow(dead_code))]
    vectorized: bool,
}

impl Teddy {
    /// Searcher with default options
    pub fn new<P: AsRef<[u8]>>(patterns: &[P]) -> Result<Self, TeddyError> {
        Self::with_options(patterns, TeddyOptions::default())
    }

    pub fn with_options<P: AsRef<[u8]>>(
        patterns: &[P],
        options: TeddyOptions,
    ) -> Result<Self, TeddyError> {
        let patterns: Vec<Vec<u8>> = patterns.iter().map(|p| p.as_ref().to_vec()).collect();
        if patterns.is_empty() {
            return Err(TeddyError::NoPatterns);
        }
        if let Some(id) = patterns.iter().position(Vec::is_empty) {
            return Err(TeddyError::EmptyPattern { id });
        }

        let flavor = options.flavor.resolve(patterns.len());
        if patterns.len() > flavor.max_patterns() {
            return Err(TeddyError::TooManyPatterns {
                count: patterns.len(),
                max: flavor.max_patterns(),
                flavor,
            });
        }

        let min_len = patterns.iter().map(Vec::len).min().unwrap_or(1);
        let masks = options.masks.unwrap_or_else(|| min_len.min(DEFAULT_MASKS));
        if !(1..=MAX_MASKS).contains(&masks) {
            return Err(TeddyError::InvalidMaskCount { masks });
        }
        if let Some((id, pattern)) = patterns.iter().enumerate().find(|(_, p)| p.len() < masks) {
            return Err(TeddyError::PatternTooShort {
                id,
                len: pattern.len(),
                masks,
            });
        }

        let mut buckets = vec![Vec::new(); flavor.buckets()];
        for id in 0..patterns.len() {
            if let Some(bucket) = buckets.get_mut(id % flavor.buckets()) {
                bucket.push(id);
            }
        }
        let masks = Masks::build(&patterns, &buckets, masks, flavor == Flavor::Fat);

        crate::debug!(
            "teddy: {} patterns, {} flavor, {} masks",
            patterns.len(),
            flavor,
            masks.count
        );

        Ok(Self {
            patterns,
            buckets,
            masks,
            flavor,
            min_len,
            vectorized: options.backend == Backend::Avx2,
        })
    }

    /// Resolved flavor, never `Auto`
    #[must_use]
    pub const fn flavor(&self) -> Flavor {
        self.flavor
    }

    #[must_use]
    pub const fn mask_count(&self) -> usize {
        self.masks.count
    }

    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub fn pattern(&self, id: usize) -> Option<&[u8]> {
        self.patterns.get(id).map(Vec::as_slice)
    }

    /// Pattern ids assigned to `bucket`
    #[must_use]
    pub fn bucket(&self, bucket: usize) -> &[usize] {
        self.buckets.get(bucket).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.find(haystack).is_some()
    }

    /// Leftmost match; the lowest pattern id wins among matches at one start
    #[must_use]
    pub fn find(&self, haystack: &[u8]) -> Option<Match> {
        self.find_at(haystack, 0)
    }

    /// Leftmost match starting at or after `start`
    #[must_use]
    pub fn find_at(&self, haystack: &[u8], start: usize) -> Option<Match> {
        if start > haystack.len() || haystack.len() - start < self.min_len {
            return None;
        }
        #[cfg(target_arch = "x86_64")]
        if self.vectorized {
            return match self.flavor {
                Flavor::Fat => fat::find(self, haystack, start),
                Flavor::Slim | Flavor::Auto => slim::find(self, haystack, start),
            };
        }
        self.find_scalar(haystack, start)
    }

    /// Non-overlapping matches, left to right
    pub fn find_iter<'a>(&'a self, haystack: &'a [u8]) -> FindIter<'a> {
        FindIter {
            teddy: self,
            haystack,
            pos: 0,
        }
    }

    /// Walk the nibble tables one position at a time
    fn find_scalar(&self, haystack: &[u8], start: usize) -> Option<Match> {
        let last = haystack.len().checked_sub(self.min_len)?;
        (start..=last).find_map(|pos| match self.masks.candidates(haystack, pos) {
            0 => None,
            bits => self.verify(haystack, pos, bits),
        })
    }

    /// Confirm the candidate buckets in `bits` at `pos`
    fn verify(&self, haystack: &[u8], pos: usize, mut bits: u16) -> Option<Match> {
        let rest = haystack.get(pos..)?;
        let mut best: Option<usize> = None;
        while bits != 0 {
            let bucket = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            let hit = self
                .bucket(bucket)
                .iter()
                .copied()
                .find(|&id| self.pattern(id).is_some_and(|p| rest.starts_with(p)));
            if let Some(id) = hit {
                best = Some(best.map_or(id, |b| b.min(id)));
            }
        }
        let pattern = best?;
        Some(Match {
            pattern,
            start: pos,
            end: pos + self.pattern(pattern).map_or(0, <[u8]>::len),
        })
    }
}

/// Iterator returned by [`Teddy::find_iter`]
#[derive(Debug, Clone)]
pub struct FindIter<'a> {
    teddy: &'a Teddy,
    haystack: &'a [u8],
    pos: usize,
}

impl Iterator for FindIter<'_> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        let m = self.teddy.find_at(self.haystack, self.pos)?;
        self.pos = m.end;
        Some(m)
    }
}
