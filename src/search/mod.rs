//! Single-needle byte-string search
//!
//! `strchr`/`strstr`-style searches over byte slices with ASCII
//! case-insensitive variants. Every function picks the process backend
//! ([`Backend::detect`]); the `*_with` variants take an explicit one. All
//! backends return the same positions.
//!
//! ```
//! use simdstr::search;
//!
//! assert_eq!(search::find(b"hello world", b"world"), Some(6));
//! assert_eq!(search::find_ignore_case(b"Hello World", b"WORLD"), Some(6));
//! assert_eq!(search::find_byte(b"hello", b'z'), None);
//! ```

#[cfg(target_arch = "x86_64")]
mod avx2;
pub(crate) mod scalar;

use crate::cpu::Backend;
use thiserror::Error;

/// Errors from configuring a [`Finder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("anchor offset {offset} is outside a needle of {len} bytes")]
    AnchorOutOfRange { offset: usize, len: usize },
}

/// Position of the first `byte` in `haystack`
#[must_use]
pub fn find_byte(haystack: &[u8], byte: u8) -> Option<usize> {
    find_byte_with(Backend::detect(), haystack, byte)
}

/// Position of the first `byte` in `haystack`, ignoring ASCII case
#[must_use]
pub fn find_byte_ignore_case(haystack: &[u8], byte: u8) -> Option<usize> {
    find_byte_ignore_case_with(Backend::detect(), haystack, byte)
}

/// Position of the first occurrence of `needle` in `haystack`.
///
/// An empty needle matches at 0.
#[must_use]
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    find_with(Backend::detect(), haystack, needle)
}

/// Position of the first occurrence of `needle`, ignoring ASCII case
#[must_use]
pub fn find_ignore_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    find_ignore_case_with(Backend::detect(), haystack, needle)
}

#[must_use]
#[cfg_attr(not(target_arch = "x86_64"), allow(unused_variables))]
pub fn find_byte_with(backend: Backend, haystack: &[u8], byte: u8) -> Option<usize> {
    #[cfg(target_arch = "x86_64")]
    if backend.effective() == Backend::Avx2 {
        return avx2::find_byte(haystack, byte);
    }
    scalar::find_byte(haystack, byte)
}

#[must_use]
#[cfg_attr(not(target_arch = "x86_64"), allow(unused_variables))]
pub fn find_byte_ignore_case_with(backend: Backend, haystack: &[u8], byte: u8) -> Option<usize> {
    #[cfg(target_arch = "x86_64")]
    if backend.effective() == Backend::Avx2 {
        return avx2::find_byte_ignore_case(haystack, byte);
    }
    scalar::find_byte_ignore_case(haystack, byte)
}

#[must_use]
pub fn find_with(backend: Backend, haystack: &[u8], needle: &[u8]) -> Option<usize> {
    search(backend, haystack, needle, 0, needle.len().saturating_sub(1), false)
}

#[must_use]
pub fn find_ignore_case_with(backend: Backend, haystack: &[u8], needle: &[u8]) -> Option<usize> {
    search(backend, haystack, needle, 0, needle.len().saturating_sub(1), true)
}

#[cfg_attr(not(target_arch = "x86_64"), allow(unused_variables))]
fn search(
    backend: Backend,
    haystack: &[u8],
    needle: &[u8],
    first: usize,
    second: usize,
    fold: bool,
) -> Option<usize> {
    match needle {
        [] => return Some(0),
        _ if needle.len() > haystack.len() => return None,
        [byte] if fold => return find_byte_ignore_case_with(backend, haystack, *byte),
        [byte] => return find_byte_with(backend, haystack, *byte),
        _ => {}
    }

    #[cfg(target_arch = "x86_64")]
    if backend.effective() == Backend::Avx2 {
        return avx2::find_anchored(haystack, needle, first, second, fold);
    }
    scalar::find(haystack, needle, fold)
}

/// Reusable single-needle searcher
///
/// Owns the needle and the filter settings. The two anchors are the needle
/// offsets whose bytes are compared in the vector filter; picking rare bytes
/// cuts down on candidate verification.
///
/// ```
/// use simdstr::search::Finder;
///
/// let finder = Finder::new("na").ignore_case(true);
/// assert_eq!(finder.find(b"BaNaNa"), Some(2));
/// assert_eq!(finder.find_iter(b"BaNaNa").collect::<Vec<_>>(), vec![2, 4]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finder {
    needle: Vec<u8>,
    first: usize,
    second: usize,
    ignore_case: bool,
    backend: Backend,
}

impl Finder {
    /// Searcher for `needle`, anchored on its first and last byte
    pub fn new(needle: impl AsRef<[u8]>) -> Self {
        let needle = needle.as_ref().to_vec();
        let second = needle.len().saturating_sub(1);
        Self {
            needle,
            first: 0,
            second,
            ignore_case: false,
            backend: Backend::detect(),
        }
    }

    /// Compare ASCII letters without regard to case
    #[must_use]
    pub const fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Force a backend (it still falls back to scalar on CPUs without it)
    #[must_use]
    pub const fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Use the needle bytes at `first` and `second` as the vector filter.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::AnchorOutOfRange`] if either offset is not inside
    /// the needle.
    pub fn anchors(mut self, first: usize, second: usize) -> Result<Self, SearchError> {
        let len = self.needle.len();
        if let Some(offset) = [first, second].into_iter().find(|&o| o >= len) {
            return Err(SearchError::AnchorOutOfRange { offset, len });
        }
        self.first = first;
        self.second = second;
        Ok(self)
    }

    #[must_use]
    pub fn needle(&self) -> &[u8] {
        &self.needle
    }

    /// Anchor offsets used by the vector filter
    #[must_use]
    pub const fn anchor_offsets(&self) -> (usize, usize) {
        (self.first, self.second)
    }

    /// Position of the first occurrence in `haystack`
    #[must_use]
    pub fn find(&self, haystack: &[u8]) -> Option<usize> {
        search(
            self.backend,
            haystack,
            &self.needle,
            self.first,
            self.second,
            self.ignore_case,
        )
    }

    /// Start positions of all non-overlapping occurrences, left to right
    pub fn find_iter<'a>(&'a self, haystack: &'a [u8]) -> FindIter<'a> {
        FindIter {
            finder: self,
            haystack,
            pos: 0,
        }
    }

    /// Number of non-overlapping occurrences
    #[must_use]
    pub fn count(&self, haystack: &[u8]) -> usize {
        self.find_iter(haystack).count()
    }
}

/// Iterator returned by [`Finder::find_iter`]
#[derive(Debug, Clone)]
pub struct FindIter<'a> {
    finder: &'a Finder,
    haystack: &'a [u8],
    pos: usize,
}

impl Iterator for FindIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let rest = self.haystack.get(self.pos..)?;
        let Some(offset) = self.finder.find(rest) else {
            self.pos = self.haystack.len() + 1;
            return None;
        };
        let start = self.pos + offset;
        self.pos = start + self.finder.needle.len().max(1);
        Some(start)
    }
}
