//! Find command
//!
//! Single-needle search over a file or stdin

use anyhow::{Context, Result};
use simdstr::{Backend, Finder};

/// Options for the find command
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FindOptions {
    pub(crate) ignore_case: bool,
    pub(crate) all: bool,
    pub(crate) count: bool,
    pub(crate) scalar: bool,
    pub(crate) anchors: Option<(usize, usize)>,
}

/// Search `file` (or stdin) for `needle` and print the result
pub(crate) fn run(needle: &str, file: Option<&str>, options: &FindOptions) -> Result<()> {
    let haystack = super::read_input(file)?;
    for line in search(needle.as_bytes(), &haystack, options)? {
        println!("{line}");
    }
    Ok(())
}

/// Output lines for one search
///
/// The first position (or -1), every position with `all`, or the number of
/// occurrences with `count`.
pub(crate) fn search(needle: &[u8], haystack: &[u8], options: &FindOptions) -> Result<Vec<String>> {
    let finder = build_finder(needle, options)?;
    simdstr::debug!(
        "find {} bytes in {} bytes (backend {}, anchors {:?})",
        needle.len(),
        haystack.len(),
        if options.scalar { Backend::Scalar } else { Backend::detect() },
        finder.anchor_offsets()
    );

    if options.count {
        return Ok(vec![finder.count(haystack).to_string()]);
    }
    if options.all {
        return Ok(finder
            .find_iter(haystack)
            .map(|pos| pos.to_string())
            .collect());
    }
    Ok(vec![position(finder.find(haystack))])
}

fn build_finder(needle: &[u8], options: &FindOptions) -> Result<Finder> {
    let mut finder = Finder::new(needle).ignore_case(options.ignore_case);
    if options.scalar {
        finder = finder.backend(Backend::Scalar);
    }
    if let Some((first, second)) = options.anchors {
        finder = finder
            .anchors(first, second)
            .context("Invalid --anchors")?;
    }
    Ok(finder)
}

/// Position as printed to the host-language side: the index, or -1
pub(crate) fn position(found: Option<usize>) -> String {
    found.map_or_else(|| "-1".to_string(), |pos| pos.to_string())
}
