//! Locating a built extension
//!
//! The direct strategy writes the library exactly where asked. `CMake`
//! projects pick their own file name (and multi-config generators add a
//! `Release/` or `Debug/` directory), so the output directory is searched
//! for a shared library named after the extension, with or without the
//! platform's `lib` prefix.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions a loadable module can carry
const LIBRARY_EXTENSIONS: [&str; 5] = ["so", "pyd", "dylib", "dll", "bundle"];

/// Prefix `CMake` gives shared and module libraries on Unix
const LIBRARY_PREFIX: &str = "lib";

/// Find the library for extension `stem`.
///
/// `expected` wins when it exists. Otherwise the first shared library under
/// `outdir` (sorted by path) whose file name is `stem` or `lib<stem>`
/// followed by a dot.
#[must_use]
pub fn locate(expected: &Path, outdir: &Path, stem: &str) -> Option<PathBuf> {
    if expected.is_file() {
        return Some(expected.to_path_buf());
    }

    WalkDir::new(outdir)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .find(|path| is_library_for(path, stem))
}

/// Whether `path` looks like the shared library of extension `stem`
#[must_use]
pub fn is_library_for(path: &Path, stem: &str) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let Some(rest) = file_name.strip_prefix(stem).or_else(|| {
        file_name
            .strip_prefix(LIBRARY_PREFIX)
            .and_then(|name| name.strip_prefix(stem))
    }) else {
        return false;
    };
    let has_library_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| LIBRARY_EXTENSIONS.contains(&ext));

    rest.starts_with('.') && has_library_extension
}
