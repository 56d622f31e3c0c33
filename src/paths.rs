//! Path utilities for manifest lookup and extension output paths.

use crate::env_vars;
use std::path::{Path, PathBuf};

/// Manifest file name looked up in the working directory
pub const MANIFEST_FILE: &str = "simdstr.toml";

/// Find the manifest for the current directory.
/// Priority: `SIMDSTR_MANIFEST` env var -> nearest simdstr.toml from the
/// working directory up
#[must_use]
pub fn find_manifest() -> PathBuf {
    if let Some(manifest) = env_vars::manifest() {
        return PathBuf::from(manifest);
    }

    find_manifest_in(absolute(Path::new(".")))
}

/// Find the manifest in `dir` or its nearest ancestor that has one.
/// Defaults to `dir/simdstr.toml` if no ancestor does.
#[must_use]
pub fn find_manifest_in(dir: impl AsRef<Path>) -> PathBuf {
    let dir = dir.as_ref();

    dir.ancestors()
        .map(|ancestor| ancestor.join(MANIFEST_FILE))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| dir.join(MANIFEST_FILE))
}

/// Resolve `path` against `base` unless it is already absolute.
#[must_use]
pub fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// `path` made absolute against the working directory, kept as is if that
/// fails. `..` components are not resolved.
#[must_use]
pub fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Where a module named `name` lands under `build_lib`.
///
/// Dots in the name become directories and `suffix` is appended to the last
/// component: `pkg.fast` with ".so" gives `build_lib/pkg/fast.so`.
#[must_use]
pub fn extension_path(build_lib: &Path, name: &str, suffix: &str) -> PathBuf {
    let mut components: Vec<&str> = name.split('.').filter(|c| !c.is_empty()).collect();
    let file = components.pop().unwrap_or(name);

    let mut path = build_lib.to_path_buf();
    path.extend(components);
    path.push(format!("{file}{suffix}"));
    path
}
