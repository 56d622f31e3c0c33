//! Environment variable handling.
//!
//! Only the CLI layer reads these. The build driver receives resolved values
//! through [`crate::extensions::BuildConfig`].

use std::env;

/// Interpret a boolean environment value ("1", "true", "yes", case-insensitive).
pub fn parse_flag(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value == "1" || value == "true" || value == "yes"
}

/// Parse a positive job count; zero and garbage are ignored.
pub fn parse_jobs(value: &str) -> Option<usize> {
    value.trim().parse().ok().filter(|jobs: &usize| *jobs > 0)
}

fn is_enabled(var: &str) -> bool {
    env::var(var).ok().is_some_and(|s| parse_flag(&s))
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|s| !s.trim().is_empty())
}

// Toolchain

/// Explicit `CMake` executable (`CMAKE`).
pub fn cmake() -> Option<String> {
    non_empty("CMAKE")
}

/// C compiler (`CC`).
pub fn cc() -> Option<String> {
    non_empty("CC")
}

/// C++ compiler (`CXX`).
pub fn cxx() -> Option<String> {
    non_empty("CXX")
}

/// C compiler flags (`CFLAGS`).
pub fn cflags() -> Option<String> {
    non_empty("CFLAGS")
}

/// C++ compiler flags (`CXXFLAGS`).
pub fn cxxflags() -> Option<String> {
    non_empty("CXXFLAGS")
}

/// Linker flags (`LDFLAGS`).
pub fn ldflags() -> Option<String> {
    non_empty("LDFLAGS")
}

/// Host interpreter (`PYTHON`).
pub fn python() -> Option<String> {
    non_empty("PYTHON")
}

/// Parallel build level understood by `cmake --build` (`CMAKE_BUILD_PARALLEL_LEVEL`).
pub fn build_parallel_level() -> Option<usize> {
    env::var("CMAKE_BUILD_PARALLEL_LEVEL")
        .ok()
        .and_then(|s| parse_jobs(&s))
}

// simdstr settings

/// Manifest path override (`SIMDSTR_MANIFEST`).
pub fn manifest() -> Option<String> {
    non_empty("SIMDSTR_MANIFEST")
}

/// Temporary build directory override (`SIMDSTR_BUILD_TEMP`).
pub fn build_temp() -> Option<String> {
    non_empty("SIMDSTR_BUILD_TEMP")
}

/// Disable SIMD kernels (`SIMDSTR_FORCE_SCALAR`).
pub fn force_scalar() -> bool {
    is_enabled("SIMDSTR_FORCE_SCALAR")
}

/// Enable debug output without `--debug` (`SIMDSTR_DEBUG`).
pub fn debug() -> bool {
    is_enabled("SIMDSTR_DEBUG")
}
