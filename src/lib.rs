//! simdstr internal library code
//!
//! SIMD substring and multi-pattern search, plus the driver that builds the
//! native extension modules wrapping it.

pub mod bench;
pub mod config;
pub mod cpu;
pub mod debug;
pub mod env_vars;
pub mod extensions;
pub mod manifest;
pub mod paths;
pub mod platform;
pub mod search;
pub mod teddy;

// Re-export common types for convenience
pub use bench::{BenchResult, Stats};
pub use config::Config;
pub use cpu::{Backend, CpuFeatures};
pub use debug::{debug_log, init_debug, is_debug_enabled};
pub use extensions::{
    BuildConfig, BuildDriver, BuildError, BuildProfile, BuildResult, BuildStrategy,
    ExtensionDescriptor, ToolchainFlags,
};
pub use manifest::{Manifest, ManifestError, PackageMetadata};
pub use paths::{extension_path, find_manifest, find_manifest_in};
pub use platform::{default_ext_suffix, detect_current_platform, detect_ext_suffix};
pub use search::{
    Finder, SearchError, find, find_byte, find_byte_ignore_case, find_ignore_case,
};
pub use teddy::{Flavor, Match, Teddy, TeddyError, TeddyOptions};
