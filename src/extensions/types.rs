//! Extension build types
//!
//! An extension is a native module compiled from C sources into a shared
//! library the host interpreter can import. These types describe what to
//! build, how, and what came out.

use crate::{paths, platform};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// How an extension is compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStrategy {
    /// Configure and build a `CMakeLists.txt` project
    #[default]
    #[serde(alias = "CMake")]
    CMake,
    /// Compile listed sources and link them with the C compiler
    Direct,
}

impl BuildStrategy {
    /// Get a human-readable description
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::CMake => "CMake extension",
            Self::Direct => "C extension",
        }
    }
}

/// Declares one native module to build
///
/// The descriptor performs no validation: a source directory without a
/// project file is only discovered when the toolchain runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDescriptor {
    /// Module name, dots allowed (`pkg.fast`)
    pub name: String,
    /// Absolute source directory
    pub source_dir: PathBuf,
    pub strategy: BuildStrategy,
    /// Direct strategy: sources relative to `source_dir`
    pub sources: Vec<PathBuf>,
    pub include_dirs: Vec<PathBuf>,
    /// Preprocessor definitions (`NAME` or `NAME=VALUE`)
    pub defines: Vec<String>,
    /// Libraries to link (`-l<name>`)
    pub libraries: Vec<String>,
}

impl ExtensionDescriptor {
    /// `CMake` extension for `source_dir`
    pub fn new(name: impl Into<String>, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source_dir: source_dir.into(),
            strategy: BuildStrategy::CMake,
            sources: Vec::new(),
            include_dirs: Vec::new(),
            defines: Vec::new(),
            libraries: Vec::new(),
        }
    }

    /// Direct-compiled extension built from `sources`
    pub fn direct(
        name: impl Into<String>,
        source_dir: impl Into<PathBuf>,
        sources: Vec<PathBuf>,
    ) -> Self {
        Self {
            strategy: BuildStrategy::Direct,
            sources,
            ..Self::new(name, source_dir)
        }
    }

    /// Last component of the dotted name
    #[must_use]
    pub fn stem(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// Build type passed to the toolchain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildProfile {
    #[default]
    Release,
    Debug,
}

impl BuildProfile {
    /// `CMAKE_BUILD_TYPE` / `--config` value
    #[must_use]
    pub const fn cmake_name(&self) -> &'static str {
        match self {
            Self::Release => "Release",
            Self::Debug => "Debug",
        }
    }

    /// Compiler flags for the direct strategy
    #[must_use]
    pub const fn cflags(&self) -> &'static [&'static str] {
        match self {
            Self::Release => &["-O3", "-DNDEBUG"],
            Self::Debug => &["-O0", "-g"],
        }
    }
}

/// Compiler settings forwarded to the toolchain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainFlags {
    pub cc: Option<String>,
    pub cxx: Option<String>,
    pub cflags: Option<String>,
    pub cxxflags: Option<String>,
    pub ldflags: Option<String>,
}

impl ToolchainFlags {
    /// Read `CC`, `CXX`, `CFLAGS`, `CXXFLAGS` and `LDFLAGS`
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            cc: crate::env_vars::cc(),
            cxx: crate::env_vars::cxx(),
            cflags: crate::env_vars::cflags(),
            cxxflags: crate::env_vars::cxxflags(),
            ldflags: crate::env_vars::ldflags(),
        }
    }
}

/// Everything the driver needs, resolved up front
///
/// The driver reads nothing from the environment or the working directory;
/// every path here is used as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub build_temp: PathBuf,
    pub build_lib: PathBuf,
    /// `CMake` executable, required by the `CMake` strategy
    pub cmake: Option<PathBuf>,
    /// C compiler, required by the direct strategy
    pub compiler: Option<PathBuf>,
    /// Passed to `CMake` as `PYTHON_EXECUTABLE` when known
    pub interpreter: Option<PathBuf>,
    pub ext_suffix: String,
    pub rpath: Vec<String>,
    /// Prepend the platform's "directory of this library" token to the RPATH
    pub origin_rpath: bool,
    pub profile: BuildProfile,
    pub jobs: Option<usize>,
    pub flags: ToolchainFlags,
    pub verbose: bool,
}

impl BuildConfig {
    /// Defaults for everything but the two output directories
    pub fn new(build_temp: impl Into<PathBuf>, build_lib: impl Into<PathBuf>) -> Self {
        Self {
            build_temp: build_temp.into(),
            build_lib: build_lib.into(),
            cmake: None,
            compiler: None,
            interpreter: None,
            ext_suffix: platform::default_ext_suffix().to_string(),
            rpath: Vec::new(),
            origin_rpath: false,
            profile: BuildProfile::default(),
            jobs: None,
            flags: ToolchainFlags::default(),
            verbose: false,
        }
    }

    /// Full output path of `ext`
    #[must_use]
    pub fn extension_path(&self, ext: &ExtensionDescriptor) -> PathBuf {
        paths::extension_path(&self.build_lib, &ext.name, &self.ext_suffix)
    }

    /// RPATH entries in link order
    #[must_use]
    pub fn rpath_entries(&self) -> Vec<String> {
        let origin = self
            .origin_rpath
            .then(platform::origin_token)
            .flatten()
            .map(str::to_string);
        origin.into_iter().chain(self.rpath.iter().cloned()).collect()
    }
}

/// External toolchain invocations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    Configure,
    Build,
    Compile,
    Link,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Configure => "configure",
            Self::Build => "build",
            Self::Compile => "compile",
            Self::Link => "link",
        })
    }
}

/// Errors from building an extension
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{tool} not found (needed to build `{name}`)")]
    ToolNotFound { tool: &'static str, name: String },

    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{step} step for `{name}` failed with {}{}", exit_code(.code), output_tail(.output))]
    StepFailed {
        name: String,
        step: BuildStep,
        code: Option<i32>,
        output: String,
    },

    #[error("failed to create {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no compiled library for `{name}` (expected {})", .expected.display())]
    ArtifactMissing { name: String, expected: PathBuf },

    #[error("`{name}` uses the direct strategy but lists no sources")]
    NoSources { name: String },
}

#[allow(clippy::ref_option, reason = "error format arguments are borrowed fields")]
fn exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "no exit code".to_string(), |c| format!("exit code {c}"))
}

fn output_tail(output: &str) -> String {
    let output = output.trim();
    if output.is_empty() {
        String::new()
    } else {
        format!("\n{output}")
    }
}

/// Result of building an extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    /// Extension name
    pub name: String,

    /// Where the shared library ended up
    pub artifact: PathBuf,

    /// Build duration
    pub duration: Duration,

    /// Build output (stdout + stderr)
    pub output: String,
}

impl BuildResult {
    #[must_use]
    pub const fn new(name: String, artifact: PathBuf, duration: Duration, output: String) -> Self {
        Self {
            name,
            artifact,
            duration,
            output,
        }
    }

    /// Whether the artifact sits in `dir`
    #[must_use]
    pub fn is_in(&self, dir: &Path) -> bool {
        self.artifact.starts_with(dir)
    }
}
