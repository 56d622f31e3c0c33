//! Project manifest (`simdstr.toml`)
//!
//! Package metadata, build defaults and the extensions to build. Relative
//! paths are resolved against the directory holding the manifest.
//!
//! ```toml
//! [package]
//! name = "simd_strings"
//! version = "0.0.1"
//!
//! [build]
//! build_temp = "build/temp"
//!
//! [[extension]]
//! name = "simd_strings"
//! source_dir = "../.."
//! ```

use crate::extensions::{BuildProfile, BuildStrategy, ExtensionDescriptor};
use crate::paths;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading a manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse manifest {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("manifest {} declares no extensions", .path.display())]
    NoExtensions { path: PathBuf },

    #[error("extension `{name}` is declared twice")]
    DuplicateExtension { name: String },

    #[error("no extension named `{name}` (available: {available})")]
    UnknownExtension { name: String, available: String },
}

/// `[package]` table
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PackageMetadata {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// `[build]` table, every key optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildSection {
    pub build_temp: Option<PathBuf>,
    pub build_lib: Option<PathBuf>,
    pub interpreter: Option<String>,
    pub ext_suffix: Option<String>,
    pub rpath: Vec<String>,
    pub origin_rpath: Option<bool>,
    pub profile: Option<BuildProfile>,
    pub jobs: Option<usize>,
}

/// One `[[extension]]` entry
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ExtensionEntry {
    pub name: String,
    #[serde(default)]
    pub source_dir: Option<PathBuf>,
    #[serde(default)]
    pub strategy: BuildStrategy,
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub defines: Vec<String>,
    #[serde(default)]
    pub libraries: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    package: PackageMetadata,
    #[serde(default)]
    build: BuildSection,
    #[serde(default, rename = "extension")]
    extensions: Vec<ExtensionEntry>,
}

/// Parsed manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub package: PackageMetadata,
    pub build: BuildSection,
    pub extensions: Vec<ExtensionEntry>,
    /// Directory relative paths resolve against
    pub root: PathBuf,
}

impl Manifest {
    /// Read and validate the manifest at `path`
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| paths::absolute(Path::new(".")), paths::absolute);
        let manifest = Self::parse(&content, path, root)?;
        crate::debug!(
            "manifest {}: {} extension(s)",
            path.display(),
            manifest.extensions.len()
        );
        Ok(manifest)
    }

    /// Parse manifest text; `path` is only used in errors
    pub fn parse(content: &str, path: &Path, root: PathBuf) -> Result<Self, ManifestError> {
        let raw: RawManifest = toml::from_str(content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;

        if raw.extensions.is_empty() {
            return Err(ManifestError::NoExtensions {
                path: path.to_path_buf(),
            });
        }
        let mut seen = HashSet::new();
        if let Some(dup) = raw.extensions.iter().find(|e| !seen.insert(e.name.as_str())) {
            return Err(ManifestError::DuplicateExtension {
                name: dup.name.clone(),
            });
        }

        Ok(Self {
            package: raw.package,
            build: raw.build,
            extensions: raw.extensions,
            root,
        })
    }

    /// Resolve a manifest-relative path
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        paths::resolve_relative(&self.root, path)
    }

    /// Descriptor for every declared extension, in declaration order
    #[must_use]
    pub fn descriptors(&self) -> Vec<ExtensionDescriptor> {
        self.extensions.iter().map(|e| self.descriptor(e)).collect()
    }

    /// Descriptors for `names`, or all of them when `names` is empty
    pub fn select(&self, names: &[String]) -> Result<Vec<ExtensionDescriptor>, ManifestError> {
        if names.is_empty() {
            return Ok(self.descriptors());
        }
        names
            .iter()
            .map(|name| {
                self.extensions
                    .iter()
                    .find(|e| &e.name == name)
                    .map(|e| self.descriptor(e))
                    .ok_or_else(|| ManifestError::UnknownExtension {
                        name: name.clone(),
                        available: self
                            .extensions
                            .iter()
                            .map(|e| e.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            })
            .collect()
    }

    fn descriptor(&self, entry: &ExtensionEntry) -> ExtensionDescriptor {
        let source_dir = entry
            .source_dir
            .as_deref()
            .map_or_else(|| self.root.clone(), |dir| self.resolve(dir));
        ExtensionDescriptor {
            name: entry.name.clone(),
            source_dir: paths::absolute(&source_dir),
            strategy: entry.strategy,
            sources: entry.sources.clone(),
            include_dirs: entry.include_dirs.clone(),
            defines: entry.defines.clone(),
            libraries: entry.libraries.clone(),
        }
    }
}
