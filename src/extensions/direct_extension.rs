//! Direct C extension building
//!
//! Compiles each listed source with the C compiler and links the objects into
//! the extension's shared library, no project file involved:
//! ```bash
//! cc -c -fPIC -O3 -Iinclude src/simd_strings.c -o build/temp/simd_string/simd_strings.o
//! cc -shared build/temp/simd_string/simd_strings.o -o build/lib/simd_string.so
//! ```

use super::toolchain::run_step;
use super::types::{BuildConfig, BuildError, BuildStep, ExtensionDescriptor};
use crate::{paths, platform};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Direct compile-and-link builder
#[derive(Debug)]
pub struct DirectExtensionBuilder<'a> {
    config: &'a BuildConfig,
}

impl<'a> DirectExtensionBuilder<'a> {
    #[must_use]
    pub const fn new(config: &'a BuildConfig) -> Self {
        Self { config }
    }

    /// Object directory for `ext` inside `build_temp`
    #[must_use]
    pub fn object_dir(&self, ext: &ExtensionDescriptor) -> PathBuf {
        self.config.build_temp.join(&ext.name)
    }

    /// Object file for the `index`-th source
    fn object_path(&self, ext: &ExtensionDescriptor, index: usize, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map_or_else(|| format!("source{index}"), |s| s.to_string_lossy().into_owned());
        self.object_dir(ext).join(format!("{index}-{stem}.o"))
    }

    /// Arguments compiling `source` into `object`
    #[must_use]
    pub fn compile_args(
        &self,
        ext: &ExtensionDescriptor,
        source: &Path,
        object: &Path,
    ) -> Vec<String> {
        let mut args = vec!["-c".to_string()];
        if !cfg!(windows) {
            args.push("-fPIC".to_string());
        }
        args.extend(self.config.profile.cflags().iter().map(ToString::to_string));
        args.extend(ext.include_dirs.iter().map(|dir| {
            format!(
                "-I{}",
                paths::resolve_relative(&ext.source_dir, dir).display()
            )
        }));
        args.extend(ext.defines.iter().map(|define| format!("-D{define}")));
        if let Some(cflags) = &self.config.flags.cflags {
            args.extend(cflags.split_whitespace().map(str::to_string));
        }
        args.push(paths::resolve_relative(&ext.source_dir, source).display().to_string());
        args.push("-o".to_string());
        args.push(object.display().to_string());
        args
    }

    /// Arguments linking `objects` into `artifact`
    #[must_use]
    pub fn link_args(
        &self,
        ext: &ExtensionDescriptor,
        objects: &[PathBuf],
        artifact: &Path,
    ) -> Vec<String> {
        let mut args = vec!["-shared".to_string()];
        args.extend(objects.iter().map(|o| o.display().to_string()));
        args.push("-o".to_string());
        args.push(artifact.display().to_string());
        if platform::supports_rpath() {
            args.extend(
                self.config
                    .rpath_entries()
                    .iter()
                    .map(|entry| format!("-Wl,-rpath,{entry}")),
            );
        }
        args.extend(ext.libraries.iter().map(|lib| format!("-l{lib}")));
        if let Some(ldflags) = &self.config.flags.ldflags {
            args.extend(ldflags.split_whitespace().map(str::to_string));
        }
        args
    }

    /// Compile and link `ext` into `artifact`, returning the captured output
    pub fn build(&self, ext: &ExtensionDescriptor, artifact: &Path) -> Result<String, BuildError> {
        let compiler = self
            .config
            .compiler
            .as_deref()
            .ok_or_else(|| BuildError::ToolNotFound {
                tool: "C compiler",
                name: ext.name.clone(),
            })?;
        if ext.sources.is_empty() {
            return Err(BuildError::NoSources {
                name: ext.name.clone(),
            });
        }

        let object_dir = self.object_dir(ext);
        fs::create_dir_all(&object_dir).map_err(|source| BuildError::Io {
            path: object_dir.clone(),
            source,
        })?;

        let mut output = String::new();
        let mut objects = Vec::with_capacity(ext.sources.len());
        for (index, source) in ext.sources.iter().enumerate() {
            let object = self.object_path(ext, index, source);
            if self.config.verbose {
                println!("  Compiling {}", source.display());
            }
            let mut cmd = Command::new(compiler);
            cmd.args(self.compile_args(ext, source, &object))
                .current_dir(&self.config.build_temp);
            run_step(&mut cmd, &ext.name, BuildStep::Compile, &mut output)?;
            objects.push(object);
        }

        if self.config.verbose {
            println!("  Linking {}", artifact.display());
        }
        let mut cmd = Command::new(compiler);
        cmd.args(self.link_args(ext, &objects, artifact))
            .current_dir(&self.config.build_temp);
        run_step(&mut cmd, &ext.name, BuildStep::Link, &mut output)?;

        Ok(output)
    }
}
