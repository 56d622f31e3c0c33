//! `CMake` extension building
//!
//! Configures the extension's source directory in the shared build directory
//! and builds it there, with the library output directory pointed at the
//! extension's place under `build_lib`:
//! ```bash
//! cd build/temp
//! cmake /path/to/src -DCMAKE_LIBRARY_OUTPUT_DIRECTORY=/path/to/build/lib \
//!     -DPYTHON_EXECUTABLE=/usr/bin/python3 -DCMAKE_BUILD_TYPE=Release
//! cmake --build . --config Release
//! ```

use super::toolchain::run_step;
use super::types::{BuildConfig, BuildError, BuildStep, ExtensionDescriptor};
use std::path::Path;
use std::process::Command;

/// `CMake` extension builder
#[derive(Debug)]
pub struct CMakeExtensionBuilder<'a> {
    config: &'a BuildConfig,
}

impl<'a> CMakeExtensionBuilder<'a> {
    #[must_use]
    pub const fn new(config: &'a BuildConfig) -> Self {
        Self { config }
    }

    /// Arguments of the configure step
    #[must_use]
    pub fn configure_args(&self, ext: &ExtensionDescriptor, outdir: &Path) -> Vec<String> {
        let config = self.config;
        let mut args = vec![
            ext.source_dir.display().to_string(),
            format!("-DCMAKE_LIBRARY_OUTPUT_DIRECTORY={}", outdir.display()),
        ];
        if let Some(interpreter) = &config.interpreter {
            args.push(format!("-DPYTHON_EXECUTABLE={}", interpreter.display()));
        }
        args.push(format!(
            "-DCMAKE_BUILD_TYPE={}",
            config.profile.cmake_name()
        ));

        let rpath = config.rpath_entries();
        if !rpath.is_empty() {
            args.push("-DCMAKE_BUILD_WITH_INSTALL_RPATH=ON".to_string());
            args.push(format!("-DCMAKE_INSTALL_RPATH={}", rpath.join(";")));
        }

        // CMake respects both CMAKE_* cache entries and the standard compiler variables
        let flags = &config.flags;
        if let Some(cc) = &flags.cc {
            args.push(format!("-DCMAKE_C_COMPILER={cc}"));
        }
        if let Some(cxx) = &flags.cxx {
            args.push(format!("-DCMAKE_CXX_COMPILER={cxx}"));
        }
        if let Some(cflags) = &flags.cflags {
            args.push(format!("-DCMAKE_C_FLAGS={cflags}"));
        }
        if let Some(cxxflags) = &flags.cxxflags {
            args.push(format!("-DCMAKE_CXX_FLAGS={cxxflags}"));
        }
        if let Some(ldflags) = &flags.ldflags {
            args.push(format!("-DCMAKE_SHARED_LINKER_FLAGS={ldflags}"));
            args.push(format!("-DCMAKE_MODULE_LINKER_FLAGS={ldflags}"));
        }

        args.extend(ext.defines.iter().map(|define| format!("-D{define}")));
        args
    }

    /// Arguments of the build step
    #[must_use]
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "--build".to_string(),
            ".".to_string(),
            "--config".to_string(),
            self.config.profile.cmake_name().to_string(),
        ];
        if let Some(jobs) = self.config.jobs {
            args.push("--parallel".to_string());
            args.push(jobs.to_string());
        }
        args
    }

    /// Configure and build `ext`, returning the captured toolchain output.
    ///
    /// A failed configure step stops here; the build step is never run.
    pub fn build(&self, ext: &ExtensionDescriptor, outdir: &Path) -> Result<String, BuildError> {
        let cmake = self
            .config
            .cmake
            .as_deref()
            .ok_or_else(|| BuildError::ToolNotFound {
                tool: "cmake",
                name: ext.name.clone(),
            })?;
        let mut output = String::new();

        if self.config.verbose {
            println!("Configuring {} in {}", ext.name, self.config.build_temp.display());
        }

        let mut configure = Command::new(cmake);
        configure
            .args(self.configure_args(ext, outdir))
            .current_dir(&self.config.build_temp);
        self.forward_env(&mut configure);
        run_step(&mut configure, &ext.name, BuildStep::Configure, &mut output)?;

        if self.config.verbose {
            println!("Building {}", ext.name);
        }

        let mut build = Command::new(cmake);
        build
            .args(self.build_args())
            .current_dir(&self.config.build_temp);
        self.forward_env(&mut build);
        run_step(&mut build, &ext.name, BuildStep::Build, &mut output)?;

        Ok(output)
    }

    fn forward_env(&self, cmd: &mut Command) {
        let flags = &self.config.flags;
        for (var, value) in [
            ("CC", &flags.cc),
            ("CXX", &flags.cxx),
            ("CFLAGS", &flags.cflags),
            ("CXXFLAGS", &flags.cxxflags),
            ("LDFLAGS", &flags.ldflags),
        ] {
            if let Some(value) = value {
                cmd.env(var, value);
            }
        }
    }
}
