//! Extension build orchestration
//!
//! Prepares the build directories, hands each extension to the builder for its
//! strategy and checks that a library came out. The first failure ends the
//! run: nothing after it is built and nothing before it is rolled back.

use super::artifact;
use super::cmake_extension::CMakeExtensionBuilder;
use super::direct_extension::DirectExtensionBuilder;
use super::types::{BuildConfig, BuildError, BuildResult, BuildStrategy, ExtensionDescriptor};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/// Builds extensions with one resolved [`BuildConfig`]
#[derive(Debug, Clone)]
pub struct BuildDriver {
    config: BuildConfig,
}

impl BuildDriver {
    #[must_use]
    pub const fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build one extension
    ///
    /// Creates `build_temp` (an existing one is reused) and the extension's
    /// output directory, runs the toolchain and locates the library.
    pub fn build(&self, ext: &ExtensionDescriptor) -> Result<BuildResult, BuildError> {
        let start_time = Instant::now();

        if self.config.verbose {
            println!("Building {} for {}", ext.strategy.description(), ext.name);
            println!("  source_dir: {}", ext.source_dir.display());
        }

        create_dir(&self.config.build_temp)?;

        let expected = self.config.extension_path(ext);
        let outdir = expected
            .parent()
            .map_or_else(|| self.config.build_lib.clone(), Path::to_path_buf);
        create_dir(&outdir)?;

        crate::debug!(
            "{}: {} build, output {}",
            ext.name,
            ext.strategy.description(),
            expected.display()
        );

        let output = match ext.strategy {
            BuildStrategy::CMake => CMakeExtensionBuilder::new(&self.config).build(ext, &outdir)?,
            BuildStrategy::Direct => {
                DirectExtensionBuilder::new(&self.config).build(ext, &expected)?
            }
        };

        let artifact = artifact::locate(&expected, &outdir, ext.stem()).ok_or_else(|| {
            BuildError::ArtifactMissing {
                name: ext.name.clone(),
                expected: expected.clone(),
            }
        })?;

        if self.config.verbose {
            println!("  Built {}", artifact.display());
        }

        Ok(BuildResult::new(
            ext.name.clone(),
            artifact,
            start_time.elapsed(),
            output,
        ))
    }

    /// Build every extension in order, stopping at the first failure
    pub fn build_all(&self, exts: &[ExtensionDescriptor]) -> Result<Vec<BuildResult>, BuildError> {
        exts.iter().map(|ext| self.build(ext)).collect()
    }

    /// (`built_count`, `total_duration`)
    #[must_use]
    pub fn summarize(results: &[BuildResult]) -> (usize, Duration) {
        (results.len(), results.iter().map(|r| r.duration).sum())
    }
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests {
    use super::*;
    use crate::extensions::types::BuildStep;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// A cmake stand-in: configure needs CMakeLists.txt and remembers the
    /// output directory; `--build` writes `<outdir>/<name>.so`.
    #[cfg(unix)]
    const FAKE_CMAKE: &str = r#"
if [ "$1" = "--build" ]; then
    outdir=$(cat .outdir)
    name=$(cat .name)
    echo built > "$outdir/$name.so"
    exit 0
fi
if [ ! -f "$1/CMakeLists.txt" ]; then
    echo "CMake Error: The source directory does not appear to contain CMakeLists.txt" >&2
    exit 1
fi
for arg in "$@"; do
    case "$arg" in
        -DCMAKE_LIBRARY_OUTPUT_DIRECTORY=*) echo "${arg#*=}" > .outdir ;;
    esac
done
sed -n 's/^project(\([A-Za-z_]*\).*/\1/p' "$1/CMakeLists.txt" > .name
"#;

    #[cfg(unix)]
    fn cmake_fixture(with_project: bool) -> (TempDir, BuildConfig, ExtensionDescriptor) {
        cmake_fixture_with(with_project, FAKE_CMAKE)
    }

    #[cfg(unix)]
    fn cmake_fixture_with(
        with_project: bool,
        script: &str,
    ) -> (TempDir, BuildConfig, ExtensionDescriptor) {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        if with_project {
            fs::write(src.join("CMakeLists.txt"), "project(simd_strings C)\n").unwrap();
        }
        let cmake = write_script(temp.path(), "cmake", script);

        let mut config =
            BuildConfig::new(temp.path().join("build/temp"), temp.path().join("build/lib"));
        config.cmake = Some(cmake);
        config.ext_suffix = ".so".to_string();
        let ext = ExtensionDescriptor::new("simd_strings", src);
        (temp, config, ext)
    }

    #[test]
    #[cfg(unix)]
    fn cmake_build_produces_artifact() {
        let (temp, config, ext) = cmake_fixture(true);
        let driver = BuildDriver::new(config);

        let result = driver.build(&ext).unwrap();
        assert_eq!(result.name, "simd_strings");
        assert_eq!(
            result.artifact,
            temp.path().join("build/lib/simd_strings.so")
        );
        assert!(result.artifact.is_file());
        assert!(result.is_in(&temp.path().join("build/lib")));
    }

    #[test]
    #[cfg(unix)]
    fn cmake_default_lib_prefix_is_accepted() {
        let script = FAKE_CMAKE.replace("\"$outdir/$name.so\"", "\"$outdir/lib$name.so\"");
        let (temp, config, ext) = cmake_fixture_with(true, &script);

        let result = BuildDriver::new(config).build(&ext).unwrap();
        assert_eq!(
            result.artifact,
            temp.path().join("build/lib/libsimd_strings.so")
        );
        assert!(result.artifact.is_file());
    }

    #[test]
    #[cfg(unix)]
    fn existing_build_temp_is_reused() {
        let (temp, config, ext) = cmake_fixture(true);
        fs::create_dir_all(temp.path().join("build/temp")).unwrap();
        fs::write(temp.path().join("build/temp/stale"), "").unwrap();

        let driver = BuildDriver::new(config);
        driver.build(&ext).unwrap();
        assert!(temp.path().join("build/temp/stale").exists());
    }

    #[test]
    #[cfg(unix)]
    fn missing_project_file_stops_before_build_step() {
        let (temp, config, ext) = cmake_fixture(false);
        let driver = BuildDriver::new(config);

        let err = driver.build(&ext).unwrap_err();
        assert!(matches!(
            err,
            BuildError::StepFailed {
                step: BuildStep::Configure,
                ..
            }
        ));
        assert!(err.to_string().contains("CMakeLists.txt"));
        assert!(!temp.path().join("build/temp/.outdir").exists());
        assert!(!temp.path().join("build/lib/simd_strings.so").exists());
    }

    #[test]
    #[cfg(unix)]
    fn build_all_stops_at_first_failure() {
        let (temp, config, good) = cmake_fixture(true);
        let missing = ExtensionDescriptor::new("broken", temp.path().join("nowhere"));
        let driver = BuildDriver::new(config);

        let result = driver.build_all(&[missing, good]);
        assert!(result.is_err());
        assert!(!temp.path().join("build/lib/simd_strings.so").exists());
    }

    #[test]
    fn missing_toolchain_builds_nothing() {
        let temp = TempDir::new().unwrap();
        let config = BuildConfig::new(temp.path().join("temp"), temp.path().join("lib"));
        let ext = ExtensionDescriptor::new("simd_strings", temp.path());
        let err = BuildDriver::new(config).build(&ext).unwrap_err();

        assert!(matches!(err, BuildError::ToolNotFound { tool: "cmake", .. }));
        assert!(!temp.path().join("lib/simd_strings.so").exists());
    }

    #[test]
    #[cfg(unix)]
    fn dotted_names_get_package_directories() {
        let (temp, mut config, mut ext) = cmake_fixture(true);
        config.ext_suffix = ".so".to_string();
        ext.name = "pkg.simd_strings".to_string();

        let result = BuildDriver::new(config).build(&ext).unwrap();
        assert_eq!(
            result.artifact,
            temp.path().join("build/lib/pkg/simd_strings.so")
        );
    }

    #[test]
    fn summarize_results() {
        let results = vec![
            BuildResult::new(
                "a".to_string(),
                PathBuf::from("a.so"),
                Duration::from_secs(1),
                String::new(),
            ),
            BuildResult::new(
                "b".to_string(),
                PathBuf::from("b.so"),
                Duration::from_secs(2),
                String::new(),
            ),
        ];
        assert_eq!(
            BuildDriver::summarize(&results),
            (2, Duration::from_secs(3))
        );
        assert_eq!(BuildDriver::summarize(&[]), (0, Duration::ZERO));
    }
}
