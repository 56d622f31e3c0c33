//! Shared test helpers and utilities

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get the path to the simdstr binary built for this test run
///
/// This is shared across all integration tests to avoid duplication.
pub(crate) fn get_simdstr_binary() -> String {
    env!("CARGO_BIN_EXE_simdstr").to_string()
}

/// Write `simdstr.toml` with one `CMake` extension named `name` whose sources
/// live in `src/`, plus any extra `[build]` keys
///
/// # Returns
/// The path to the created manifest
#[allow(dead_code)]
pub(crate) fn create_test_manifest(temp_dir: &TempDir, name: &str, build: &str) -> PathBuf {
    let manifest_path = temp_dir.path().join("simdstr.toml");
    let content = format!(
        "[package]\nname = \"{name}\"\nversion = \"0.0.1\"\n\n[build]\next_suffix = \".so\"\n{build}\n\n[[extension]]\nname = \"{name}\"\nsource_dir = \"src\"\n"
    );
    fs::write(&manifest_path, content).expect("Failed to write manifest");
    manifest_path
}

/// Create `src/CMakeLists.txt` declaring project `name`
#[allow(dead_code)]
pub(crate) fn create_cmake_project(temp_dir: &TempDir, name: &str) -> PathBuf {
    let src = temp_dir.path().join("src");
    fs::create_dir_all(&src).expect("Failed to create src");
    fs::write(
        src.join("CMakeLists.txt"),
        format!("cmake_minimum_required(VERSION 3.10)\nproject({name} C)\n"),
    )
    .expect("Failed to write CMakeLists.txt");
    src
}

/// Write an executable shell script
#[cfg(unix)]
#[allow(dead_code)]
pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make script executable");
    path
}

/// A `cmake` stand-in that appends its arguments to `log`
///
/// Configure fails without `CMakeLists.txt` and remembers the library output
/// directory; `--build` writes `<outdir>/<project>.so`.
#[cfg(unix)]
#[allow(dead_code)]
pub(crate) fn write_fake_cmake(dir: &Path, log: &Path) -> PathBuf {
    let body = format!(
        r#"echo "$@" >> "{log}"
if [ "$1" = "--build" ]; then
    outdir=$(cat .outdir)
    name=$(cat .name)
    echo built > "$outdir/$name.so"
    exit 0
fi
if [ ! -f "$1/CMakeLists.txt" ]; then
    echo "CMake Error: The source directory \"$1\" does not appear to contain CMakeLists.txt." >&2
    exit 1
fi
for arg in "$@"; do
    case "$arg" in
        -DCMAKE_LIBRARY_OUTPUT_DIRECTORY=*) echo "${{arg#*=}}" > .outdir ;;
    esac
done
sed -n 's/^project(\([A-Za-z_]*\).*/\1/p' "$1/CMakeLists.txt" > .name"#,
        log = log.display()
    );
    write_script(dir, "cmake", &body)
}

/// A C compiler stand-in that appends its arguments to `log` and writes
/// whatever `-o` names
#[cfg(unix)]
#[allow(dead_code)]
pub(crate) fn write_fake_cc(dir: &Path, log: &Path) -> PathBuf {
    let body = format!(
        r#"echo "$@" >> "{log}"
out=""
prev=""
for arg in "$@"; do
    if [ "$prev" = "-o" ]; then out="$arg"; fi
    prev="$arg"
done
echo compiled > "$out""#,
        log = log.display()
    );
    write_script(dir, "cc", &body)
}
