#![cfg(unix)]

mod common;

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

use common::get_simdstr_binary;
use common::helpers::{create_cmake_project, create_test_manifest, write_fake_cc, write_fake_cmake};

/// `simdstr --norc build ...` in `dir` with the caller's toolchain variables cleared
fn run_build(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(get_simdstr_binary());
    cmd.current_dir(dir).args(["--norc", "build"]).args(args);
    for var in [
        "CMAKE",
        "CC",
        "CXX",
        "CFLAGS",
        "CXXFLAGS",
        "LDFLAGS",
        "SIMDSTR_MANIFEST",
        "SIMDSTR_BUILD_TEMP",
        "CMAKE_BUILD_PARALLEL_LEVEL",
    ] {
        cmd.env_remove(var);
    }
    cmd.envs(envs.iter().copied());
    cmd.output().expect("Failed to execute simdstr build")
}

fn read_log(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}

// ============================================================================
// CMake strategy
// ============================================================================

#[test]
fn builds_cmake_project_into_build_lib() {
    let temp = TempDir::new().unwrap();
    create_test_manifest(&temp, "demo", "");
    create_cmake_project(&temp, "demo");
    let log = temp.path().join("cmake.log");
    let cmake = write_fake_cmake(temp.path(), &log);

    let output = run_build(temp.path(), &["--cmake", cmake.to_str().unwrap()], &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "build should succeed. stderr: {stderr}");
    assert!(temp.path().join("build/lib/demo.so").is_file());
    assert!(temp.path().join("build/temp").is_dir());
    assert!(stdout.contains("Built demo"));
    assert!(stdout.contains("Built 1 extension(s)"));

    let log = read_log(&log);
    let mut lines = log.lines();
    let configure = lines.next().unwrap();
    assert!(configure.contains(&format!(
        "-DCMAKE_LIBRARY_OUTPUT_DIRECTORY={}",
        temp.path().join("build/lib").display()
    )));
    assert!(configure.contains("-DCMAKE_BUILD_TYPE=Release"));
    assert!(lines.next().unwrap().starts_with("--build . --config Release"));
}

#[test]
fn missing_toolchain_fails_without_artifact() {
    let temp = TempDir::new().unwrap();
    create_test_manifest(&temp, "demo", "");
    create_cmake_project(&temp, "demo");
    let empty_path = temp.path().join("empty-bin");
    fs::create_dir_all(&empty_path).unwrap();

    let output = run_build(temp.path(), &[], &[("PATH", empty_path.to_str().unwrap())]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("cmake not found"), "stderr: {stderr}");
    assert!(!temp.path().join("build/lib/demo.so").exists());
}

#[test]
fn reuses_existing_build_temp() {
    let temp = TempDir::new().unwrap();
    create_test_manifest(&temp, "demo", "");
    create_cmake_project(&temp, "demo");
    let cmake = write_fake_cmake(temp.path(), &temp.path().join("cmake.log"));
    fs::create_dir_all(temp.path().join("build/temp")).unwrap();
    fs::write(temp.path().join("build/temp/CMakeCache.txt"), "cached").unwrap();

    let output = run_build(temp.path(), &["--cmake", cmake.to_str().unwrap()], &[]);

    assert!(output.status.success());
    assert!(temp.path().join("build/temp/CMakeCache.txt").is_file());
    assert!(temp.path().join("build/lib/demo.so").is_file());
}

#[test]
fn missing_project_file_skips_build_step() {
    let temp = TempDir::new().unwrap();
    create_test_manifest(&temp, "demo", "");
    fs::create_dir_all(temp.path().join("src")).unwrap();
    let log = temp.path().join("cmake.log");
    let cmake = write_fake_cmake(temp.path(), &log);

    let output = run_build(temp.path(), &["--cmake", cmake.to_str().unwrap()], &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("configure step for `demo` failed"), "stderr: {stderr}");
    assert!(stderr.contains("CMakeLists.txt"));
    let log = read_log(&log);
    assert_eq!(log.lines().count(), 1, "only configure should run: {log}");
    assert!(!log.contains("--build"));
    assert!(!temp.path().join("build/lib/demo.so").exists());
}

#[test]
#[cfg(target_os = "linux")]
fn rpath_entries_reach_configure() {
    let temp = TempDir::new().unwrap();
    create_test_manifest(&temp, "demo", "rpath = [\"/opt/lib\"]");
    create_cmake_project(&temp, "demo");
    let log = temp.path().join("cmake.log");
    let cmake = write_fake_cmake(temp.path(), &log);

    let output = run_build(
        temp.path(),
        &[
            "--cmake",
            cmake.to_str().unwrap(),
            "--origin-rpath",
            "--rpath",
            "/usr/local/lib",
            "-j",
            "2",
        ],
        &[],
    );

    assert!(output.status.success());
    let log = read_log(&log);
    assert!(log.contains("-DCMAKE_BUILD_WITH_INSTALL_RPATH=ON"));
    assert!(log.contains("-DCMAKE_INSTALL_RPATH=$ORIGIN;/opt/lib;/usr/local/lib"));
    assert!(log.contains("--parallel 2"));
}

#[test]
fn json_report() {
    let temp = TempDir::new().unwrap();
    create_test_manifest(&temp, "demo", "");
    create_cmake_project(&temp, "demo");
    let cmake = write_fake_cmake(temp.path(), &temp.path().join("cmake.log"));

    let output = run_build(
        temp.path(),
        &["--json", "--cmake", cmake.to_str().unwrap()],
        &[],
    );
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report.get("package").and_then(|v| v.as_str()), Some("demo"));
    let extensions = report.get("extensions").and_then(|v| v.as_array()).unwrap();
    assert_eq!(extensions.len(), 1);
    let artifact = extensions
        .first()
        .and_then(|e| e.get("artifact"))
        .and_then(|v| v.as_str())
        .unwrap();
    assert!(artifact.ends_with("build/lib/demo.so"));
}

#[test]
fn build_dirs_from_command_line() {
    let temp = TempDir::new().unwrap();
    create_test_manifest(&temp, "demo", "");
    create_cmake_project(&temp, "demo");
    let cmake = write_fake_cmake(temp.path(), &temp.path().join("cmake.log"));
    let out = temp.path().join("out");
    let scratch = temp.path().join("scratch");

    let output = run_build(
        temp.path(),
        &[
            "--cmake",
            cmake.to_str().unwrap(),
            "--build-lib",
            out.to_str().unwrap(),
            "--build-temp",
            scratch.to_str().unwrap(),
        ],
        &[],
    );

    assert!(output.status.success());
    assert!(out.join("demo.so").is_file());
    assert!(scratch.join(".outdir").is_file());
    assert!(!temp.path().join("build").exists());
}

// ============================================================================
// Direct strategy
// ============================================================================

#[test]
fn direct_strategy_compiles_and_links() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("fast.c"), "int fast(void) { return 1; }\n").unwrap();
    fs::write(
        temp.path().join("simdstr.toml"),
        r#"
[package]
name = "fast"

[build]
ext_suffix = ".so"
rpath = ["/opt/lib"]

[[extension]]
name = "pkg.fast"
source_dir = "src"
strategy = "direct"
sources = ["fast.c"]
defines = ["NDEBUG"]
libraries = ["m"]
"#,
    )
    .unwrap();
    let log = temp.path().join("cc.log");
    let cc = write_fake_cc(temp.path(), &log);

    let output = run_build(temp.path(), &[], &[("CC", cc.to_str().unwrap())]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "stderr: {stderr}");
    assert!(temp.path().join("build/lib/pkg/fast.so").is_file());

    let log = read_log(&log);
    let mut lines = log.lines();
    let compile = lines.next().unwrap();
    assert!(compile.starts_with("-c"));
    assert!(compile.contains("-DNDEBUG"));
    assert!(compile.contains(&src.join("fast.c").display().to_string()));
    let link = lines.next().unwrap();
    assert!(link.starts_with("-shared"));
    assert!(link.contains("-Wl,-rpath,/opt/lib"));
    assert!(link.contains("-lm"));
}

// ============================================================================
// Manifest handling
// ============================================================================

#[test]
fn unknown_extension_lists_available() {
    let temp = TempDir::new().unwrap();
    create_test_manifest(&temp, "demo", "");

    let output = run_build(temp.path(), &["nope"], &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("no extension named `nope` (available: demo)"));
}

#[test]
fn missing_manifest_is_reported() {
    let temp = TempDir::new().unwrap();

    let output = run_build(temp.path(), &["--manifest", "missing.toml"], &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("failed to read manifest missing.toml"));
}

#[test]
fn manifest_from_environment() {
    let temp = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let manifest = create_test_manifest(&project, "demo", "");
    create_cmake_project(&project, "demo");
    let cmake = write_fake_cmake(temp.path(), &temp.path().join("cmake.log"));

    let output = run_build(
        temp.path(),
        &["--cmake", cmake.to_str().unwrap()],
        &[("SIMDSTR_MANIFEST", manifest.to_str().unwrap())],
    );

    assert!(output.status.success());
    assert!(project.path().join("build/lib/demo.so").is_file());
}
