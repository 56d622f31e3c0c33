//! Platform detection
//!
//! Names the current platform ("x86_64-linux", "arm64-darwin") and answers the
//! questions the build driver has about it: which suffix an extension module
//! gets and how a library refers to its own directory in an RPATH.

use std::env;
use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;

/// Cached platform detection (computed once, reused throughout execution)
static CURRENT_PLATFORM: LazyLock<String> = LazyLock::new(detect_platform_impl);

/// Detect the current platform as `<arch>-<os>`
#[must_use]
pub fn detect_current_platform() -> String {
    CURRENT_PLATFORM.clone()
}

fn detect_platform_impl() -> String {
    let arch = match env::consts::ARCH {
        "aarch64" => "arm64",
        other => other,
    };

    let os = match env::consts::OS {
        "macos" => "darwin",
        other => other,
    };

    format!("{arch}-{os}")
}

/// Extension module suffix when the interpreter can't be asked
#[must_use]
pub const fn default_ext_suffix() -> &'static str {
    if cfg!(windows) { ".pyd" } else { ".so" }
}

/// RPATH token for "the directory holding this library", if the platform has one
#[must_use]
pub const fn origin_token() -> Option<&'static str> {
    if cfg!(target_os = "macos") {
        Some("@loader_path")
    } else if cfg!(windows) {
        None
    } else {
        Some("$ORIGIN")
    }
}

/// Whether the linker understands `-Wl,-rpath`
#[must_use]
pub const fn supports_rpath() -> bool {
    !cfg!(windows)
}

/// Ask `interpreter` for the suffix it expects on extension modules
/// (e.g. ".cpython-312-x86_64-linux-gnu.so").
#[must_use]
pub fn detect_ext_suffix(interpreter: &Path) -> Option<String> {
    let output = Command::new(interpreter)
        .args([
            "-c",
            "import sysconfig; print(sysconfig.get_config_var('EXT_SUFFIX') or '')",
        ])
        .output()
        .ok()?;

    output.status.success().then_some(())?;

    let suffix = String::from_utf8(output.stdout).ok()?.trim().to_string();

    suffix.starts_with('.').then_some(suffix)
}
