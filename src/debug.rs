//! Debug logging
//!
//! A single process-wide switch, set once from `--debug` or `SIMDSTR_DEBUG`.
//! Disabled logging costs one atomic load per call site.

use std::sync::OnceLock;

static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Enable or disable debug output for the rest of the process.
///
/// Only the first call has an effect.
pub fn init_debug(enabled: bool) {
    let _ = DEBUG_ENABLED.set(enabled || crate::env_vars::debug());
}

/// Whether debug output is enabled
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.get().copied().unwrap_or(false)
}

/// Print a debug message if debug mode is enabled
pub fn debug_log(message: &str) {
    if is_debug_enabled() {
        eprintln!("[DEBUG] {message}");
    }
}

/// Print a debug line describing a subprocess invocation
pub fn debug_command(cmd: &std::process::Command) {
    if !is_debug_enabled() {
        return;
    }
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let cwd = cmd
        .get_current_dir()
        .map_or_else(|| ".".to_string(), |d| d.display().to_string());
    eprintln!(
        "[DEBUG] exec (cwd {cwd}): {} {}",
        cmd.get_program().to_string_lossy(),
        args.join(" ")
    );
}

/// `debug!("built {} in {:?}", name, elapsed)`
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        if $crate::debug::is_debug_enabled() {
            eprintln!("[DEBUG] {}", format_args!($($arg)*));
        }
    };
}
