//! Locating and running toolchain programs

use super::types::{BuildError, BuildStep};
use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Command;

/// Find `name` on `PATH`.
///
/// A name containing a path separator is checked as given.
#[must_use]
pub fn find_program(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find `name` in the directories of a `PATH`-style list
#[must_use]
pub fn find_program_in(name: &str, search_path: &OsStr) -> Option<PathBuf> {
    let cwd = env::current_dir().ok()?;
    which::which_in(name, Some(search_path), cwd).ok()
}

/// First of `explicit`, `from_env` and `defaults` that resolves to a program
#[must_use]
pub fn resolve_tool(
    explicit: Option<&str>,
    from_env: Option<&str>,
    defaults: &[&str],
) -> Option<PathBuf> {
    if let Some(name) = explicit {
        return find_program(name);
    }
    if let Some(name) = from_env {
        return find_program(name);
    }
    defaults.iter().find_map(|name| find_program(name))
}

/// Run one toolchain step, appending its stdout and stderr to `log`.
///
/// A non-zero exit is a [`BuildError::StepFailed`] carrying everything
/// captured so far.
pub(crate) fn run_step(
    cmd: &mut Command,
    name: &str,
    step: BuildStep,
    log: &mut String,
) -> Result<(), BuildError> {
    crate::debug::debug_command(cmd);

    let output = cmd.output().map_err(|source| BuildError::Spawn {
        program: cmd.get_program().to_string_lossy().into_owned(),
        source,
    })?;

    log.push_str(&String::from_utf8_lossy(&output.stdout));
    log.push_str(&String::from_utf8_lossy(&output.stderr));

    if output.status.success() {
        Ok(())
    } else {
        Err(BuildError::StepFailed {
            name: name.to_string(),
            step,
            code: output.status.code(),
            output: log.clone(),
        })
    }
}
