//! Command implementations

pub(crate) mod bench;
pub(crate) mod build;
pub(crate) mod completion;
pub(crate) mod features;
pub(crate) mod find;
pub(crate) mod multi;

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read};

/// Contents of `file`, or all of stdin when no file is given
pub(crate) fn read_input(file: Option<&str>) -> Result<Vec<u8>> {
    if let Some(path) = file {
        return fs::read(path).with_context(|| format!("Failed to read {path}"));
    }

    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read stdin")?;
    Ok(buffer)
}
