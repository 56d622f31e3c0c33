//! Multi command
//!
//! Teddy multi-pattern search over a file or stdin

use anyhow::{Context, Result};
use clap::ValueEnum;
use simdstr::{Backend, Flavor, Match, Teddy, TeddyOptions};

/// `--flavor` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum FlavorArg {
    Auto,
    Slim,
    Fat,
}

impl From<FlavorArg> for Flavor {
    fn from(arg: FlavorArg) -> Self {
        match arg {
            FlavorArg::Auto => Self::Auto,
            FlavorArg::Slim => Self::Slim,
            FlavorArg::Fat => Self::Fat,
        }
    }
}

/// Options for the multi command
#[derive(Debug, Clone, Copy)]
pub(crate) struct MultiOptions {
    pub(crate) flavor: FlavorArg,
    pub(crate) masks: Option<usize>,
    pub(crate) all: bool,
    pub(crate) scalar: bool,
}

/// Search `file` (or stdin) for `patterns` and print `start end pattern` lines
pub(crate) fn run(patterns: &[String], file: Option<&str>, options: &MultiOptions) -> Result<()> {
    let haystack = super::read_input(file)?;
    let teddy = build(patterns, options)?;
    for m in matches(&teddy, &haystack, options.all) {
        println!("{}", format_match(&teddy, &m));
    }
    Ok(())
}

fn build(patterns: &[String], options: &MultiOptions) -> Result<Teddy> {
    let teddy_options = TeddyOptions {
        flavor: options.flavor.into(),
        masks: options.masks,
        backend: if options.scalar {
            Backend::Scalar
        } else {
            Backend::detect()
        },
    };
    let teddy = Teddy::with_options(patterns, teddy_options).context("Invalid pattern set")?;
    simdstr::debug!(
        "teddy: {} patterns, {} flavor, {} masks",
        teddy.pattern_count(),
        teddy.flavor(),
        teddy.mask_count()
    );
    Ok(teddy)
}

fn matches(teddy: &Teddy, haystack: &[u8], all: bool) -> Vec<Match> {
    if all {
        teddy.find_iter(haystack).collect()
    } else {
        teddy.find(haystack).into_iter().collect()
    }
}

fn format_match(teddy: &Teddy, m: &Match) -> String {
    let pattern = teddy
        .pattern(m.pattern())
        .map(String::from_utf8_lossy)
        .unwrap_or_default();
    format!("{} {} {pattern}", m.start(), m.end())
}
