//! Bench command
//!
//! Time the naive, scalar and AVX2 searches against one file

use anyhow::{Context, Result, bail};
use simdstr::bench::{self, BenchResult};
use simdstr::{Backend, Finder};
use std::fs;

const HEADERS: [&str; 7] = [
    "backend",
    "mean (us)",
    "median (us)",
    "stddev (us)",
    "min (us)",
    "max (us)",
    "position",
];

/// Run every available backend `iterations` times and print a table
pub(crate) fn run(needle: &str, file: &str, iterations: usize, ignore_case: bool) -> Result<()> {
    if iterations == 0 {
        bail!("--iterations must be at least 1");
    }
    let haystack = fs::read(file).with_context(|| format!("Failed to read {file}"))?;
    let results = compare(needle.as_bytes(), &haystack, iterations, ignore_case);

    check_agreement(&results)?;

    println!(
        "{} bytes, needle {needle:?}{}, {iterations} iterations",
        haystack.len(),
        if ignore_case { " (ignore case)" } else { "" }
    );
    println!();
    let [backend, mean, median, stddev, min, max, position] = HEADERS;
    println!(
        "{backend:<8} {mean:>12} {median:>12} {stddev:>12} {min:>12} {max:>12} {position:>10}"
    );
    for result in &results {
        println!("{}", format_row(result));
    }

    Ok(())
}

/// Time each backend that can run here
pub(crate) fn compare(
    needle: &[u8],
    haystack: &[u8],
    iterations: usize,
    ignore_case: bool,
) -> Vec<BenchResult> {
    let mut results = vec![bench::run("naive", iterations, || {
        naive_find(haystack, needle, ignore_case)
    })];

    let mut backends = vec![Backend::Scalar];
    if Backend::Avx2.effective() == Backend::Avx2 {
        backends.push(Backend::Avx2);
    } else {
        simdstr::debug!("avx2 unavailable, skipping its benchmark");
    }

    for backend in backends {
        let finder = Finder::new(needle)
            .ignore_case(ignore_case)
            .backend(backend);
        results.push(bench::run(backend.as_str(), iterations, || {
            finder.find(haystack)
        }));
    }
    results
}

/// Sliding-window reference search
pub(crate) fn naive_find(haystack: &[u8], needle: &[u8], ignore_case: bool) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|window| {
        if ignore_case {
            window.eq_ignore_ascii_case(needle)
        } else {
            window == needle
        }
    })
}

fn check_agreement(results: &[BenchResult]) -> Result<()> {
    let Some(reference) = results.first() else {
        return Ok(());
    };
    if let Some(other) = results.iter().find(|r| r.position != reference.position) {
        bail!(
            "{} found {} but {} found {}",
            other.name,
            super::find::position(other.position),
            reference.name,
            super::find::position(reference.position)
        );
    }
    Ok(())
}

fn format_row(result: &BenchResult) -> String {
    let position = super::find::position(result.position);
    result.stats.map_or_else(
        || format!("{:<8} {:>12} {position:>10}", result.name, "-"),
        |stats| {
            let us = |secs: f64| secs * 1e6;
            format!(
                "{:<8} {:>12.3} {:>12.3} {:>12.3} {:>12.3} {:>12.3} {position:>10}",
                result.name,
                us(stats.mean),
                us(stats.median),
                us(stats.stddev),
                us(stats.min),
                us(stats.max),
            )
        },
    )
}
