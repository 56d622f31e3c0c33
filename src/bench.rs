//! Micro-benchmark runner and summary statistics

use std::hint::black_box;
use std::time::Instant;

/// Summary of a set of timings, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub mean: f64,
    /// Population standard deviation
    pub stddev: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl Stats {
    /// Summarize `samples`, `None` when there are none
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let (&min, &max) = (sorted.first()?, sorted.last()?);

        let count = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / count;
        let variance = sorted.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / count;

        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            f64::midpoint(*sorted.get(mid - 1)?, *sorted.get(mid)?)
        } else {
            *sorted.get(mid)?
        };

        Some(Self {
            mean,
            stddev: variance.sqrt(),
            median,
            min,
            max,
        })
    }
}

/// Outcome of timing one search routine
#[derive(Debug, Clone, PartialEq)]
pub struct BenchResult {
    pub name: String,
    pub iterations: usize,
    /// First position the routine reported, if any
    pub position: Option<usize>,
    pub stats: Option<Stats>,
}

/// Time `iterations` calls of `f`.
///
/// The position returned by the first call that found something is kept so
/// callers can check that every routine agrees.
pub fn run<F>(name: &str, iterations: usize, mut f: F) -> BenchResult
where
    F: FnMut() -> Option<usize>,
{
    let mut times = Vec::with_capacity(iterations);
    let mut position = None;
    for _ in 0..iterations {
        let start = Instant::now();
        let result = black_box(f());
        times.push(start.elapsed().as_secs_f64());
        if position.is_none() {
            position = result;
        }
    }
    crate::debug!("bench {name}: {iterations} iterations");
    BenchResult {
        name: name.to_string(),
        iterations,
        position,
        stats: Stats::from_samples(&times),
    }
}
