//! Statistics engine for report generation jobs.
//!
//! [`compute`] is a pure function: the same input sequence always yields
//! the same result, and the caller's slice is never reordered.

use serde::Serialize;

/// Marker carried by the result of an empty dataset.
pub const EMPTY_DATASET_MARKER: &str = "empty dataset";

/// Aggregate measures over one dataset snapshot.
///
/// Variance and standard deviation are population measures (divisor `n`).
/// Median for even `n` is the mean of the two middle values; percentiles use
/// nearest-rank selection at `floor(p * n / 100)` on the sorted copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub variance: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub p25: f64,
    pub p75: f64,
    pub p95: f64,
    pub p99: f64,
    pub range: f64,
}

/// Outcome of [`compute`]: a summary, or the empty-dataset marker alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatisticsResult {
    Computed(Summary),
    Empty { error: &'static str },
}

impl StatisticsResult {
    /// Callers must check this before reading any measure.
    pub fn is_empty_dataset(&self) -> bool {
        matches!(self, StatisticsResult::Empty { .. })
    }

    pub fn summary(&self) -> Option<&Summary> {
        match self {
            StatisticsResult::Computed(summary) => Some(summary),
            StatisticsResult::Empty { .. } => None,
        }
    }
}

/// Compute aggregate statistics over `data`.
pub fn compute(data: &[f64]) -> StatisticsResult {
    let n = data.len();
    if n == 0 {
        return StatisticsResult::Empty {
            error: EMPTY_DATASET_MARKER,
        };
    }
    let count = n as f64;

    let sum: f64 = data.iter().sum();
    let mean = sum / count;

    let variance = data
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / count;
    let std_dev = variance.sqrt();

    let (min, max) = data
        .iter()
        .fold((data[0], data[0]), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };

    StatisticsResult::Computed(Summary {
        count: n,
        sum,
        mean,
        std_dev,
        variance,
        min,
        max,
        median,
        p25: nearest_rank(&sorted, 25),
        p75: nearest_rank(&sorted, 75),
        p95: nearest_rank(&sorted, 95),
        p99: nearest_rank(&sorted, 99),
        range: max - min,
    })
}

/// Select the element at `floor(p * n / 100)` of an already sorted slice.
///
/// `p` must be below 100 and `sorted` non-empty.
fn nearest_rank(sorted: &[f64], p: usize) -> f64 {
    sorted[p * sorted.len() / 100]
}
