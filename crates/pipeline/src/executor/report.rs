//! Report generation: synthesize a random dataset and summarize it.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::OsRng;
use rand::TryRngCore;

use fluxengine_core::error::CoreError;
use fluxengine_core::payload::JobPayload;
use fluxengine_core::statistics::{self, StatisticsResult};

use super::TaskExecutor;

/// Upper bound on synthesized data points; larger requests are clamped.
pub const MAX_DATA_POINTS: usize = 10_000_000;

/// Values are drawn uniformly from `[0, VALUE_CEILING)`.
const VALUE_CEILING: u32 = 1_000;

/// Raw draws at or above this are rejected so `% VALUE_CEILING` stays uniform.
const REJECTION_ZONE: u32 = u32::MAX - (u32::MAX % VALUE_CEILING);

/// Clamp a requested data point count into `[0, MAX_DATA_POINTS]`.
pub fn effective_data_points(requested: i64) -> usize {
    usize::try_from(requested.max(0))
        .unwrap_or(MAX_DATA_POINTS)
        .min(MAX_DATA_POINTS)
}

/// Synthesize `count` values from `rng`.
///
/// A draw the source fails to produce is replaced by a coarse time-derived
/// value; the dataset is always complete.
pub fn synthesize_dataset<R: TryRngCore>(rng: &mut R, count: usize) -> Vec<f64> {
    let mut fallbacks = 0usize;
    let data: Vec<f64> = (0..count)
        .map(|_| {
            draw(&mut *rng).unwrap_or_else(|| {
                fallbacks += 1;
                time_derived_value()
            })
        })
        .collect();

    if fallbacks > 0 {
        tracing::warn!(
            fallbacks,
            count,
            "Entropy source failed for some draws, used time-derived values",
        );
    }
    data
}

/// Generate `data_points` values from the OS entropy source and summarize them.
pub fn generate_report(data_points: i64) -> StatisticsResult {
    let count = effective_data_points(data_points);
    tracing::debug!(count, "Generating random values for statistical analysis");
    let dataset = synthesize_dataset(&mut OsRng, count);

    tracing::debug!(count, "Computing statistics");
    statistics::compute(&dataset)
}

fn draw<R: TryRngCore>(rng: &mut R) -> Option<f64> {
    loop {
        match rng.try_next_u32() {
            Ok(raw) if raw < REJECTION_ZONE => return Some(f64::from(raw % VALUE_CEILING)),
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
}

fn time_derived_value() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |elapsed| {
            (elapsed.as_nanos() % u128::from(VALUE_CEILING)) as f64
        })
}

/// Executor for `report_generation` jobs.
///
/// An empty dataset (zero data points requested) fails the job with
/// [`CoreError::EmptyDataset`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportExecutor;

impl TaskExecutor for ReportExecutor {
    fn execute(&self, payload: &JobPayload) -> Result<serde_json::Value, CoreError> {
        let JobPayload::ReportGeneration(input) = payload else {
            return Err(super::mismatched(payload));
        };
        let stats = generate_report(input.data_points);
        if stats.is_empty_dataset() {
            return Err(CoreError::EmptyDataset);
        }
        serde_json::to_value(stats).map_err(|e| CoreError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use fluxengine_core::payload::{PasswordHashPayload, ReportPayload, DEFAULT_DATA_POINTS};

    use super::*;

    /// Entropy source that never produces a value.
    struct BrokenRng;

    impl TryRngCore for BrokenRng {
        type Error = std::io::Error;

        fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
            Err(std::io::Error::other("entropy unavailable"))
        }

        fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
            Err(std::io::Error::other("entropy unavailable"))
        }

        fn try_fill_bytes(&mut self, _dst: &mut [u8]) -> Result<(), Self::Error> {
            Err(std::io::Error::other("entropy unavailable"))
        }
    }

    #[test]
    fn data_points_are_clamped() {
        assert_eq!(effective_data_points(DEFAULT_DATA_POINTS), 1_000_000);
        assert_eq!(effective_data_points(50_000_000), MAX_DATA_POINTS);
        assert_eq!(effective_data_points(i64::MAX), MAX_DATA_POINTS);
        assert_eq!(effective_data_points(-5), 0);
    }

    #[test]
    fn dataset_values_are_in_range() {
        let data = synthesize_dataset(&mut OsRng, 10_000);
        assert_eq!(data.len(), 10_000);
        assert!(data.iter().all(|v| (0.0..1000.0).contains(v) && v.fract() == 0.0));
    }

    #[test]
    fn broken_entropy_falls_back_per_draw() {
        let data = synthesize_dataset(&mut BrokenRng, 100);
        assert_eq!(data.len(), 100);
        assert!(data.iter().all(|v| (0.0..1000.0).contains(v)));
    }

    #[test]
    fn report_summarizes_requested_points() {
        let stats = generate_report(2_000);
        let summary = stats.summary().expect("non-empty dataset");
        assert_eq!(summary.count, 2_000);
        assert!(summary.min >= 0.0 && summary.max < 1000.0);
        assert!(summary.p25 <= summary.median && summary.median <= summary.p75);
    }

    #[test]
    fn zero_points_fail_with_empty_dataset() {
        let payload = JobPayload::ReportGeneration(ReportPayload { data_points: 0 });
        assert_matches!(ReportExecutor.execute(&payload), Err(CoreError::EmptyDataset));
    }

    #[test]
    fn executor_returns_statistics_payload() {
        let payload = JobPayload::ReportGeneration(ReportPayload { data_points: 500 });
        let result = ReportExecutor.execute(&payload).unwrap();
        assert_eq!(result["count"], 500);
        assert!(result.get("p99").is_some());
    }

    #[test]
    fn executor_rejects_other_payloads() {
        let payload = JobPayload::PasswordHash(PasswordHashPayload {
            password: "x".into(),
            cost: None,
        });
        assert_matches!(
            ReportExecutor.execute(&payload),
            Err(CoreError::UnknownJobType(_))
        );
    }
}
