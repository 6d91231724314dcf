//! Baseline comparison between two metrics snapshots.
//!
//! Durations and failure counts are lower-is-better; the keys in
//! [`HIGHER_IS_BETTER`] are the exception. Snapshots are assumed to come
//! from the same machine; nothing is normalised.

use serde::{Deserialize, Serialize};

use crate::snapshot::MetricsSnapshot;

/// Whether the current value beat the baseline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Improvement,
    Regression,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improvement => "improvement",
            Self::Regression => "regression",
        }
    }
}

/// Change of one metric key relative to the baseline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaselineComparison {
    pub metric_key: String,
    pub baseline_value: f64,
    pub current_value: f64,
    pub percent_change: f64,
    pub direction: Direction,
}

/// Keys present in only one of the two snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricChanges {
    /// Present in the current snapshot only.
    pub added: Vec<String>,
    /// Present in the baseline only.
    pub removed: Vec<String>,
}

impl MetricChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Metric keys where a larger value is the better one.
pub const HIGHER_IS_BETTER: [&str; 1] = ["cicd.success_rate"];

pub fn higher_is_better(metric_key: &str) -> bool {
    HIGHER_IS_BETTER.contains(&metric_key)
}

/// `(baseline - current) / baseline * 100`; positive means current is lower.
pub fn percent_change(baseline: f64, current: f64) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }
    (baseline - current) / baseline * 100.0
}

/// Percent change signed so that positive is always an improvement.
pub fn improvement_percent(metric_key: &str, baseline: f64, current: f64) -> f64 {
    if higher_is_better(metric_key) {
        if baseline == 0.0 {
            return 0.0;
        }
        (current - baseline) / baseline * 100.0
    } else {
        percent_change(baseline, current)
    }
}

// Unchanged values count as an improvement (percent change 0).
fn direction_of(metric_key: &str, baseline: f64, current: f64) -> Direction {
    let improved = if higher_is_better(metric_key) {
        current >= baseline
    } else {
        current <= baseline
    };
    if improved {
        Direction::Improvement
    } else {
        Direction::Regression
    }
}

/// Compare every key present in both snapshots, in key order.
pub fn compare(current: &MetricsSnapshot, baseline: &MetricsSnapshot) -> Vec<BaselineComparison> {
    current
        .metrics
        .iter()
        .filter_map(|(key, &current_value)| {
            let baseline_value = *baseline.metrics.get(key)?;
            Some(BaselineComparison {
                metric_key: key.clone(),
                baseline_value,
                current_value,
                percent_change: improvement_percent(key, baseline_value, current_value),
                direction: direction_of(key, baseline_value, current_value),
            })
        })
        .collect()
}

/// Keys that [`compare`] leaves out because only one side has them.
pub fn metric_changes(current: &MetricsSnapshot, baseline: &MetricsSnapshot) -> MetricChanges {
    MetricChanges {
        added: current
            .metrics
            .keys()
            .filter(|k| !baseline.metrics.contains_key(*k))
            .cloned()
            .collect(),
        removed: baseline
            .metrics
            .keys()
            .filter(|k| !current.metrics.contains_key(*k))
            .cloned()
            .collect(),
    }
}
