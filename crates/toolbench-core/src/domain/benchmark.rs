//! Benchmark result models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::error::HarnessError;
use crate::threshold;

/// Family of a benchmarked operation; selects its status thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum OperationFamily {
    Lint,
    Format,
    TypeCheck,
    Configure,
    Build,
    IncrementalBuild,
    Test,
    Install,
}

impl OperationFamily {
    pub const ALL: [OperationFamily; 8] = [
        OperationFamily::Lint,
        OperationFamily::Format,
        OperationFamily::TypeCheck,
        OperationFamily::Configure,
        OperationFamily::Build,
        OperationFamily::IncrementalBuild,
        OperationFamily::Test,
        OperationFamily::Install,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lint => "lint",
            Self::Format => "format",
            Self::TypeCheck => "type_check",
            Self::Configure => "configure",
            Self::Build => "build",
            Self::IncrementalBuild => "incremental_build",
            Self::Test => "test",
            Self::Install => "install",
        }
    }
}

/// Status label derived from the threshold table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BenchmarkStatus {
    Fast,
    Good,
    Slow,
}

impl fmt::Display for BenchmarkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fast => "Fast",
            Self::Good => "Good",
            Self::Slow => "Slow",
        };
        f.write_str(s)
    }
}

/// One timed invocation of an operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSample {
    /// Wall-clock duration in seconds.
    pub duration_secs: f64,

    /// Whether the operation itself succeeded.
    pub success: bool,

    /// Exit code of the failing step, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl RunSample {
    pub fn ok(duration_secs: f64) -> Self {
        Self {
            duration_secs,
            success: true,
            exit_code: None,
        }
    }

    pub fn failed(duration_secs: f64, exit_code: Option<i32>) -> Self {
        Self {
            duration_secs,
            success: false,
            exit_code,
        }
    }
}

/// Aggregated timings for one operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkMetric {
    pub operation_name: String,
    pub family: OperationFamily,
    pub runs: Vec<RunSample>,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub std_dev: f64,
    pub failed_runs: usize,
    pub status: BenchmarkStatus,
}

impl BenchmarkMetric {
    /// Aggregate collected samples. Failed runs are included in every
    /// statistic and counted in `failed_runs`.
    pub fn from_samples(
        operation_name: impl Into<String>,
        family: OperationFamily,
        runs: Vec<RunSample>,
    ) -> Self {
        let durations: Vec<f64> = runs.iter().map(|r| r.duration_secs).collect();
        let average = mean(&durations);
        let min = durations.iter().copied().fold(f64::INFINITY, f64::min);
        let max = durations.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let failed_runs = runs.iter().filter(|r| !r.success).count();

        Self {
            operation_name: operation_name.into(),
            family,
            average,
            min: if durations.is_empty() { 0.0 } else { min },
            max: if durations.is_empty() { 0.0 } else { max },
            median: median(&durations),
            std_dev: sample_std_dev(&durations, average),
            failed_runs,
            status: threshold::classify(family, average),
            runs,
        }
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_runs > 0
    }

    pub fn durations(&self) -> impl Iterator<Item = f64> + '_ {
        self.runs.iter().map(|r| r.duration_secs)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation; two or fewer samples report 0.
fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() <= 2 {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Kind of project being benchmarked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Cpp,
    Python,
    Unknown,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpp => "cpp",
            Self::Python => "python",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for ProjectType {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpp" | "c++" | "cxx" => Ok(Self::Cpp),
            "python" | "py" => Ok(Self::Python),
            "unknown" => Ok(Self::Unknown),
            other => Err(HarnessError::UnknownProjectType(other.to_string())),
        }
    }
}

/// Identity of the benchmarked project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectInfo {
    pub name: String,
    pub project_type: ProjectType,
    pub path: PathBuf,
}

/// All metrics collected by one benchmark invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub project: ProjectInfo,
    pub run_count: usize,
    pub metrics: Vec<BenchmarkMetric>,
}

impl BenchmarkReport {
    pub fn new(project: ProjectInfo, run_count: usize, metrics: Vec<BenchmarkMetric>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            project,
            run_count,
            metrics,
        }
    }

    pub fn metric(&self, operation_name: &str) -> Option<&BenchmarkMetric> {
        self.metrics
            .iter()
            .find(|m| m.operation_name == operation_name)
    }
}
