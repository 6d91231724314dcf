//! CI-system metrics pulled from GitHub Actions via the `gh` CLI.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolbench_core::snapshot::CICD_SECTION;
use toolbench_core::{HarnessError, Result};

use crate::exec::{argv, run_captured, CommandSpec};

pub const DEFAULT_RUN_LIMIT: usize = 20;

/// One workflow run as reported by `gh run list --json`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkflowRun {
    pub status: String,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl WorkflowRun {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }

    pub fn succeeded(&self) -> bool {
        self.conclusion.as_deref() == Some("success")
    }

    pub fn duration_secs(&self) -> f64 {
        (self.updated_at - self.created_at).num_milliseconds().max(0) as f64 / 1000.0
    }
}

/// Aggregate over completed workflow runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CicdSummary {
    pub runs_sampled: usize,
    pub successful_runs: usize,
    /// Percentage in `0..=100`.
    pub success_rate: f64,
    pub average_duration_seconds: f64,
}

impl CicdSummary {
    /// Summarise completed runs; queued and in-progress runs are ignored.
    pub fn from_runs(runs: &[WorkflowRun]) -> Self {
        let completed: Vec<&WorkflowRun> = runs.iter().filter(|r| r.is_completed()).collect();
        if completed.is_empty() {
            return Self::default();
        }
        let n = completed.len();
        let successful = completed.iter().filter(|r| r.succeeded()).count();
        let total_secs: f64 = completed.iter().map(|r| r.duration_secs()).sum();
        Self {
            runs_sampled: n,
            successful_runs: successful,
            success_rate: successful as f64 / n as f64 * 100.0,
            average_duration_seconds: total_secs / n as f64,
        }
    }

    /// The summary as a snapshot overlay: `{"cicd": {...}}`.
    pub fn to_document(&self) -> Result<Value> {
        let mut doc = serde_json::Map::new();
        doc.insert(CICD_SECTION.to_string(), serde_json::to_value(self)?);
        Ok(Value::Object(doc))
    }
}

pub fn parse_run_list(json: &str) -> Result<Vec<WorkflowRun>> {
    serde_json::from_str(json).map_err(|e| HarnessError::CicdCollection(e.to_string()))
}

/// Query the last `limit` workflow runs of the repository at `project_dir`.
///
/// Callers check `gh` is installed first; a non-zero exit here (not a
/// repository, not authenticated) is a collection error.
pub async fn collect(
    project_dir: &Path,
    limit: usize,
    timeout: Option<Duration>,
) -> Result<CicdSummary> {
    let limit = limit.to_string();
    let spec = CommandSpec::new(argv([
        "gh",
        "run",
        "list",
        "--limit",
        limit.as_str(),
        "--json",
        "status,conclusion,createdAt,updatedAt",
    ]))
    .in_dir(project_dir)
    .with_timeout(timeout);

    let out = run_captured(&spec)
        .await
        .map_err(|e| HarnessError::CicdCollection(e.to_string()))?;
    if !out.success() {
        return Err(HarnessError::CicdCollection(format!(
            "gh exited with {}: {}",
            out.exit_code,
            out.output.trim()
        )));
    }

    let runs = parse_run_list(&out.output)?;
    tracing::info!(fetched = runs.len(), "Collected workflow runs");
    Ok(CicdSummary::from_runs(&runs))
}
