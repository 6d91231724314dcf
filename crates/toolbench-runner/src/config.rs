//! Harness-wide settings assembled by the CLI and passed down explicitly.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use toolbench_core::ReportFormat;

use crate::cicd::DEFAULT_RUN_LIMIT;
use crate::platform::Platform;

pub const DEFAULT_RUNS: usize = 3;

/// Settings shared by every harness command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarnessConfig {
    /// Timed runs per benchmarked operation.
    pub runs: usize,
    /// Per-subprocess timeout in seconds (0 = wait indefinitely).
    pub timeout_secs: u64,
    pub format: ReportFormat,
    /// Where `--save` writes rendered reports.
    pub output_dir: PathBuf,
    /// Workflow runs sampled for CI-system metrics.
    pub cicd_limit: usize,
    /// Directories searched for prerequisite tools such as `gh`; `None`
    /// searches `PATH`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_dirs: Option<Vec<PathBuf>>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            runs: DEFAULT_RUNS,
            timeout_secs: 0,
            format: ReportFormat::Table,
            output_dir: PathBuf::from("."),
            cicd_limit: DEFAULT_RUN_LIMIT,
            tool_dirs: None,
        }
    }
}

impl HarnessConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn platform(&self) -> &'static Platform {
        Platform::current()
    }
}
