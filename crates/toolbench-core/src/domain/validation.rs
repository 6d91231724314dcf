//! Validation result models: probes, categories, and whole sweeps.
//!
//! These are computed per invocation and never persisted. The accumulator
//! on [`ValidationRun`] is the only place pass/fail totals are kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Why a probe did not pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeFailure {
    /// The command could not be launched at all.
    ToolMissing { reason: String },

    /// The command ran and exited non-zero.
    ToolFailed { exit_code: i32 },

    /// The command succeeded but its output lacked the expected signature.
    PatternMismatch { expected: String, actual: String },

    /// The command exceeded the configured timeout and was killed.
    TimedOut { after_secs: u64 },
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToolMissing { reason } => write!(f, "tool missing: {reason}"),
            Self::ToolFailed { exit_code } => write!(f, "exited with code {exit_code}"),
            Self::PatternMismatch { expected, actual } => {
                write!(f, "expected output matching '{expected}', got '{actual}'")
            }
            Self::TimedOut { after_secs } => write!(f, "timed out after {after_secs}s"),
        }
    }
}

/// Outcome of a single probe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeResult {
    /// Probe name (usually the tool name).
    pub name: String,

    /// Command line as it was launched.
    pub command: String,

    /// Pattern the output had to match, if any.
    pub expected_pattern: Option<String>,

    /// Whether the probe passed.
    pub passed: bool,

    /// Combined stdout + stderr.
    pub output: String,

    /// Failure reason (None when passed).
    pub error: Option<ProbeFailure>,

    /// Process exit code; -1 when the process never produced one.
    pub exit_code: i32,

    /// Wall-clock time spent on the probe.
    pub duration_ms: u64,
}

impl ProbeResult {
    /// First non-empty line of output, for one-line console summaries.
    pub fn headline(&self) -> &str {
        self.output
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("")
    }
}

/// Coarse outcome of a category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    Passed,
    Failed,
    Skipped,
}

impl CategoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "PASS",
            Self::Failed => "FAIL",
            Self::Skipped => "SKIP",
        }
    }
}

/// Aggregated outcome of one named category of probes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryResult {
    pub name: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub probe_results: Vec<ProbeResult>,

    /// Set when a prerequisite category did not pass; no probes ran.
    #[serde(default)]
    pub skipped: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

impl CategoryResult {
    /// Build a category result from probes that were run, in order.
    pub fn from_probes(name: impl Into<String>, probe_results: Vec<ProbeResult>) -> Self {
        let total = probe_results.len();
        let passed = probe_results.iter().filter(|p| p.passed).count();
        Self {
            name: name.into(),
            total,
            passed,
            failed: total - passed,
            probe_results,
            skipped: false,
            skip_reason: None,
        }
    }

    /// A category whose probes were not run.
    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total: 0,
            passed: 0,
            failed: 0,
            probe_results: Vec::new(),
            skipped: true,
            skip_reason: Some(reason.into()),
        }
    }

    pub fn status(&self) -> CategoryStatus {
        if self.skipped {
            CategoryStatus::Skipped
        } else if self.failed == 0 {
            CategoryStatus::Passed
        } else {
            CategoryStatus::Failed
        }
    }

    /// Whether every probe in a category that actually ran passed.
    pub fn all_passed(&self) -> bool {
        self.status() == CategoryStatus::Passed
    }
}

/// Result of a full validation sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationRun {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub categories: Vec<CategoryResult>,

    /// Categories that ran (skipped ones are excluded).
    pub total_categories: usize,
    pub passed_categories: usize,
    pub skipped_categories: usize,
    pub overall_passed: bool,
}

impl Default for ValidationRun {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationRun {
    /// Start an empty accumulator.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            categories: Vec::new(),
            total_categories: 0,
            passed_categories: 0,
            skipped_categories: 0,
            overall_passed: true,
        }
    }

    /// Fold one category into the totals.
    pub fn record(&mut self, category: CategoryResult) {
        match category.status() {
            CategoryStatus::Skipped => self.skipped_categories += 1,
            CategoryStatus::Passed => {
                self.total_categories += 1;
                self.passed_categories += 1;
            }
            CategoryStatus::Failed => self.total_categories += 1,
        }
        self.overall_passed = self.passed_categories == self.total_categories;
        self.categories.push(category);
    }

    /// Look up a recorded category by name.
    pub fn category(&self, name: &str) -> Option<&CategoryResult> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn total_probes(&self) -> usize {
        self.categories.iter().map(|c| c.total).sum()
    }

    pub fn passed_probes(&self) -> usize {
        self.categories.iter().map(|c| c.passed).sum()
    }

    pub fn failed_probes(&self) -> usize {
        self.categories.iter().map(|c| c.failed).sum()
    }

    /// Process exit code for a gating CI stage.
    pub fn exit_code(&self) -> i32 {
        if self.overall_passed {
            0
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(name: &str, passed: bool) -> ProbeResult {
        ProbeResult {
            name: name.to_string(),
            command: format!("{name} --version"),
            expected_pattern: None,
            passed,
            output: if passed {
                format!("{name} 1.0.0\n")
            } else {
                String::new()
            },
            error: if passed {
                None
            } else {
                Some(ProbeFailure::ToolMissing {
                    reason: "No such file or directory".to_string(),
                })
            },
            exit_code: if passed { 0 } else { -1 },
            duration_ms: 3,
        }
    }

    #[test]
    fn test_category_counts() {
        let cat = CategoryResult::from_probes(
            "System Tools",
            vec![probe("git", true), probe("cmake", true), probe("ninja", false)],
        );
        assert_eq!(cat.total, 3);
        assert_eq!(cat.passed, 2);
        assert_eq!(cat.failed, 1);
        assert_eq!(cat.passed + cat.failed, cat.total);
        assert_eq!(cat.status(), CategoryStatus::Failed);
    }

    #[test]
    fn test_skipped_category_not_counted() {
        let mut run = ValidationRun::new();
        run.record(CategoryResult::from_probes("Build", vec![probe("cmake", false)]));
        run.record(CategoryResult::skipped("Tests", "prerequisite 'Build' did not pass"));

        assert_eq!(run.total_categories, 1);
        assert_eq!(run.passed_categories, 0);
        assert_eq!(run.skipped_categories, 1);
        assert!(!run.overall_passed);
        assert_eq!(run.exit_code(), 1);
    }

    #[test]
    fn test_all_passing_run() {
        let mut run = ValidationRun::new();
        run.record(CategoryResult::from_probes("A", vec![probe("git", true)]));
        run.record(CategoryResult::from_probes("B", vec![probe("make", true)]));
        assert!(run.overall_passed);
        assert_eq!(run.passed_categories, run.total_categories);
        assert_eq!(run.total_probes(), 2);
        assert_eq!(run.exit_code(), 0);
    }

    #[test]
    fn test_headline_skips_blank_lines() {
        let mut p = probe("git", true);
        p.output = "\n\n  git version 2.43.0\nmore\n".to_string();
        assert_eq!(p.headline(), "git version 2.43.0");
    }

    #[test]
    fn test_probe_failure_display() {
        let f = ProbeFailure::PatternMismatch {
            expected: "Hello".to_string(),
            actual: "Bye".to_string(),
        };
        assert!(f.to_string().contains("Hello"));
        assert_eq!(
            ProbeFailure::ToolFailed { exit_code: 2 }.to_string(),
            "exited with code 2"
        );
    }
}
