//! Report rendering for validation sweeps, benchmarks, snapshots, and
//! baseline comparisons.
//!
//! Three formats are supported:
//! - `table`: fixed-width columns followed by a computed summary
//! - `json`: pretty structured dump preserving nesting
//! - `csv`: one row per leaf metric: `metric,value,unit,timestamp,project,project_type`
//!
//! Rendering is deterministic: the same input renders byte-identical output.

mod delimited;
mod table;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::baseline::BaselineComparison;
use crate::domain::benchmark::BenchmarkReport;
use crate::domain::error::{HarnessError, Result};
use crate::domain::validation::ValidationRun;
use crate::snapshot::MetricsSnapshot;

pub use table::format_secs;

/// Output format for a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// File extension used when a report is saved.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Table => "txt",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" | "text" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(HarnessError::UnknownFormat(other.to_string())),
        }
    }
}

/// Anything the generator knows how to render.
#[derive(Debug, Clone, Copy)]
pub enum Report<'a> {
    Validation(&'a ValidationRun),
    Benchmark(&'a BenchmarkReport),
    Snapshot(&'a MetricsSnapshot),
    Comparison(&'a [BaselineComparison]),
}

/// Render a report in the requested format.
pub fn render(report: Report<'_>, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Table => Ok(match report {
            Report::Validation(run) => table::validation(run),
            Report::Benchmark(bench) => table::benchmark(bench),
            Report::Snapshot(snap) => table::snapshot(snap),
            Report::Comparison(rows) => table::comparison(rows),
        }),
        ReportFormat::Json => match report {
            Report::Validation(run) => to_json(run),
            Report::Benchmark(bench) => to_json(bench),
            Report::Snapshot(snap) => to_json(snap),
            Report::Comparison(rows) => to_json(rows),
        },
        ReportFormat::Csv => match report {
            Report::Validation(run) => delimited::validation(run),
            Report::Benchmark(bench) => delimited::benchmark(bench),
            Report::Snapshot(snap) => delimited::snapshot(snap),
            Report::Comparison(rows) => delimited::comparison(rows),
        },
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

/// Path for a saved benchmark report:
/// `<dir>/benchmark-<project>-<YYYYmmdd-HHMMSS>.<ext>`.
pub fn saved_report_path(dir: &Path, bench: &BenchmarkReport, format: ReportFormat) -> PathBuf {
    dir.join(format!(
        "benchmark-{}-{}.{}",
        crate::snapshot::metric_key(&bench.project.name),
        bench.generated_at.format("%Y%m%d-%H%M%S"),
        format.extension()
    ))
}

/// Render and write a benchmark report to its timestamped path.
pub fn save_benchmark_report(
    dir: &Path,
    bench: &BenchmarkReport,
    format: ReportFormat,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = saved_report_path(dir, bench, format);
    std::fs::write(&path, render(Report::Benchmark(bench), format)?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!("TABLE".parse::<ReportFormat>().unwrap(), ReportFormat::Table);
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!(" csv ".parse::<ReportFormat>().unwrap(), ReportFormat::Csv);
        assert!(matches!(
            "xml".parse::<ReportFormat>(),
            Err(HarnessError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_extensions() {
        assert_eq!(ReportFormat::Table.extension(), "txt");
        assert_eq!(ReportFormat::Csv.extension(), "csv");
    }
}
