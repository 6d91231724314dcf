//! Fixed-width table rendering.

use crate::baseline::{BaselineComparison, Direction};
use crate::domain::benchmark::{BenchmarkMetric, BenchmarkReport};
use crate::domain::validation::ValidationRun;
use crate::snapshot::MetricsSnapshot;

const NAME_WIDTH: usize = 36;
const VALUE_WIDTH: usize = 12;
const RULE_WIDTH: usize = 80;

/// Seconds with millisecond precision, e.g. `1.250s`.
pub fn format_secs(secs: f64) -> String {
    format!("{secs:.3}s")
}

fn rule() -> String {
    format!("{}\n", "-".repeat(RULE_WIDTH))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

pub(crate) fn validation(run: &ValidationRun) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Validation run {} ({})\n",
        run.run_id,
        run.generated_at.to_rfc3339()
    ));
    out.push_str(&rule());
    out.push_str(&format!(
        "{:<NAME_WIDTH$} {:>VALUE_WIDTH$}  {}\n",
        "CATEGORY", "PASSED", "STATUS"
    ));
    out.push_str(&rule());

    for category in &run.categories {
        let value = if category.skipped {
            "-".to_string()
        } else {
            format!("{}/{}", category.passed, category.total)
        };
        out.push_str(&format!(
            "{:<NAME_WIDTH$} {:>VALUE_WIDTH$}  {}\n",
            truncate(&category.name, NAME_WIDTH),
            value,
            category.status().as_str()
        ));
        for probe in category.probe_results.iter().filter(|p| !p.passed) {
            let reason = probe
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default();
            out.push_str(&format!(
                "    x {}: {}\n",
                probe.name,
                truncate(&reason, RULE_WIDTH - 8 - probe.name.len().min(40))
            ));
        }
        if let Some(reason) = &category.skip_reason {
            out.push_str(&format!("    - {reason}\n"));
        }
    }

    out.push_str(&rule());
    out.push_str(&format!(
        "Categories: {} run, {} passed, {} failed, {} skipped\n",
        run.total_categories,
        run.passed_categories,
        run.total_categories - run.passed_categories,
        run.skipped_categories
    ));
    out.push_str(&format!(
        "Probes: {} total, {} passed, {} failed\n",
        run.total_probes(),
        run.passed_probes(),
        run.failed_probes()
    ));
    out.push_str(&format!(
        "Overall: {}\n",
        if run.overall_passed { "PASS" } else { "FAIL" }
    ));
    out
}

fn status_cell(metric: &BenchmarkMetric) -> String {
    if metric.has_failures() {
        format!("{} ({} failed)", metric.status, metric.failed_runs)
    } else {
        metric.status.to_string()
    }
}

/// Summary statistics over a set of values.
struct Summary {
    count: usize,
    total: f64,
    average: f64,
    min: f64,
    max: f64,
}

impl Summary {
    fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let total: f64 = values.iter().sum();
        Some(Self {
            count: values.len(),
            total,
            average: total / values.len() as f64,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

pub(crate) fn benchmark(bench: &BenchmarkReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Benchmark: {} ({}), {} run(s) per operation ({})\n",
        bench.project.name,
        bench.project.project_type.as_str(),
        bench.run_count,
        bench.generated_at.to_rfc3339()
    ));
    out.push_str(&rule());
    out.push_str(&format!(
        "{:<24} {:>VALUE_WIDTH$} {:>VALUE_WIDTH$} {:>VALUE_WIDTH$}  {}\n",
        "OPERATION", "AVERAGE", "MIN", "MAX", "STATUS"
    ));
    out.push_str(&rule());

    for metric in &bench.metrics {
        out.push_str(&format!(
            "{:<24} {:>VALUE_WIDTH$} {:>VALUE_WIDTH$} {:>VALUE_WIDTH$}  {}\n",
            truncate(&metric.operation_name, 24),
            format_secs(metric.average),
            format_secs(metric.min),
            format_secs(metric.max),
            status_cell(metric)
        ));
    }

    out.push_str(&rule());
    let averages: Vec<f64> = bench.metrics.iter().map(|m| m.average).collect();
    match Summary::of(&averages) {
        Some(s) => out.push_str(&format!(
            "Summary: {} operation(s), total {}, average {}, min {}, max {}\n",
            s.count,
            format_secs(s.total),
            format_secs(s.average),
            format_secs(s.min),
            format_secs(s.max)
        )),
        None => out.push_str("Summary: no operations measured\n"),
    }
    let failed: usize = bench.metrics.iter().map(|m| m.failed_runs).sum();
    if failed > 0 {
        out.push_str(&format!(
            "Warning: {failed} run(s) failed; their durations are included above\n"
        ));
    }
    out
}

pub(crate) fn snapshot(snap: &MetricsSnapshot) -> String {
    let mut out = String::new();
    let stamp = snap
        .timestamp
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "unknown time".to_string());
    out.push_str(&format!(
        "Snapshot: {} ({}) at {}\n",
        snap.project_name, snap.project_type, stamp
    ));
    out.push_str(&rule());
    out.push_str(&format!(
        "{:<52} {:>VALUE_WIDTH$}  {}\n",
        "METRIC", "VALUE", "STATUS"
    ));
    out.push_str(&rule());

    for (key, value) in &snap.metrics {
        let status = status_for_key(snap, key);
        out.push_str(&format!(
            "{:<52} {:>VALUE_WIDTH$.3}  {}\n",
            truncate(key, 52),
            value,
            status
        ));
    }

    out.push_str(&rule());
    let averages: Vec<f64> = snap.operation_averages().map(|(_, v)| v).collect();
    match Summary::of(&averages) {
        Some(s) => out.push_str(&format!(
            "Summary: {} operation average(s), total {}, average {}, min {}, max {}\n",
            s.count,
            format_secs(s.total),
            format_secs(s.average),
            format_secs(s.min),
            format_secs(s.max)
        )),
        None => out.push_str(&format!(
            "Summary: {} metric(s), no operation timings recorded\n",
            snap.metrics.len()
        )),
    }
    out
}

/// The `status` label stored next to an operation's `average`, if any.
fn status_for_key<'a>(snap: &'a MetricsSnapshot, key: &str) -> &'a str {
    key.strip_suffix(".average")
        .and_then(|prefix| snap.metadata.get(&format!("{prefix}.status")))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

pub(crate) fn comparison(rows: &[BaselineComparison]) -> String {
    let mut out = String::new();
    out.push_str("Baseline comparison\n");
    out.push_str(&rule());
    out.push_str(&format!(
        "{:<40} {:>10} {:>10} {:>9}  {}\n",
        "METRIC", "BASELINE", "CURRENT", "CHANGE", "DIRECTION"
    ));
    out.push_str(&rule());

    for row in rows {
        out.push_str(&format!(
            "{:<40} {:>10.3} {:>10.3} {:>8.1}%  {}\n",
            truncate(&row.metric_key, 40),
            row.baseline_value,
            row.current_value,
            row.percent_change,
            row.direction.as_str()
        ));
    }

    out.push_str(&rule());
    let improvements = rows
        .iter()
        .filter(|r| r.direction == Direction::Improvement)
        .count();
    out.push_str(&format!(
        "Summary: {} metric(s) compared, {} improvement(s), {} regression(s)\n",
        rows.len(),
        improvements,
        rows.len() - improvements
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_secs() {
        assert_eq!(format_secs(1.0), "1.000s");
        assert_eq!(format_secs(0.12345), "0.123s");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-very-long-category-name", 10), "a-very-...");
    }

    #[test]
    fn test_summary_of_values() {
        let s = Summary::of(&[1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.total, 6.0);
        assert_eq!(s.average, 2.0);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 3.0);
        assert!(Summary::of(&[]).is_none());
    }
}
