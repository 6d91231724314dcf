//! CSV rendering: one row per leaf metric.

use crate::baseline::BaselineComparison;
use crate::domain::benchmark::BenchmarkReport;
use crate::domain::error::{HarnessError, Result};
use crate::domain::validation::ValidationRun;
use crate::snapshot::MetricsSnapshot;

const HEADER: [&str; 6] = ["metric", "value", "unit", "timestamp", "project", "project_type"];

struct Rows {
    wtr: ::csv::Writer<Vec<u8>>,
}

impl Rows {
    fn new() -> Result<Self> {
        let mut wtr = ::csv::WriterBuilder::new().from_writer(Vec::new());
        wtr.write_record(HEADER)?;
        Ok(Self { wtr })
    }

    fn push(
        &mut self,
        metric: &str,
        value: &str,
        unit: &str,
        timestamp: &str,
        project: &str,
        project_type: &str,
    ) -> Result<()> {
        self.wtr
            .write_record([metric, value, unit, timestamp, project, project_type])?;
        Ok(())
    }

    fn finish(self) -> Result<String> {
        let bytes = self
            .wtr
            .into_inner()
            .map_err(|e| HarnessError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn num(value: f64) -> String {
    format!("{value:.6}")
}

pub(crate) fn validation(run: &ValidationRun) -> Result<String> {
    let mut rows = Rows::new()?;
    let ts = run.generated_at.to_rfc3339();
    for category in &run.categories {
        if category.skipped {
            rows.push(&category.name, "", "skipped", &ts, "", "")?;
            continue;
        }
        for probe in &category.probe_results {
            let metric = format!("{}.{}", category.name, probe.name);
            let value = if probe.passed { "1" } else { "0" };
            rows.push(&metric, value, "pass", &ts, "", "")?;
        }
    }
    rows.finish()
}

pub(crate) fn benchmark(bench: &BenchmarkReport) -> Result<String> {
    let mut rows = Rows::new()?;
    let ts = bench.generated_at.to_rfc3339();
    let project = bench.project.name.as_str();
    let project_type = bench.project.project_type.as_str();

    for metric in &bench.metrics {
        let name = &metric.operation_name;
        for (field, value) in [
            ("average", metric.average),
            ("min", metric.min),
            ("max", metric.max),
            ("median", metric.median),
            ("std_dev", metric.std_dev),
        ] {
            rows.push(
                &format!("{name}.{field}"),
                &num(value),
                "s",
                &ts,
                project,
                project_type,
            )?;
        }
        rows.push(
            &format!("{name}.failed_runs"),
            &metric.failed_runs.to_string(),
            "count",
            &ts,
            project,
            project_type,
        )?;
    }
    rows.finish()
}

/// Unit for a flattened snapshot key, judged by its last segment.
fn unit_for_key(key: &str) -> &'static str {
    let leaf = key.rsplit('.').next().unwrap_or(key);
    if leaf.ends_with("rate") {
        "%"
    } else if leaf == "runs" || leaf.ends_with("_runs") || leaf.ends_with("sampled") {
        "count"
    } else {
        "s"
    }
}

pub(crate) fn snapshot(snap: &MetricsSnapshot) -> Result<String> {
    let mut rows = Rows::new()?;
    let ts = snap.timestamp.map(|t| t.to_rfc3339()).unwrap_or_default();
    for (key, value) in &snap.metrics {
        rows.push(
            key,
            &num(*value),
            unit_for_key(key),
            &ts,
            &snap.project_name,
            &snap.project_type,
        )?;
    }
    rows.finish()
}

pub(crate) fn comparison(items: &[BaselineComparison]) -> Result<String> {
    let mut rows = Rows::new()?;
    for item in items {
        rows.push(&item.metric_key, &num(item.percent_change), "%", "", "", "")?;
    }
    rows.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_for_key() {
        assert_eq!(unit_for_key("cicd.success_rate"), "%");
        assert_eq!(unit_for_key("local_performance.lint.failed_runs"), "count");
        assert_eq!(unit_for_key("local_performance.lint.runs"), "count");
        assert_eq!(unit_for_key("cicd.runs_sampled"), "count");
        assert_eq!(unit_for_key("local_performance.lint.average"), "s");
    }

    #[test]
    fn test_comparison_rows() {
        let items = vec![BaselineComparison {
            metric_key: "lint".to_string(),
            baseline_value: 2.0,
            current_value: 1.0,
            percent_change: 50.0,
            direction: crate::baseline::Direction::Improvement,
        }];
        let out = comparison(&items).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("metric,value,unit,timestamp,project,project_type")
        );
        assert_eq!(lines.next(), Some("lint,50.000000,%,,,"));
    }
}
