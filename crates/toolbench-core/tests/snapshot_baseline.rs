use std::path::PathBuf;

use serde_json::json;
use toolbench_core::snapshot::{benchmark_document, merge_into_file};
use toolbench_core::{
    compare, metric_changes, render, BenchmarkMetric, BenchmarkReport, Direction,
    MetricsSnapshot, OperationFamily, ProjectInfo, ProjectType, Report, ReportFormat, RunSample,
};

fn bench_with_lint(durations: &[f64]) -> BenchmarkReport {
    BenchmarkReport::new(
        ProjectInfo {
            name: "demo".to_string(),
            project_type: ProjectType::Python,
            path: PathBuf::from("/work/demo"),
        },
        durations.len(),
        vec![BenchmarkMetric::from_samples(
            "lint",
            OperationFamily::Lint,
            durations.iter().map(|d| RunSample::ok(*d)).collect(),
        )],
    )
}

#[test]
fn benchmark_document_flattens_to_metrics() {
    let doc = benchmark_document(&bench_with_lint(&[1.0, 1.2, 0.8]));
    let snap = MetricsSnapshot::from_document(&doc).unwrap();

    assert_eq!(snap.project_name, "demo");
    assert_eq!(snap.project_type, "python");
    assert!((snap.metrics["local_performance.lint.average"] - 1.0).abs() < 1e-9);
    assert_eq!(snap.metadata["local_performance.lint.runs"], json!(3));
    assert!(!snap.metrics.contains_key("local_performance.lint.runs"));
    assert_eq!(
        snap.metadata["local_performance.lint.status"],
        json!("Fast")
    );
}

#[test]
fn measurement_phases_merge_into_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("performance-metrics.json");

    merge_into_file(&path, benchmark_document(&bench_with_lint(&[3.0]))).unwrap();
    merge_into_file(&path, json!({ "cicd": { "success_rate": 80.0 } })).unwrap();
    // a later local phase overrides the earlier lint value but keeps cicd
    merge_into_file(&path, benchmark_document(&bench_with_lint(&[1.5]))).unwrap();

    let snap = MetricsSnapshot::load(&path).unwrap();
    assert_eq!(snap.metrics["local_performance.lint.average"], 1.5);
    assert_eq!(snap.metrics["cicd.success_rate"], 80.0);
}

#[test]
fn halved_lint_time_is_improvement() {
    let baseline =
        MetricsSnapshot::from_document(&benchmark_document(&bench_with_lint(&[2.0]))).unwrap();
    let current =
        MetricsSnapshot::from_document(&benchmark_document(&bench_with_lint(&[1.0]))).unwrap();

    let rows = compare(&current, &baseline);
    let lint = rows
        .iter()
        .find(|r| r.metric_key == "local_performance.lint.average")
        .expect("lint average compared");
    assert!((lint.percent_change - 50.0).abs() < 1e-9);
    assert_eq!(lint.direction, Direction::Improvement);

    assert!(metric_changes(&current, &baseline).is_empty());

    let table = render(Report::Comparison(&rows), ReportFormat::Table).unwrap();
    assert!(table.contains("improvement"));
    assert!(table.contains("50.0%"));
}

#[test]
fn rerun_with_more_runs_is_not_a_regression() {
    let baseline =
        MetricsSnapshot::from_document(&benchmark_document(&bench_with_lint(&[1.0, 1.0, 1.0])))
            .unwrap();
    let current = MetricsSnapshot::from_document(&benchmark_document(&bench_with_lint(&[
        1.0, 1.0, 1.0, 1.0, 1.0,
    ])))
    .unwrap();

    let rows = compare(&current, &baseline);
    assert!(rows.iter().all(|r| !r.metric_key.ends_with(".runs")));
    assert!(rows.iter().all(|r| r.direction == Direction::Improvement));
    assert!(metric_changes(&current, &baseline).is_empty());
}

#[test]
fn higher_ci_success_rate_is_improvement() {
    let doc = |rate: f64, sampled: u64| {
        json!({
            "cicd": {
                "runs_sampled": sampled,
                "successful_runs": 0,
                "success_rate": rate,
                "average_duration_seconds": 300.0
            }
        })
    };
    let baseline = MetricsSnapshot::from_document(&doc(80.0, 10)).unwrap();
    let current = MetricsSnapshot::from_document(&doc(95.0, 20)).unwrap();

    let rows = compare(&current, &baseline);
    let keys: Vec<&str> = rows.iter().map(|r| r.metric_key.as_str()).collect();
    assert_eq!(keys, vec!["cicd.average_duration_seconds", "cicd.success_rate"]);

    let rate = &rows[1];
    assert!((rate.percent_change - 18.75).abs() < 1e-9);
    assert_eq!(rate.direction, Direction::Improvement);

    let table = render(Report::Comparison(&rows), ReportFormat::Table).unwrap();
    assert!(table.contains("18.8%"));
    assert!(table.contains("0 regression(s)"));
}

#[test]
fn snapshot_summary_totals_operation_timings_only() {
    let mut doc = benchmark_document(&bench_with_lint(&[2.0, 2.0, 2.0]));
    toolbench_core::snapshot::deep_merge(
        &mut doc,
        json!({ "cicd": { "success_rate": 90.0, "average_duration_seconds": 600.0 } }),
    );
    let snap = MetricsSnapshot::from_document(&doc).unwrap();

    let table = render(Report::Snapshot(&snap), ReportFormat::Table).unwrap();
    assert!(table.contains("Summary: 1 operation average(s), total 2.000s"));
    assert!(table.contains("cicd.success_rate"));
}

#[test]
fn snapshot_renders_in_all_formats() {
    let snap =
        MetricsSnapshot::from_document(&benchmark_document(&bench_with_lint(&[1.5, 1.5])))
            .unwrap();

    let table = render(Report::Snapshot(&snap), ReportFormat::Table).unwrap();
    assert!(table.contains("local_performance.lint.average"));
    assert!(table.contains("Fast"));

    let csv = render(Report::Snapshot(&snap), ReportFormat::Csv).unwrap();
    assert!(csv.contains("local_performance.lint.average,1.500000,s,"));

    let json = render(Report::Snapshot(&snap), ReportFormat::Json).unwrap();
    let back: MetricsSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snap);
}
