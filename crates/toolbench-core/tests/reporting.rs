use std::path::PathBuf;

use toolbench_core::{
    render, BenchmarkMetric, BenchmarkReport, CategoryResult, OperationFamily, ProbeFailure,
    ProbeResult, ProjectInfo, ProjectType, Report, ReportFormat, RunSample, ValidationRun,
};

fn probe(name: &str, passed: bool) -> ProbeResult {
    ProbeResult {
        name: name.to_string(),
        command: format!("{name} --version"),
        expected_pattern: None,
        passed,
        output: if passed {
            format!("{name} version 1.2.3\n")
        } else {
            String::new()
        },
        error: if passed {
            None
        } else {
            Some(ProbeFailure::ToolMissing {
                reason: "No such file or directory (os error 2)".to_string(),
            })
        },
        exit_code: if passed { 0 } else { -1 },
        duration_ms: 12,
    }
}

fn sample_run() -> ValidationRun {
    let mut run = ValidationRun::new();
    run.record(CategoryResult::from_probes(
        "System Tools",
        vec![probe("git", true), probe("cmake", true), probe("ninja", false)],
    ));
    run.record(CategoryResult::from_probes(
        "Python Toolchain",
        vec![probe("python3", true), probe("ruff", true)],
    ));
    run
}

fn sample_bench() -> BenchmarkReport {
    BenchmarkReport::new(
        ProjectInfo {
            name: "demo".to_string(),
            project_type: ProjectType::Cpp,
            path: PathBuf::from("/work/demo"),
        },
        3,
        vec![
            BenchmarkMetric::from_samples(
                "lint",
                OperationFamily::Lint,
                vec![RunSample::ok(1.0), RunSample::ok(1.2), RunSample::ok(0.8)],
            ),
            BenchmarkMetric::from_samples(
                "full_build",
                OperationFamily::Build,
                vec![
                    RunSample::ok(100.0),
                    RunSample::failed(10.0, Some(2)),
                    RunSample::ok(130.0),
                ],
            ),
        ],
    )
}

#[test]
fn validation_run_json_roundtrip() {
    let run = sample_run();
    assert_eq!(run.categories.len(), 2);

    let json = render(Report::Validation(&run), ReportFormat::Json).expect("render json");
    let parsed: ValidationRun = serde_json::from_str(&json).expect("parse back");

    assert_eq!(parsed, run);
}

#[test]
fn system_tools_scenario_counts() {
    let run = sample_run();
    let system = run.category("System Tools").expect("category present");
    assert_eq!(system.total, 3);
    assert_eq!(system.passed, 2);
    assert_eq!(system.failed, 1);
    assert!(!run.overall_passed);
    assert_eq!(run.passed_categories, 1);
    assert_eq!(run.total_categories, 2);
}

#[test]
fn rendering_is_idempotent_in_every_format() {
    let run = sample_run();
    let bench = sample_bench();
    for format in [ReportFormat::Table, ReportFormat::Json, ReportFormat::Csv] {
        let a = render(Report::Validation(&run), format).unwrap();
        let b = render(Report::Validation(&run), format).unwrap();
        assert_eq!(a, b, "validation {} not deterministic", format.as_str());

        let a = render(Report::Benchmark(&bench), format).unwrap();
        let b = render(Report::Benchmark(&bench), format).unwrap();
        assert_eq!(a, b, "benchmark {} not deterministic", format.as_str());
    }
}

#[test]
fn benchmark_table_has_rows_and_summary() {
    let bench = sample_bench();
    let table = render(Report::Benchmark(&bench), ReportFormat::Table).unwrap();

    assert!(table.contains("lint"));
    assert!(table.contains("1.000s"));
    assert!(table.contains("Fast"));
    assert!(table.contains("Good (1 failed)"));
    assert!(table.contains("Summary: 2 operation(s)"));
    assert!(table.contains("Warning: 1 run(s) failed"));
}

#[test]
fn benchmark_csv_one_row_per_leaf() {
    let bench = sample_bench();
    let csv = render(Report::Benchmark(&bench), ReportFormat::Csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "metric,value,unit,timestamp,project,project_type");
    // 6 leaves per metric: average, min, max, median, std_dev, failed_runs
    assert_eq!(lines.len(), 1 + 2 * 6);
    assert!(lines[1].starts_with("lint.average,1.000000,s,"));
    assert!(lines[1].ends_with(",demo,cpp"));
    assert!(csv.contains("full_build.failed_runs,1,count,"));
}

#[test]
fn benchmark_json_preserves_runs() {
    let bench = sample_bench();
    let json = render(Report::Benchmark(&bench), ReportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let runs = value["metrics"][1]["runs"].as_array().expect("runs array");
    assert_eq!(runs.len(), 3);
    assert_eq!(runs[1]["success"], false);
    assert_eq!(value["metrics"][0]["status"], "Fast");
}

#[test]
fn validation_table_marks_skipped_categories() {
    let mut run = ValidationRun::new();
    run.record(CategoryResult::from_probes("C++ Build", vec![probe("cmake", false)]));
    run.record(CategoryResult::skipped(
        "C++ Tests",
        "prerequisite 'C++ Build' did not pass",
    ));

    let table = render(Report::Validation(&run), ReportFormat::Table).unwrap();
    assert!(table.contains("SKIP"));
    assert!(table.contains("1 skipped"));
    assert!(table.contains("Overall: FAIL"));

    let csv = render(Report::Validation(&run), ReportFormat::Csv).unwrap();
    assert!(csv.contains("C++ Tests,,skipped,"));
}

#[test]
fn saved_report_lands_in_timestamped_file() {
    let dir = tempfile::tempdir().unwrap();
    let bench = sample_bench();

    let path = toolbench_core::save_benchmark_report(dir.path(), &bench, ReportFormat::Csv)
        .expect("save report");

    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("benchmark-demo-"));
    assert!(name.ends_with(".csv"));
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("metric,value,unit"));
}
