//! toolbench core library
//!
//! Result models, threshold classification, snapshot persistence, baseline
//! comparison, and report rendering. Nothing in here spawns processes; see
//! `toolbench-runner` for that.

pub mod baseline;
pub mod domain;
pub mod metrics;
pub mod obs;
pub mod report;
pub mod snapshot;
pub mod telemetry;
pub mod threshold;

pub use baseline::{compare, metric_changes, BaselineComparison, Direction, MetricChanges};
pub use domain::{
    BenchmarkMetric, BenchmarkReport, BenchmarkStatus, CategoryResult, CategoryStatus,
    HarnessError, OperationFamily, ProbeFailure, ProbeResult, ProjectInfo, ProjectType, Result,
    RunSample, ValidationRun,
};
pub use metrics::METRICS;
pub use report::{render, save_benchmark_report, Report, ReportFormat};
pub use snapshot::{deep_merge, merge_into_file, MetricsSnapshot};
pub use telemetry::init_tracing;

/// toolbench version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
