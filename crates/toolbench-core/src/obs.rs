//! Structured lifecycle events for validation sweeps and benchmarks.
//!
//! Each function emits one `tracing` event with a stable `event` field so
//! log consumers can filter on it, e.g. `event=probe.finished`.

use tracing::{debug, info, warn};

use crate::domain::benchmark::BenchmarkMetric;
use crate::domain::validation::{CategoryResult, ProbeResult};
use crate::metrics::METRICS;

/// RAII guard that enters a command-scoped span; `target` is the project
/// directory or category selection the command works on.
pub struct SweepSpan {
    _span: tracing::span::EnteredSpan,
}

impl SweepSpan {
    pub fn enter(command: &str, target: &str) -> Self {
        let span = tracing::info_span!("toolbench.sweep", command = %command, target = %target);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_probe_finished(category: &str, probe: &ProbeResult) {
    METRICS.inc_probes();
    match &probe.error {
        None => debug!(
            event = "probe.finished",
            category = %category,
            probe = %probe.name,
            exit_code = probe.exit_code,
            duration_ms = probe.duration_ms,
            passed = true,
        ),
        Some(err) => warn!(
            event = "probe.finished",
            category = %category,
            probe = %probe.name,
            exit_code = probe.exit_code,
            duration_ms = probe.duration_ms,
            passed = false,
            error = %err,
        ),
    }
}

pub fn emit_category_finished(category: &CategoryResult) {
    info!(
        event = "category.finished",
        category = %category.name,
        total = category.total,
        passed = category.passed,
        failed = category.failed,
    );
}

pub fn emit_category_skipped(category: &str, prerequisite: &str) {
    warn!(
        event = "category.skipped",
        category = %category,
        prerequisite = %prerequisite,
    );
}

pub fn emit_benchmark_run(operation: &str, run: usize, duration_secs: f64, success: bool) {
    METRICS.inc_benchmark_runs();
    if success {
        debug!(
            event = "benchmark.run_finished",
            operation = %operation,
            run = run,
            duration_secs = duration_secs,
        );
    } else {
        warn!(
            event = "benchmark.run_finished",
            operation = %operation,
            run = run,
            duration_secs = duration_secs,
            success = false,
        );
    }
}

pub fn emit_benchmark_finished(metric: &BenchmarkMetric) {
    info!(
        event = "benchmark.finished",
        operation = %metric.operation_name,
        runs = metric.run_count(),
        average_secs = metric.average,
        failed_runs = metric.failed_runs,
        status = %metric.status,
    );
}

pub fn emit_reset_hook_failed(operation: &str, error: &dyn std::fmt::Display) {
    warn!(event = "benchmark.reset_failed", operation = %operation, error = %error);
}

pub fn emit_snapshot_written(path: &std::path::Path) {
    METRICS.inc_snapshots();
    info!(event = "snapshot.written", path = %path.display());
}
