//! Benchmark engine: reset, time and aggregate repeated operation runs.

use toolbench_core::obs;
use toolbench_core::{BenchmarkMetric, BenchmarkReport, ProjectInfo, RunSample};
use tracing::info;

use crate::operation::BenchOperation;
use crate::timer::Timer;

/// Receives benchmark progress as it happens.
pub trait BenchmarkObserver {
    fn operation_started(&mut self, _operation: &str, _run_count: usize) {}

    /// `run` is 1-based.
    fn run_finished(&mut self, operation: &str, run: usize, sample: &RunSample);

    fn operation_finished(&mut self, _metric: &BenchmarkMetric) {}
}

/// Observer that ignores everything.
pub struct QuietObserver;

impl BenchmarkObserver for QuietObserver {
    fn run_finished(&mut self, _operation: &str, _run: usize, _sample: &RunSample) {}
}

/// Sequential benchmark engine.
pub struct BenchmarkEngine;

impl BenchmarkEngine {
    /// Time `run_count` invocations of `op`.
    ///
    /// The reset hook runs before each invocation, outside the timed
    /// section. A failing reset is logged and the run still happens. Failed
    /// invocations are timed and kept as flagged samples.
    pub async fn benchmark_operation(
        op: &dyn BenchOperation,
        run_count: usize,
        observer: &mut dyn BenchmarkObserver,
    ) -> BenchmarkMetric {
        observer.operation_started(op.name(), run_count);
        let mut samples = Vec::with_capacity(run_count);

        for run in 1..=run_count {
            if let Err(e) = op.reset() {
                obs::emit_reset_hook_failed(op.name(), &e);
            }

            let timer = Timer::start();
            let outcome = op.invoke().await;
            let secs = timer.elapsed_secs();

            let sample = if outcome.success {
                RunSample::ok(secs)
            } else {
                RunSample::failed(secs, outcome.exit_code)
            };
            obs::emit_benchmark_run(op.name(), run, secs, outcome.success);
            observer.run_finished(op.name(), run, &sample);
            samples.push(sample);
        }

        let metric = BenchmarkMetric::from_samples(op.name(), op.family(), samples);
        obs::emit_benchmark_finished(&metric);
        observer.operation_finished(&metric);
        metric
    }

    /// Benchmark each operation in order into a [`BenchmarkReport`].
    pub async fn run_suite(
        project: ProjectInfo,
        operations: &[&dyn BenchOperation],
        run_count: usize,
        observer: &mut dyn BenchmarkObserver,
    ) -> BenchmarkReport {
        info!(
            project = %project.name,
            project_type = project.project_type.as_str(),
            operations = operations.len(),
            runs = run_count,
            "Starting benchmark"
        );

        let mut metrics = Vec::with_capacity(operations.len());
        for op in operations {
            metrics.push(Self::benchmark_operation(*op, run_count, observer).await);
        }
        BenchmarkReport::new(project, run_count, metrics)
    }
}
