//! Process-wide atomic counters for toolbench observability.
//!
//! Counters are incremented from the [`crate::obs`] emitters. Call
//! [`Counters::flush`] once at program end to log the totals.

use std::sync::atomic::{AtomicU64, Ordering};

/// Target of the [`Counters::flush`] event. The default filter built by
/// [`crate::telemetry::default_directives`] always lets it through.
pub const FLUSH_TARGET: &str = module_path!();

/// Global counters singleton.
pub static METRICS: Counters = Counters::new();

pub struct Counters {
    probes_executed: AtomicU64,
    benchmark_runs: AtomicU64,
    snapshots_written: AtomicU64,
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}

impl Counters {
    pub const fn new() -> Self {
        Self {
            probes_executed: AtomicU64::new(0),
            benchmark_runs: AtomicU64::new(0),
            snapshots_written: AtomicU64::new(0),
        }
    }

    pub fn inc_probes(&self) {
        self.probes_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_benchmark_runs(&self) {
        self.benchmark_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_snapshots(&self) {
        self.snapshots_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Emit all current counter values as a single `info!` event on
    /// [`FLUSH_TARGET`].
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            probes_executed = self.probes_executed(),
            benchmark_runs = self.benchmark_runs(),
            snapshots_written = self.snapshots_written(),
        );
    }

    pub fn probes_executed(&self) -> u64 {
        self.probes_executed.load(Ordering::Relaxed)
    }

    pub fn benchmark_runs(&self) -> u64 {
        self.benchmark_runs.load(Ordering::Relaxed)
    }

    pub fn snapshots_written(&self) -> u64 {
        self.snapshots_written.load(Ordering::Relaxed)
    }
}
