//! toolbench runner
//!
//! Everything that launches subprocesses: command probes and category
//! sweeps for toolchain validation, and the benchmark engine that times
//! project operations. Results are the `toolbench-core` models.

pub mod catalog;
pub mod category;
pub mod cicd;
pub mod config;
pub mod engine;
pub mod exec;
pub mod operation;
pub mod platform;
pub mod prereq;
pub mod probe;
pub mod project;
pub mod timer;

pub use catalog::{Catalog, Selection};
pub use category::{CategoryGroup, CategoryRunner, CategorySpec, ProbeObserver, SilentObserver};
pub use cicd::CicdSummary;
pub use config::HarnessConfig;
pub use engine::{BenchmarkEngine, BenchmarkObserver, QuietObserver};
pub use operation::{BenchOperation, OperationSpec, ResetHook, RunOutcome};
pub use platform::Platform;
pub use probe::{PatternKind, ProbeSpec};
pub use timer::Timer;
