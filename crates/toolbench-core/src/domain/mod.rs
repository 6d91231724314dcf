//! Domain models shared by the runner and the reporting layer.

pub mod benchmark;
pub mod error;
pub mod validation;

pub use benchmark::{
    BenchmarkMetric, BenchmarkReport, BenchmarkStatus, OperationFamily, ProjectInfo, ProjectType,
    RunSample,
};
pub use error::{HarnessError, Result};
pub use validation::{CategoryResult, CategoryStatus, ProbeFailure, ProbeResult, ValidationRun};
