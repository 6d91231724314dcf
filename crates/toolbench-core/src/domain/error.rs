//! Harness-level error taxonomy.
//!
//! Probe and benchmark failures are never errors: they are recorded in the
//! result models so a sweep always completes. Only the variants below abort.

use std::path::PathBuf;

/// Errors that abort a harness command.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("harness prerequisite missing: {tool} ({reason})")]
    PrerequisiteMissing { tool: String, reason: String },

    #[error("project directory not found: {0}")]
    ProjectNotFound(PathBuf),

    #[error("invalid snapshot document: {0}")]
    SnapshotFormat(String),

    #[error("unknown report format: {0}")]
    UnknownFormat(String),

    #[error("unknown project type: {0}")]
    UnknownProjectType(String),

    #[error("ci metrics collection failed: {0}")]
    CicdCollection(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;
