//! Benchmarkable operations and their reset hooks.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use toolbench_core::OperationFamily;

use crate::exec::{run_captured, CommandSpec};

/// State restored before every timed run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResetHook {
    #[default]
    None,

    /// Delete a build output directory so each run is a full rebuild.
    RemoveDir { path: PathBuf },

    /// Bump one source file's mtime so each run is an incremental rebuild.
    TouchFile { path: PathBuf },
}

impl ResetHook {
    pub fn apply(&self) -> io::Result<()> {
        match self {
            ResetHook::None => Ok(()),
            ResetHook::RemoveDir { path } => match fs::remove_dir_all(path) {
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
            ResetHook::TouchFile { path } => {
                let file = fs::File::options().write(true).open(path)?;
                file.set_modified(SystemTime::now())
            }
        }
    }
}

/// How a single timed invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub success: bool,

    /// Exit code of the step that decided the outcome; `None` if it never
    /// produced one (launch failure, timeout, signal).
    pub exit_code: Option<i32>,
}

impl RunOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            exit_code: Some(0),
        }
    }

    pub fn failed(exit_code: Option<i32>) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Something the benchmark engine can reset and time.
#[async_trait]
pub trait BenchOperation: Send + Sync {
    fn name(&self) -> &str;

    fn family(&self) -> OperationFamily;

    /// Restore preconditions; runs outside the timed section.
    fn reset(&self) -> io::Result<()> {
        Ok(())
    }

    async fn invoke(&self) -> RunOutcome;
}

/// An operation backed by one or more external commands run in sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationSpec {
    pub name: String,
    pub family: OperationFamily,

    /// Commands run in order; the first failing step fails the run.
    pub steps: Vec<Vec<String>>,

    pub workdir: PathBuf,

    #[serde(default)]
    pub reset: ResetHook,

    /// Per-step timeout in seconds; 0 disables it.
    #[serde(default)]
    pub timeout_secs: u64,
}

impl OperationSpec {
    pub fn new(name: impl Into<String>, family: OperationFamily, workdir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            family,
            steps: Vec::new(),
            workdir: workdir.into(),
            reset: ResetHook::None,
            timeout_secs: 0,
        }
    }

    pub fn step(mut self, command: Vec<String>) -> Self {
        self.steps.push(command);
        self
    }

    pub fn with_reset(mut self, reset: ResetHook) -> Self {
        self.reset = reset;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[async_trait]
impl BenchOperation for OperationSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> OperationFamily {
        self.family
    }

    fn reset(&self) -> io::Result<()> {
        self.reset.apply()
    }

    async fn invoke(&self) -> RunOutcome {
        for command in &self.steps {
            let spec = CommandSpec::new(command.clone())
                .in_dir(&self.workdir)
                .with_timeout(self.timeout());
            match run_captured(&spec).await {
                Ok(out) if out.success() => continue,
                Ok(out) => {
                    tracing::debug!(
                        operation = %self.name,
                        step = %spec.display(),
                        exit_code = out.exit_code,
                        "step failed"
                    );
                    return RunOutcome::failed(Some(out.exit_code));
                }
                Err(e) => {
                    tracing::debug!(operation = %self.name, step = %spec.display(), error = %e, "step did not complete");
                    return RunOutcome::failed(None);
                }
            }
        }
        RunOutcome::ok()
    }
}
