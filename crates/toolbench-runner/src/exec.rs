//! Subprocess execution with captured output.
//!
//! The child is spawned with `kill_on_drop`, so a timeout or any early
//! return kills and reaps it; no process outlives the future that owns it.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// A command line plus where and how long to run it.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    /// Command to execute (first element is executable).
    pub argv: Vec<String>,

    /// Working directory; inherits the harness's when `None`.
    pub workdir: Option<PathBuf>,

    /// Bounded wait; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            workdir: None,
            timeout: None,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The command line as a single display string.
    pub fn display(&self) -> String {
        self.argv.join(" ")
    }
}

/// Captured result of a completed process.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    /// Exit code; -1 when terminated by a signal.
    pub exit_code: i32,

    /// stdout followed by stderr.
    pub output: String,

    pub duration: Duration,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Why a process produced no exit status.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("empty command")]
    EmptyCommand,

    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("failed waiting for process: {0}")]
    Wait(#[from] std::io::Error),
}

/// Run a command to completion, capturing combined output.
pub async fn run_captured(spec: &CommandSpec) -> Result<CapturedOutput, ExecError> {
    let (exe, args) = spec.argv.split_first().ok_or(ExecError::EmptyCommand)?;
    let start = std::time::Instant::now();

    let mut command = Command::new(exe);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &spec.workdir {
        command.current_dir(dir);
    }

    let child = command.spawn().map_err(|source| ExecError::Launch {
        program: exe.clone(),
        source,
    })?;

    let output = match spec.timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| ExecError::TimedOut(limit))??,
        None => child.wait_with_output().await?,
    };

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    Ok(CapturedOutput {
        exit_code: output.status.code().unwrap_or(-1),
        output: combined,
        duration: start.elapsed(),
    })
}

/// Convenience for building argv from string literals.
pub fn argv<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}
