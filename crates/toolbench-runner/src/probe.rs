//! Command probes: launch a tool, check its exit status and output.

use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use toolbench_core::{ProbeFailure, ProbeResult};

use crate::exec::{run_captured, CommandSpec, ExecError};

/// Longest output excerpt kept in a pattern-mismatch failure.
const MISMATCH_EXCERPT_CHARS: usize = 120;

/// How [`ProbeSpec::expected_pattern`] is matched against the output.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Plain substring search.
    #[default]
    Literal,
    /// Regular expression. A pattern that does not compile is searched for
    /// as a substring instead.
    Regex,
}

impl PatternKind {
    pub fn matches(&self, pattern: &str, output: &str) -> bool {
        match self {
            Self::Literal => output.contains(pattern),
            Self::Regex => match Regex::new(pattern) {
                Ok(re) => re.is_match(output),
                Err(_) => output.contains(pattern),
            },
        }
    }
}

/// Declarative description of one probe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeSpec {
    /// Probe name (usually the tool name).
    pub name: String,

    /// Command to execute (first element is executable).
    pub command: Vec<String>,

    /// Text the output must contain, interpreted per `pattern_kind`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_pattern: Option<String>,

    #[serde(default)]
    pub pattern_kind: PatternKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,

    /// Per-probe timeout; falls back to the runner's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ProbeSpec {
    pub fn new(name: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command,
            expected_pattern: None,
            pattern_kind: PatternKind::Literal,
            workdir: None,
            timeout_secs: None,
        }
    }

    /// Require `pattern` to appear verbatim in the output.
    pub fn expecting(mut self, pattern: impl Into<String>) -> Self {
        self.expected_pattern = Some(pattern.into());
        self.pattern_kind = PatternKind::Literal;
        self
    }

    /// Require the output to match the regular expression `pattern`.
    pub fn expecting_regex(mut self, pattern: impl Into<String>) -> Self {
        self.expected_pattern = Some(pattern.into());
        self.pattern_kind = PatternKind::Regex;
        self
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    fn command_spec(&self, default_timeout: Option<Duration>) -> CommandSpec {
        let timeout = self
            .timeout_secs
            .map(Duration::from_secs)
            .or(default_timeout);
        let mut spec = CommandSpec::new(self.command.clone()).with_timeout(timeout);
        if let Some(dir) = &self.workdir {
            spec = spec.in_dir(dir);
        }
        spec
    }
}

/// Decide the failure (if any) for a process that ran to completion.
pub fn evaluate(
    exit_code: i32,
    output: &str,
    expected: Option<&str>,
    kind: PatternKind,
) -> Option<ProbeFailure> {
    if exit_code != 0 {
        return Some(ProbeFailure::ToolFailed { exit_code });
    }
    match expected {
        Some(pattern) if !kind.matches(pattern, output) => {
            Some(ProbeFailure::PatternMismatch {
                expected: pattern.to_string(),
                actual: excerpt(output),
            })
        }
        _ => None,
    }
}

fn excerpt(output: &str) -> String {
    let line = output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    line.chars().take(MISMATCH_EXCERPT_CHARS).collect()
}

/// Failure for a command that never produced an exit status.
fn launch_failure(err: &ExecError) -> ProbeFailure {
    match err {
        ExecError::TimedOut(after) => ProbeFailure::TimedOut {
            after_secs: after.as_secs(),
        },
        // the process started, so the tool exists
        ExecError::Wait(_) => ProbeFailure::ToolFailed { exit_code: -1 },
        ExecError::EmptyCommand | ExecError::Launch { .. } => ProbeFailure::ToolMissing {
            reason: err.to_string(),
        },
    }
}

/// Run one probe. Never fails: launch errors and timeouts become a failed
/// [`ProbeResult`].
pub async fn execute(spec: &ProbeSpec, default_timeout: Option<Duration>) -> ProbeResult {
    let cmd = spec.command_spec(default_timeout);
    let started = std::time::Instant::now();

    let (exit_code, output, error) = match run_captured(&cmd).await {
        Ok(captured) => {
            let error = evaluate(
                captured.exit_code,
                &captured.output,
                spec.expected_pattern.as_deref(),
                spec.pattern_kind,
            );
            (captured.exit_code, captured.output, error)
        }
        Err(e) => (-1, String::new(), Some(launch_failure(&e))),
    };

    ProbeResult {
        name: spec.name.clone(),
        command: cmd.display(),
        expected_pattern: spec.expected_pattern.clone(),
        passed: error.is_none(),
        output,
        error,
        exit_code,
        duration_ms: started.elapsed().as_millis() as u64,
    }
}
