//! Category sweeps: run probes in declared order and aggregate results.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use toolbench_core::obs;
use toolbench_core::{CategoryResult, ProbeResult, ValidationRun};

use crate::probe::{self, ProbeSpec};

/// Coarse grouping used by the CLI's `--*-only` filters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CategoryGroup {
    System,
    Cpp,
    Python,
}

impl CategoryGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Cpp => "cpp",
            Self::Python => "python",
        }
    }
}

/// A named, ordered list of probes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorySpec {
    pub name: String,
    pub group: CategoryGroup,
    pub probes: Vec<ProbeSpec>,

    /// Category that must pass for this one to run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
}

impl CategorySpec {
    pub fn new(name: impl Into<String>, group: CategoryGroup, probes: Vec<ProbeSpec>) -> Self {
        Self {
            name: name.into(),
            group,
            probes,
            depends_on: None,
        }
    }

    pub fn after(mut self, prerequisite: impl Into<String>) -> Self {
        self.depends_on = Some(prerequisite.into());
        self
    }
}

/// Receives sweep progress as it happens.
pub trait ProbeObserver {
    fn category_started(&mut self, _category: &str) {}

    fn probe_finished(&mut self, category: &str, result: &ProbeResult);

    fn category_finished(&mut self, _result: &CategoryResult) {}
}

/// Observer that ignores everything.
pub struct SilentObserver;

impl ProbeObserver for SilentObserver {
    fn probe_finished(&mut self, _category: &str, _result: &ProbeResult) {}
}

/// Sequential category runner.
#[derive(Debug, Clone, Default)]
pub struct CategoryRunner {
    /// Applied to probes that carry no timeout of their own.
    pub default_timeout: Option<Duration>,
}

impl CategoryRunner {
    pub fn new(default_timeout: Option<Duration>) -> Self {
        Self { default_timeout }
    }

    /// Run every probe in order; a failing probe does not stop the rest.
    pub async fn run_category(
        &self,
        name: &str,
        probes: &[ProbeSpec],
        observer: &mut dyn ProbeObserver,
    ) -> CategoryResult {
        observer.category_started(name);
        let mut results = Vec::with_capacity(probes.len());
        for spec in probes {
            let result = probe::execute(spec, self.default_timeout).await;
            obs::emit_probe_finished(name, &result);
            observer.probe_finished(name, &result);
            results.push(result);
        }
        let category = CategoryResult::from_probes(name, results);
        obs::emit_category_finished(&category);
        observer.category_finished(&category);
        category
    }

    /// Run categories in order into a fresh [`ValidationRun`].
    ///
    /// A category whose prerequisite ran earlier in this sweep and did not
    /// pass is recorded as skipped. A prerequisite that is not part of the
    /// sweep does not block.
    pub async fn run_all(
        &self,
        categories: &[CategorySpec],
        observer: &mut dyn ProbeObserver,
    ) -> ValidationRun {
        let mut run = ValidationRun::new();
        for spec in categories {
            if let Some(reason) = blocked_by(&run, spec) {
                obs::emit_category_skipped(&spec.name, spec.depends_on.as_deref().unwrap_or(""));
                let skipped = CategoryResult::skipped(&spec.name, reason);
                observer.category_finished(&skipped);
                run.record(skipped);
                continue;
            }
            let result = self.run_category(&spec.name, &spec.probes, observer).await;
            run.record(result);
        }
        run
    }
}

fn blocked_by(run: &ValidationRun, spec: &CategorySpec) -> Option<String> {
    let prerequisite = spec.depends_on.as_deref()?;
    let prior = run.category(prerequisite)?;
    if prior.all_passed() {
        None
    } else {
        Some(format!("prerequisite '{prerequisite}' did not pass"))
    }
}
