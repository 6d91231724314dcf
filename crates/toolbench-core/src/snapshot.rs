//! Persisted metrics snapshot document.
//!
//! The on-disk document has three top-level sections:
//!
//! ```json
//! {
//!   "project": { "name": "...", "type": "cpp", "path": "...", "timestamp": "..." },
//!   "local_performance": { "lint": { "average": 1.0, "min": 0.8, ... } },
//!   "cicd": { "runs_sampled": 20, "success_rate": 95.0, ... }
//! }
//! ```
//!
//! Successive measurement phases deep-merge into the same document. Writes
//! go through a temp file in the target directory and an atomic rename, so
//! a crashed or interleaved invocation never leaves a torn file behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use crate::domain::benchmark::{BenchmarkMetric, BenchmarkReport, ProjectInfo};
use crate::domain::error::{HarnessError, Result};

pub const PROJECT_SECTION: &str = "project";
pub const LOCAL_SECTION: &str = "local_performance";
pub const CICD_SECTION: &str = "cicd";

/// Sections whose numeric leaves are comparable metrics.
const METRIC_SECTIONS: [&str; 2] = [LOCAL_SECTION, CICD_SECTION];

/// Numeric leaves that count samples. They go to metadata, not metrics.
const SAMPLE_COUNT_LEAVES: [&str; 3] = ["runs", "runs_sampled", "successful_runs"];

/// Flattened view of a snapshot document, keyed by dotted paths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsSnapshot {
    pub project_name: String,
    pub project_type: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub metrics: BTreeMap<String, f64>,
    pub metadata: BTreeMap<String, Value>,
}

impl MetricsSnapshot {
    /// Flatten a snapshot document.
    pub fn from_document(doc: &Value) -> Result<Self> {
        let root = doc
            .as_object()
            .ok_or_else(|| HarnessError::SnapshotFormat("top level is not an object".into()))?;

        let project = root.get(PROJECT_SECTION).and_then(Value::as_object);
        let project_field = |key: &str| {
            project
                .and_then(|p| p.get(key))
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string()
        };
        let timestamp = project
            .and_then(|p| p.get("timestamp"))
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc));

        let mut metrics = BTreeMap::new();
        let mut metadata = BTreeMap::new();
        for section in METRIC_SECTIONS {
            if let Some(value) = root.get(section) {
                flatten_leaves(section, value, &mut metrics, &mut metadata);
            }
        }
        if let Some(project) = project {
            for (key, value) in project {
                if !matches!(key.as_str(), "name" | "type" | "timestamp") {
                    metadata.insert(format!("{PROJECT_SECTION}.{key}"), value.clone());
                }
            }
        }

        Ok(Self {
            project_name: project_field("name"),
            project_type: project_field("type"),
            timestamp,
            metrics,
            metadata,
        })
    }

    /// Read and flatten a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        let doc = load_document(path)?.ok_or_else(|| {
            HarnessError::SnapshotFormat(format!("snapshot file not found: {}", path.display()))
        })?;
        Self::from_document(&doc)
    }

    /// Mean duration of each benchmarked operation, in seconds.
    pub fn operation_averages(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.metrics.iter().filter_map(|(key, &value)| {
            key.strip_prefix(LOCAL_SECTION)?
                .strip_prefix('.')?
                .strip_suffix(".average")
                .map(|op| (op, value))
        })
    }
}

fn is_sample_count(key: &str) -> bool {
    key.rsplit('.')
        .next()
        .is_some_and(|leaf| SAMPLE_COUNT_LEAVES.contains(&leaf))
}

fn flatten_leaves(
    prefix: &str,
    value: &Value,
    metrics: &mut BTreeMap<String, f64>,
    metadata: &mut BTreeMap<String, Value>,
) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_leaves(&format!("{prefix}.{key}"), child, metrics, metadata);
            }
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) if !is_sample_count(prefix) => {
                metrics.insert(prefix.to_string(), f);
            }
            _ => {
                metadata.insert(prefix.to_string(), value.clone());
            }
        },
        other => {
            metadata.insert(prefix.to_string(), other.clone());
        }
    }
}

/// Recursively merge `overlay` into `base`. Objects merge key by key;
/// any other overlay value replaces what was there.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Normalise an operation name into a snapshot key.
pub fn metric_key(operation_name: &str) -> String {
    operation_name
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// `project` section for a document.
pub fn project_section(project: &ProjectInfo, timestamp: DateTime<Utc>) -> Value {
    json!({
        "name": project.name,
        "type": project.project_type.as_str(),
        "path": project.path.display().to_string(),
        "timestamp": timestamp.to_rfc3339(),
    })
}

fn metric_entry(metric: &BenchmarkMetric) -> Value {
    json!({
        "family": metric.family.as_str(),
        "average": metric.average,
        "min": metric.min,
        "max": metric.max,
        "median": metric.median,
        "std_dev": metric.std_dev,
        "runs": metric.run_count(),
        "failed_runs": metric.failed_runs,
        "status": metric.status.to_string(),
    })
}

/// Document fragment holding the `project` and `local_performance` sections.
pub fn benchmark_document(report: &BenchmarkReport) -> Value {
    let mut local = Map::new();
    for metric in &report.metrics {
        local.insert(metric_key(&metric.operation_name), metric_entry(metric));
    }
    let mut doc = Map::new();
    doc.insert(
        PROJECT_SECTION.to_string(),
        project_section(&report.project, report.generated_at),
    );
    doc.insert(LOCAL_SECTION.to_string(), Value::Object(local));
    Value::Object(doc)
}

/// Read a document; `Ok(None)` if the file does not exist.
pub fn load_document(path: &Path) -> Result<Option<Value>> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let doc: Value = serde_json::from_str(&content)?;
            if !doc.is_object() {
                return Err(HarnessError::SnapshotFormat(format!(
                    "{} does not contain a JSON object",
                    path.display()
                )));
            }
            Ok(Some(doc))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write a document via temp file + rename in the same directory.
pub fn write_document_atomic(path: &Path, doc: &Value) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(serde_json::to_string_pretty(doc)?.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| HarnessError::Io(e.error))?;
    Ok(())
}

/// Read-merge-write: fold `overlay` into whatever is at `path` and return
/// the merged document.
pub fn merge_into_file(path: &Path, overlay: Value) -> Result<Value> {
    let mut doc = load_document(path)?.unwrap_or_else(|| Value::Object(Map::new()));
    deep_merge(&mut doc, overlay);
    write_document_atomic(path, &doc)?;
    crate::obs::emit_snapshot_written(path);
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_merge_overrides_and_adds() {
        let mut base = json!({
            "project": { "name": "demo", "type": "cpp" },
            "local_performance": { "lint": { "average": 2.0, "min": 1.5 } }
        });
        deep_merge(
            &mut base,
            json!({
                "local_performance": { "lint": { "average": 1.0 }, "test": { "average": 9.0 } },
                "cicd": { "success_rate": 90.0 }
            }),
        );

        assert_eq!(base["project"]["name"], "demo");
        assert_eq!(base["local_performance"]["lint"]["average"], 1.0);
        assert_eq!(base["local_performance"]["lint"]["min"], 1.5);
        assert_eq!(base["local_performance"]["test"]["average"], 9.0);
        assert_eq!(base["cicd"]["success_rate"], 90.0);
    }

    #[test]
    fn test_deep_merge_scalar_replaces_object() {
        let mut base = json!({ "a": { "b": 1 } });
        deep_merge(&mut base, json!({ "a": 3 }));
        assert_eq!(base, json!({ "a": 3 }));
    }

    #[test]
    fn test_flatten_document() {
        let doc = json!({
            "project": {
                "name": "demo",
                "type": "python",
                "path": "/tmp/demo",
                "timestamp": "2026-01-01T00:00:00+00:00"
            },
            "local_performance": { "lint": { "average": 1.25, "status": "Fast" } },
            "cicd": { "success_rate": 87.5 }
        });
        let snap = MetricsSnapshot::from_document(&doc).unwrap();

        assert_eq!(snap.project_name, "demo");
        assert_eq!(snap.project_type, "python");
        assert!(snap.timestamp.is_some());
        assert_eq!(snap.metrics["local_performance.lint.average"], 1.25);
        assert_eq!(snap.metrics["cicd.success_rate"], 87.5);
        assert_eq!(snap.metadata["local_performance.lint.status"], json!("Fast"));
        assert_eq!(snap.metadata["project.path"], json!("/tmp/demo"));
        assert!(!snap.metrics.contains_key("project.path"));
    }

    #[test]
    fn test_sample_counts_are_metadata() {
        let doc = json!({
            "local_performance": { "lint": { "average": 1.0, "runs": 3, "failed_runs": 0 } },
            "cicd": { "runs_sampled": 20, "successful_runs": 19, "success_rate": 95.0 }
        });
        let snap = MetricsSnapshot::from_document(&doc).unwrap();

        assert_eq!(
            snap.metrics.keys().collect::<Vec<_>>(),
            vec![
                "cicd.success_rate",
                "local_performance.lint.average",
                "local_performance.lint.failed_runs"
            ]
        );
        assert_eq!(snap.metadata["local_performance.lint.runs"], json!(3));
        assert_eq!(snap.metadata["cicd.runs_sampled"], json!(20));
        assert_eq!(snap.metadata["cicd.successful_runs"], json!(19));
    }

    #[test]
    fn test_operation_averages() {
        let doc = json!({
            "local_performance": {
                "lint": { "average": 1.0, "max": 4.0 },
                "test": { "average": 2.5 }
            },
            "cicd": { "average_duration_seconds": 300.0 }
        });
        let snap = MetricsSnapshot::from_document(&doc).unwrap();
        let averages: Vec<_> = snap.operation_averages().collect();
        assert_eq!(averages, vec![("lint", 1.0), ("test", 2.5)]);
    }

    #[test]
    fn test_non_object_document_rejected() {
        assert!(MetricsSnapshot::from_document(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_metric_key_normalises() {
        assert_eq!(metric_key("Full Build"), "full_build");
        assert_eq!(metric_key("  lint "), "lint");
        assert_eq!(metric_key("type-check"), "type_check");
    }

    #[test]
    fn test_merge_into_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("metrics.json");

        merge_into_file(&path, json!({ "local_performance": { "lint": { "average": 3.0 } } }))
            .unwrap();
        let merged = merge_into_file(&path, json!({ "cicd": { "runs_sampled": 5 } })).unwrap();

        assert_eq!(merged["local_performance"]["lint"]["average"], 3.0);
        assert_eq!(merged["cicd"]["runs_sampled"], 5);

        let on_disk = load_document(&path).unwrap().unwrap();
        assert_eq!(on_disk, merged);
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_document(&dir.path().join("absent.json")).unwrap().is_none());
    }
}
