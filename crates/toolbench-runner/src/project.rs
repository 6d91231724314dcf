//! Project detection and the default operation set for each project type.

use std::fs;
use std::path::{Path, PathBuf};

use toolbench_core::{HarnessError, OperationFamily, ProjectInfo, ProjectType, Result};

use crate::exec::argv;
use crate::operation::{OperationSpec, ResetHook};

const CPP_MARKERS: &[&str] = &["CMakeLists.txt"];
const PYTHON_MARKERS: &[&str] = &["pyproject.toml", "setup.py", "requirements.txt"];
const CPP_SOURCE_EXTS: &[&str] = &["cpp", "cc", "cxx", "c"];
const BUILD_DIR: &str = "build";

/// Classify a project directory by its marker files.
pub fn detect(dir: &Path) -> ProjectType {
    let has = |markers: &[&str]| markers.iter().any(|m| dir.join(m).is_file());
    if has(CPP_MARKERS) {
        ProjectType::Cpp
    } else if has(PYTHON_MARKERS) {
        ProjectType::Python
    } else {
        ProjectType::Unknown
    }
}

/// Resolve the project at `dir`, detecting its type unless overridden.
pub fn resolve(dir: &Path, type_override: Option<ProjectType>) -> Result<ProjectInfo> {
    if !dir.is_dir() {
        return Err(HarnessError::ProjectNotFound(dir.to_path_buf()));
    }
    let path = dir.canonicalize()?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    let project_type = type_override.unwrap_or_else(|| detect(&path));
    Ok(ProjectInfo {
        name,
        project_type,
        path,
    })
}

/// C/C++ sources directly under `<dir>/src`, sorted by path.
pub fn cpp_sources(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir.join("src")) else {
        return Vec::new();
    };
    let mut sources: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| CPP_SOURCE_EXTS.contains(&e))
        })
        .collect();
    sources.sort();
    sources
}

/// Operations benchmarked for a project, in run order.
pub fn default_operations(project: &ProjectInfo, timeout_secs: u64) -> Vec<OperationSpec> {
    let ops = match project.project_type {
        ProjectType::Cpp => cpp_operations(&project.path),
        ProjectType::Python => python_operations(&project.path),
        ProjectType::Unknown => Vec::new(),
    };
    ops.into_iter()
        .map(|op| op.with_timeout_secs(timeout_secs))
        .collect()
}

fn cpp_operations(dir: &Path) -> Vec<OperationSpec> {
    let build = dir.join(BUILD_DIR);
    let configure = argv([
        "cmake",
        "-S",
        ".",
        "-B",
        BUILD_DIR,
        "-DCMAKE_EXPORT_COMPILE_COMMANDS=ON",
    ]);
    let compile = argv(["cmake", "--build", BUILD_DIR]);

    let mut ops = vec![
        OperationSpec::new("configure", OperationFamily::Configure, dir)
            .step(configure.clone())
            .with_reset(ResetHook::RemoveDir {
                path: build.clone(),
            }),
        OperationSpec::new("full_build", OperationFamily::Build, dir)
            .step(configure)
            .step(compile.clone())
            .with_reset(ResetHook::RemoveDir { path: build }),
    ];

    let sources = cpp_sources(dir);
    if let Some(first) = sources.first() {
        ops.push(
            OperationSpec::new("incremental_build", OperationFamily::IncrementalBuild, dir)
                .step(compile)
                .with_reset(ResetHook::TouchFile {
                    path: first.clone(),
                }),
        );

        let files: Vec<String> = sources
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let mut lint = argv(["clang-tidy", "-p", BUILD_DIR]);
        lint.extend(files.iter().cloned());
        let mut format = argv(["clang-format", "--dry-run", "--Werror"]);
        format.extend(files);

        ops.push(OperationSpec::new("lint", OperationFamily::Lint, dir).step(lint));
        ops.push(OperationSpec::new("format", OperationFamily::Format, dir).step(format));
    }

    ops.push(
        OperationSpec::new("test", OperationFamily::Test, dir).step(argv([
            "ctest",
            "--test-dir",
            BUILD_DIR,
            "--output-on-failure",
        ])),
    );
    ops
}

fn python_operations(dir: &Path) -> Vec<OperationSpec> {
    vec![
        OperationSpec::new("lint", OperationFamily::Lint, dir).step(argv(["ruff", "check", "."])),
        OperationSpec::new("format", OperationFamily::Format, dir)
            .step(argv(["ruff", "format", "--check", "."])),
        OperationSpec::new("type_check", OperationFamily::TypeCheck, dir)
            .step(argv(["mypy", "."])),
        OperationSpec::new("test", OperationFamily::Test, dir).step(argv(["pytest", "-q"])),
    ]
}
