//! Harness prerequisites: things that must exist before a command starts.
//! Unlike probe failures these abort the command.

use std::env;
use std::path::{Path, PathBuf};

use toolbench_core::{HarnessError, Result};

use crate::platform::Platform;

/// Locate `tool` on `PATH`.
pub fn find_in_path(tool: &str, platform: &Platform) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    find_in_dirs(tool, platform, env::split_paths(&path))
}

pub fn find_in_dirs<I>(tool: &str, platform: &Platform, dirs: I) -> Option<PathBuf>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    let exe = platform.exe(tool);
    dirs.into_iter()
        .map(|dir| dir.as_ref().join(&exe))
        .find(|candidate| candidate.is_file())
}

/// Fail with [`HarnessError::PrerequisiteMissing`] unless `tool` is found
/// in `search_dirs`, or on `PATH` when no directories are given.
pub fn require_tool(
    tool: &str,
    platform: &Platform,
    search_dirs: Option<&[PathBuf]>,
) -> Result<PathBuf> {
    let found = match search_dirs {
        Some(dirs) => find_in_dirs(tool, platform, dirs),
        None => find_in_path(tool, platform),
    };
    found.ok_or_else(|| HarnessError::PrerequisiteMissing {
        tool: tool.to_string(),
        reason: "not found in PATH".to_string(),
    })
}

/// Fail with [`HarnessError::ProjectNotFound`] unless `dir` is a directory.
pub fn require_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(HarnessError::ProjectNotFound(dir.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::UNIX;

    #[test]
    fn test_finds_shell() {
        assert!(find_in_path("sh", &UNIX).is_some());
    }

    #[test]
    fn test_missing_tool_is_prerequisite_error() {
        let err = require_tool("toolbench-no-such-gh", &UNIX, None).unwrap_err();
        match err {
            HarnessError::PrerequisiteMissing { tool, .. } => {
                assert_eq!(tool, "toolbench-no-such-gh")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_search_dirs_override_path() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = vec![dir.path().to_path_buf()];
        assert!(require_tool("sh", &UNIX, Some(&dirs)).is_err());

        std::fs::write(dir.path().join("gh"), "").unwrap();
        assert_eq!(
            require_tool("gh", &UNIX, Some(&dirs)).unwrap(),
            dir.path().join("gh")
        );
    }

    #[test]
    fn test_require_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(require_dir(dir.path()).is_ok());
        assert!(require_dir(&dir.path().join("missing")).is_err());
    }
}
