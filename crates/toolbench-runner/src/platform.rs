//! Per-OS tool names and path conventions.
//!
//! The catalog and project operation sets read these fields instead of
//! branching on the host OS themselves.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub name: &'static str,

    /// Python interpreter executable.
    pub python: &'static str,

    /// C++ compiler driver and the arguments that make it print a version.
    pub cxx: &'static str,
    pub cxx_version_args: &'static [&'static str],

    /// Regex the compiler's version output must match.
    pub cxx_version_pattern: &'static str,

    /// Suffix appended to built executables.
    pub exe_suffix: &'static str,

    /// Directory inside a virtualenv that holds its executables.
    pub venv_bin_dir: &'static str,

    /// Subdirectory multi-config generators place binaries in, if any.
    pub build_config_dir: Option<&'static str>,
}

pub const UNIX: Platform = Platform {
    name: "unix",
    python: "python3",
    cxx: "c++",
    cxx_version_args: &["--version"],
    cxx_version_pattern: r"(?i)(clang|g\+\+|gcc|free software foundation)",
    exe_suffix: "",
    venv_bin_dir: "bin",
    build_config_dir: None,
};

pub const WINDOWS: Platform = Platform {
    name: "windows",
    python: "python",
    cxx: "cl",
    cxx_version_args: &[],
    cxx_version_pattern: "Microsoft",
    exe_suffix: ".exe",
    venv_bin_dir: "Scripts",
    build_config_dir: Some("Debug"),
};

impl Platform {
    /// The table entry for the host this binary was built for.
    pub fn current() -> &'static Platform {
        if cfg!(windows) {
            &WINDOWS
        } else {
            &UNIX
        }
    }

    /// `name` with the platform's executable suffix.
    pub fn exe(&self, name: &str) -> String {
        format!("{name}{}", self.exe_suffix)
    }

    /// Path of a target built by CMake into `build_dir`.
    pub fn built_binary(&self, build_dir: &Path, target: &str) -> PathBuf {
        let dir = match self.build_config_dir {
            Some(config) => build_dir.join(config),
            None => build_dir.to_path_buf(),
        };
        dir.join(self.exe(target))
    }

    /// Interpreter inside a virtualenv rooted at `venv`.
    pub fn venv_python(&self, venv: &Path) -> PathBuf {
        venv.join(self.venv_bin_dir).join(self.exe("python"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_paths() {
        let build = Path::new("/tmp/x/build");
        assert_eq!(
            UNIX.built_binary(build, "hello"),
            PathBuf::from("/tmp/x/build/hello")
        );
        assert_eq!(
            UNIX.venv_python(Path::new("/tmp/venv")),
            PathBuf::from("/tmp/venv/bin/python")
        );
    }

    #[test]
    fn test_windows_paths() {
        let build = Path::new("build");
        assert_eq!(
            WINDOWS.built_binary(build, "hello"),
            Path::new("build").join("Debug").join("hello.exe")
        );
        assert_eq!(
            WINDOWS.venv_python(Path::new("venv")),
            Path::new("venv").join("Scripts").join("python.exe")
        );
    }

    #[test]
    fn test_current_matches_target() {
        let current = Platform::current();
        if cfg!(windows) {
            assert_eq!(current.name, "windows");
        } else {
            assert_eq!(current.python, "python3");
        }
    }
}
