//! Built-in validation categories.

use std::fs;
use std::path::{Path, PathBuf};

use crate::category::{CategoryGroup, CategorySpec};
use crate::exec::argv;
use crate::platform::Platform;
use crate::probe::ProbeSpec;

pub const SYSTEM_TOOLS: &str = "System Tools";
pub const VERSION_CONTROL: &str = "Version Control";
pub const CPP_TOOLCHAIN: &str = "C++ Toolchain";
pub const CPP_BUILD: &str = "C++ Build";
pub const CPP_TESTS: &str = "C++ Tests";
pub const PYTHON_TOOLCHAIN: &str = "Python Toolchain";
pub const PYTHON_ENVIRONMENT: &str = "Python Environment";

const FIXTURE_TARGET: &str = "toolbench_hello";

const FIXTURE_CMAKE: &str = "\
cmake_minimum_required(VERSION 3.14)
project(toolbench_hello CXX)
add_executable(toolbench_hello main.cpp)
";

const FIXTURE_MAIN: &str = "\
#include <iostream>

int main() {
    std::cout << \"Hello from toolbench\" << std::endl;
    return 0;
}
";

/// Which categories a sweep should include.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Selection {
    #[default]
    All,
    Group(CategoryGroup),
    /// A single category by name (case-insensitive).
    Named(String),
}

impl Selection {
    pub fn includes(&self, spec: &CategorySpec) -> bool {
        match self {
            Self::All => true,
            Self::Group(group) => spec.group == *group,
            Self::Named(name) => spec.name.eq_ignore_ascii_case(name),
        }
    }
}

/// Built-in categories for one platform, with fixtures under `scratch`.
#[derive(Debug, Clone)]
pub struct Catalog {
    platform: &'static Platform,
    scratch: PathBuf,
}

impl Catalog {
    pub fn new(platform: &'static Platform, scratch: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            scratch: scratch.into(),
        }
    }

    fn cpp_source_dir(&self) -> PathBuf {
        self.scratch.join("cpp")
    }

    fn cpp_build_dir(&self) -> PathBuf {
        self.scratch.join("cpp-build")
    }

    fn venv_dir(&self) -> PathBuf {
        self.scratch.join("venv")
    }

    /// Write the hello-world C++ project the build categories compile.
    pub fn prepare_fixtures(&self) -> std::io::Result<()> {
        let src = self.cpp_source_dir();
        fs::create_dir_all(&src)?;
        fs::write(src.join("CMakeLists.txt"), FIXTURE_CMAKE)?;
        fs::write(src.join("main.cpp"), FIXTURE_MAIN)?;
        Ok(())
    }

    /// Every built-in category in sweep order.
    pub fn categories(&self) -> Vec<CategorySpec> {
        vec![
            self.system_tools(),
            self.version_control(),
            self.cpp_toolchain(),
            self.cpp_build(),
            self.cpp_tests(),
            self.python_toolchain(),
            self.python_environment(),
        ]
    }

    /// Categories accepted by `selection`, still in sweep order.
    pub fn select(&self, selection: &Selection) -> Vec<CategorySpec> {
        self.categories()
            .into_iter()
            .filter(|c| selection.includes(c))
            .collect()
    }

    fn system_tools(&self) -> CategorySpec {
        CategorySpec::new(
            SYSTEM_TOOLS,
            CategoryGroup::System,
            vec![
                version_probe("git", "git", "git version"),
                version_probe("curl", "curl", "curl"),
                version_probe("make", "make", "Make"),
            ],
        )
    }

    fn version_control(&self) -> CategorySpec {
        CategorySpec::new(
            VERSION_CONTROL,
            CategoryGroup::System,
            vec![
                ProbeSpec::new("git user.name", argv(["git", "config", "user.name"]))
                    .expecting_regex(r"\S"),
                ProbeSpec::new("git user.email", argv(["git", "config", "user.email"]))
                    .expecting("@"),
            ],
        )
    }

    fn cpp_toolchain(&self) -> CategorySpec {
        let p = self.platform;
        let mut compiler = vec![p.cxx.to_string()];
        compiler.extend(p.cxx_version_args.iter().map(|a| a.to_string()));

        CategorySpec::new(
            CPP_TOOLCHAIN,
            CategoryGroup::Cpp,
            vec![
                ProbeSpec::new(p.cxx, compiler).expecting_regex(p.cxx_version_pattern),
                version_regex_probe("cmake", "cmake", r"cmake version \d+"),
                version_regex_probe("ninja", "ninja", r"^\d+\.\d+"),
                version_probe("clang-format", "clang-format", "clang-format version"),
                version_probe("clang-tidy", "clang-tidy", "LLVM"),
            ],
        )
    }

    fn cpp_build(&self) -> CategorySpec {
        let src = path_arg(&self.cpp_source_dir());
        let build = path_arg(&self.cpp_build_dir());
        CategorySpec::new(
            CPP_BUILD,
            CategoryGroup::Cpp,
            vec![
                ProbeSpec::new(
                    "configure",
                    argv(["cmake", "-S", src.as_str(), "-B", build.as_str()]),
                ),
                ProbeSpec::new("build", argv(["cmake", "--build", build.as_str()])),
            ],
        )
    }

    fn cpp_tests(&self) -> CategorySpec {
        let binary = self
            .platform
            .built_binary(&self.cpp_build_dir(), FIXTURE_TARGET);
        CategorySpec::new(
            CPP_TESTS,
            CategoryGroup::Cpp,
            vec![ProbeSpec::new("run fixture", vec![path_arg(&binary)]).expecting("Hello")],
        )
        .after(CPP_BUILD)
    }

    fn python_toolchain(&self) -> CategorySpec {
        let python = self.platform.python;
        CategorySpec::new(
            PYTHON_TOOLCHAIN,
            CategoryGroup::Python,
            vec![
                version_regex_probe(python, python, r"Python 3\.\d+"),
                ProbeSpec::new("pip", argv([python, "-m", "pip", "--version"])).expecting("pip"),
                version_probe("uv", "uv", "uv"),
                version_probe("ruff", "ruff", "ruff"),
                version_probe("mypy", "mypy", "mypy"),
                version_probe("pytest", "pytest", "pytest"),
            ],
        )
    }

    fn python_environment(&self) -> CategorySpec {
        let python = self.platform.python;
        let venv = self.venv_dir();
        let venv_python = path_arg(&self.platform.venv_python(&venv));
        let venv = path_arg(&venv);
        CategorySpec::new(
            PYTHON_ENVIRONMENT,
            CategoryGroup::Python,
            vec![
                ProbeSpec::new(
                    "interpreter >= 3.8",
                    argv([python, "-c", "import sys; print(sys.version_info >= (3, 8))"]),
                )
                .expecting("True"),
                ProbeSpec::new("venv create", argv([python, "-m", "venv", venv.as_str()])),
                ProbeSpec::new(
                    "venv pip",
                    argv([venv_python.as_str(), "-m", "pip", "--version"]),
                )
                .expecting("pip"),
            ],
        )
        .after(PYTHON_TOOLCHAIN)
    }
}

fn version_probe(name: &str, tool: &str, pattern: &str) -> ProbeSpec {
    ProbeSpec::new(name, argv([tool, "--version"])).expecting(pattern)
}

fn version_regex_probe(name: &str, tool: &str, pattern: &str) -> ProbeSpec {
    ProbeSpec::new(name, argv([tool, "--version"])).expecting_regex(pattern)
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{UNIX, WINDOWS};

    #[test]
    fn test_sweep_order_and_dependencies() {
        let catalog = Catalog::new(&UNIX, "/tmp/scratch");
        let cats = catalog.categories();
        let names: Vec<&str> = cats.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                SYSTEM_TOOLS,
                VERSION_CONTROL,
                CPP_TOOLCHAIN,
                CPP_BUILD,
                CPP_TESTS,
                PYTHON_TOOLCHAIN,
                PYTHON_ENVIRONMENT
            ]
        );

        // prerequisites always precede their dependents
        for (i, cat) in cats.iter().enumerate() {
            if let Some(dep) = &cat.depends_on {
                let pos = cats.iter().position(|c| &c.name == dep).unwrap();
                assert!(pos < i, "{} listed before {}", cat.name, dep);
            }
        }
    }

    #[test]
    fn test_group_selection() {
        let catalog = Catalog::new(&UNIX, "/tmp/scratch");
        let python = catalog.select(&Selection::Group(CategoryGroup::Python));
        assert_eq!(python.len(), 2);
        assert!(python.iter().all(|c| c.group == CategoryGroup::Python));
    }

    #[test]
    fn test_named_selection_is_case_insensitive() {
        let catalog = Catalog::new(&UNIX, "/tmp/scratch");
        let picked = catalog.select(&Selection::Named("system tools".to_string()));
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, SYSTEM_TOOLS);
    }

    #[test]
    fn test_platform_drives_tool_names() {
        let unix = Catalog::new(&UNIX, "/s").categories();
        let windows = Catalog::new(&WINDOWS, "/s").categories();

        let first_probe = |cats: &[CategorySpec], name: &str| {
            cats.iter().find(|c| c.name == name).unwrap().probes[0].clone()
        };
        assert_eq!(first_probe(&unix, CPP_TOOLCHAIN).command[0], "c++");
        assert_eq!(first_probe(&windows, CPP_TOOLCHAIN).command[0], "cl");
        assert_eq!(first_probe(&unix, PYTHON_TOOLCHAIN).command[0], "python3");
        assert_eq!(first_probe(&windows, PYTHON_TOOLCHAIN).command[0], "python");
        assert!(first_probe(&windows, CPP_TESTS).command[0].ends_with(".exe"));
    }

    #[test]
    fn test_only_deliberate_patterns_are_regex() {
        use crate::probe::PatternKind;

        let regex: Vec<String> = Catalog::new(&UNIX, "/s")
            .categories()
            .into_iter()
            .flat_map(|c| c.probes)
            .filter(|p| p.pattern_kind == PatternKind::Regex)
            .map(|p| p.name)
            .collect();
        assert_eq!(
            regex,
            vec!["git user.name", "c++", "cmake", "ninja", "python3"]
        );
    }

    #[test]
    fn test_prepare_fixtures_writes_project() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(&UNIX, dir.path());
        catalog.prepare_fixtures().unwrap();

        let cmake = fs::read_to_string(dir.path().join("cpp/CMakeLists.txt")).unwrap();
        assert!(cmake.contains("add_executable(toolbench_hello"));
        assert!(dir.path().join("cpp/main.cpp").exists());
    }
}
