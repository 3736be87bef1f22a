//! Build tool adapters
//!
//! Three interchangeable strategies turn a resolved build file into
//! artifacts: a CMake generate+build driver, the compiler/IDE solution
//! driver, and the in-house AnvilMake tool bootstrapped by an earlier
//! project. They share one narrow contract: build the file with a
//! configuration string, or fail.

pub mod anvilmake;
pub mod cmake;
pub mod compiler;
pub(crate) mod process;

use std::path::Path;

use crate::config::defaults;
use crate::error::BuildError;

/// Selected target architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    /// 32-bit build
    X86,
    /// 64-bit build
    X64,
}

impl Architecture {
    /// Parse the stored selection ("32" or "64")
    pub fn from_selection(selection: &str) -> Self {
        if selection == "64" {
            Architecture::X64
        } else {
            Architecture::X86
        }
    }

    /// The selection string persisted in state
    pub fn selection(&self) -> &'static str {
        match self {
            Architecture::X86 => "32",
            Architecture::X64 => "64",
        }
    }

    /// Directory name used for architecture-specific build output
    pub fn dir_name(&self) -> &'static str {
        match self {
            Architecture::X86 => defaults::ARCH_DIR_32,
            Architecture::X64 => defaults::ARCH_DIR_64,
        }
    }

    /// Whether this is a 64-bit build
    pub fn is_64bit(&self) -> bool {
        matches!(self, Architecture::X64)
    }
}

/// Per-tool configuration strings for one run
#[derive(Debug, Clone)]
pub struct BuildConfiguration {
    /// CMake configuration, e.g. `Debug`
    pub cmake_configuration: String,
    /// Solution configuration, e.g. `Debug|x64`
    pub solution_configuration: String,
    /// AnvilMake configuration, e.g. `Microsoft Windows x86_64`
    pub anvilmake_configuration: String,
    /// Short name of the selected compiler, substituted into templates
    pub compiler_short_name: String,
    /// Architecture directory name, substituted into templates
    pub architecture_dir: String,
}

impl BuildConfiguration {
    /// Derive all configuration strings from one selection
    pub fn new(configuration: &str, architecture: Architecture, compiler_short_name: &str) -> Self {
        let (solution_suffix, anvilmake_arch) = match architecture {
            Architecture::X64 => ("x64", "x86_64"),
            Architecture::X86 => ("Win32", "x86"),
        };
        Self {
            cmake_configuration: configuration.to_string(),
            solution_configuration: format!("{configuration}|{solution_suffix}"),
            anvilmake_configuration: format!("Microsoft Windows {anvilmake_arch}"),
            compiler_short_name: compiler_short_name.to_string(),
            architecture_dir: architecture.dir_name().to_string(),
        }
    }
}

/// Contract shared by all build tool adapters
pub trait BuildTool {
    /// Human-readable tool name for error reports
    fn name(&self) -> &str;

    /// Build the given build file with a configuration string
    fn build(&self, build_file: &Path, configuration: &str) -> Result<(), BuildError>;

    /// Open the build file in the tool's interactive environment
    fn launch(&self, build_file: &Path) -> Result<(), BuildError> {
        Err(BuildError::LaunchUnsupported {
            tool: self.name().to_string(),
            path: build_file.to_path_buf(),
        })
    }
}

/// The three adapters available to a run
pub struct BuildToolset {
    cmake: Box<dyn BuildTool>,
    solution: Box<dyn BuildTool>,
    anvilmake: Box<dyn BuildTool>,
}

impl BuildToolset {
    /// Assemble a toolset
    pub fn new(
        cmake: Box<dyn BuildTool>,
        solution: Box<dyn BuildTool>,
        anvilmake: Box<dyn BuildTool>,
    ) -> Self {
        Self {
            cmake,
            solution,
            anvilmake,
        }
    }

    /// The CMake adapter
    pub fn cmake(&self) -> &dyn BuildTool {
        self.cmake.as_ref()
    }

    /// The compiler/IDE solution adapter
    pub fn solution(&self) -> &dyn BuildTool {
        self.solution.as_ref()
    }

    /// The in-house AnvilMake adapter
    pub fn anvilmake(&self) -> &dyn BuildTool {
        self.anvilmake.as_ref()
    }
}

impl std::fmt::Debug for BuildToolset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildToolset")
            .field("cmake", &self.cmake.name())
            .field("solution", &self.solution.name())
            .field("anvilmake", &self.anvilmake.name())
            .finish()
    }
}
