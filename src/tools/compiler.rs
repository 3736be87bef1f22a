//! Compiler/IDE solution driver
//!
//! Discovers installed compiler driver executables from a candidate table
//! and builds solution files through them. The same driver opens a solution
//! interactively for the `--launch` flow and for post-failure inspection.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::environment::Environment;
use crate::error::BuildError;
use crate::tools::{process, Architecture, BuildTool};

/// One discovered compiler installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerInfo {
    /// Display name, e.g. `Visual Studio 2017`
    pub name: String,
    /// Short name substituted into build file templates, e.g. `VC15`
    pub short_name: String,
    /// Driver executable
    pub driver: PathBuf,
    /// CMake generator matching this compiler
    pub generator: String,
}

impl CompilerInfo {
    /// Generator string for the given architecture
    ///
    /// 64-bit generation uses the `Win64` generator variant.
    pub fn generator_for(&self, architecture: Architecture) -> String {
        if architecture.is_64bit() {
            format!("{} Win64", self.generator)
        } else {
            self.generator.clone()
        }
    }
}

/// Candidate installations probed during discovery
fn candidates() -> Vec<CompilerInfo> {
    vec![
        CompilerInfo {
            name: "Visual Studio 2015".to_string(),
            short_name: "VC14".to_string(),
            driver: PathBuf::from(
                "C:/Program Files (x86)/Microsoft Visual Studio 14.0/Common7/IDE/devenv.exe",
            ),
            generator: "Visual Studio 14 2015".to_string(),
        },
        CompilerInfo {
            name: "Visual Studio 2017".to_string(),
            short_name: "VC15".to_string(),
            driver: PathBuf::from(
                "C:/Program Files (x86)/Microsoft Visual Studio/2017/Community/Common7/IDE/devenv.exe",
            ),
            generator: "Visual Studio 15 2017".to_string(),
        },
    ]
}

/// Probe the host for installed compilers
pub fn discover() -> Vec<CompilerInfo> {
    candidates()
        .into_iter()
        .filter(|candidate| candidate.driver.is_file())
        .collect()
}

/// Solution build adapter around one discovered compiler
#[derive(Debug, Clone)]
pub struct SolutionTool {
    info: CompilerInfo,
    env: Environment,
}

impl SolutionTool {
    /// Create an adapter for a compiler installation
    pub fn new(info: CompilerInfo) -> Self {
        Self {
            info,
            env: Environment::new(),
        }
    }

    /// Thread the resolved environment into driver invocations
    #[must_use]
    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    /// The wrapped compiler installation
    pub fn info(&self) -> &CompilerInfo {
        &self.info
    }
}

impl BuildTool for SolutionTool {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn build(&self, build_file: &Path, configuration: &str) -> Result<(), BuildError> {
        let mut command = Command::new(&self.info.driver);
        command.arg(build_file).arg("/Build").arg(configuration);
        process::apply_env(&mut command, &self.env);
        process::run(&mut command, self.name(), build_file)
    }

    /// Open the solution in the IDE without waiting for it to close
    fn launch(&self, build_file: &Path) -> Result<(), BuildError> {
        let mut command = Command::new(&self.info.driver);
        command.arg(build_file);
        process::apply_env(&mut command, &self.env);
        command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BuildError::ToolNotFound {
                    tool: self.name().to_string(),
                }
            } else {
                BuildError::IoError {
                    path: build_file.to_path_buf(),
                    error: e.to_string(),
                }
            }
        })?;
        Ok(())
    }
}
