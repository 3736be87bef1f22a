//! AnvilMake adapter
//!
//! Drives the in-house make-like tool produced by the `AnvilIDE/Make`
//! project earlier in the same bootstrap. The executable therefore lives
//! inside the build tree, under the architecture-specific output directory.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::Workspace;
use crate::core::environment::Environment;
use crate::error::BuildError;
use crate::tools::{process, Architecture, BuildTool};

/// Location of the bootstrapped executable, relative to the build root
const EXECUTABLE_SUBPATH: &str = "AnvilIDE/Make/Bin";

/// In-house make-like tool adapter
#[derive(Debug, Clone)]
pub struct AnvilMakeTool {
    executable: PathBuf,
    env: Environment,
}

impl AnvilMakeTool {
    /// Locate the bootstrapped executable for the selected architecture
    pub fn new(workspace: &Workspace, architecture: Architecture) -> Self {
        let executable = workspace
            .build_dir()
            .join(EXECUTABLE_SUBPATH)
            .join(architecture.dir_name())
            .join(executable_name());
        Self {
            executable,
            env: Environment::new(),
        }
    }

    /// Create an adapter around an explicit executable
    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            env: Environment::new(),
        }
    }

    /// Thread the resolved environment into tool invocations
    #[must_use]
    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    /// The wrapped executable path
    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

fn executable_name() -> &'static str {
    if cfg!(windows) {
        "AnvilMake.exe"
    } else {
        "AnvilMake"
    }
}

impl BuildTool for AnvilMakeTool {
    fn name(&self) -> &str {
        "AnvilMake"
    }

    fn build(&self, build_file: &Path, configuration: &str) -> Result<(), BuildError> {
        if !self.executable.exists() {
            return Err(BuildError::ToolNotFound {
                tool: format!("AnvilMake ({})", self.executable.display()),
            });
        }
        let mut command = Command::new(&self.executable);
        command.arg(build_file).arg(configuration);
        process::apply_env(&mut command, &self.env);
        process::run(&mut command, self.name(), build_file)
    }
}
