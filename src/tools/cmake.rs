//! CMake adapter
//!
//! Two-phase generate-then-build against a source directory, with all tool
//! output captured in a per-project log file. When no CMake installation is
//! recorded or on PATH, a pinned release archive is downloaded into the
//! workspace and extracted into the build tree.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::cli::output::StepOutput;
use crate::config::{defaults, urls, Workspace};
use crate::core::environment::Environment;
use crate::core::state::ResumableState;
use crate::error::{BootstrapError, BuildError};
use crate::infra::{download::HttpClient, extract, filesystem};
use crate::tools::{process, Architecture, BuildTool};

/// CMake build driver
#[derive(Debug, Clone)]
pub struct CMakeTool {
    binary: PathBuf,
    generator: Option<String>,
    generation_args: Vec<String>,
    logs_dir: PathBuf,
    env: Environment,
}

impl CMakeTool {
    /// Create an adapter around a CMake binary
    pub fn new(binary: impl Into<PathBuf>, logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            generator: None,
            generation_args: Vec::new(),
            logs_dir: logs_dir.into(),
            env: Environment::new(),
        }
    }

    /// Select the generator passed to the generation phase
    #[must_use]
    pub fn with_generator(mut self, generator: &str) -> Self {
        self.generator = Some(generator.to_string());
        self
    }

    /// Add generation-time arguments
    #[must_use]
    pub fn with_generation_args(mut self, args: &[&str]) -> Self {
        self.generation_args = args.iter().map(ToString::to_string).collect();
        self
    }

    /// Thread the resolved environment into tool invocations
    #[must_use]
    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    /// The wrapped binary path
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn log_file(&self, source_dir: &Path) -> PathBuf {
        let project = source_dir
            .file_name()
            .map_or_else(|| "cmake".to_string(), |n| n.to_string_lossy().to_string());
        self.logs_dir.join(format!("{project}.log"))
    }
}

impl BuildTool for CMakeTool {
    fn name(&self) -> &str {
        "CMake"
    }

    /// Generate then build inside the given source directory
    ///
    /// Both phases append to the same log file, named after the directory
    /// being built.
    fn build(&self, build_file: &Path, configuration: &str) -> Result<(), BuildError> {
        filesystem::create_dir_all(&self.logs_dir).map_err(|e| BuildError::IoError {
            path: self.logs_dir.clone(),
            error: e.to_string(),
        })?;
        let log_path = self.log_file(build_file);
        let open_log = || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .map_err(|e| BuildError::IoError {
                    path: log_path.clone(),
                    error: e.to_string(),
                })
        };

        // Generation phase
        let mut generate = Command::new(&self.binary);
        if let Some(generator) = &self.generator {
            generate.arg("-G").arg(generator);
        }
        for arg in &self.generation_args {
            generate.arg(arg);
        }
        generate
            .arg(".")
            .current_dir(build_file)
            .stdout(open_log()?)
            .stderr(open_log()?);
        process::apply_env(&mut generate, &self.env);
        process::run(&mut generate, self.name(), build_file)?;

        // Build phase
        let mut build = Command::new(&self.binary);
        build
            .arg("--build")
            .arg(".")
            .arg("--config")
            .arg(configuration)
            .current_dir(build_file)
            .stdout(open_log()?)
            .stderr(open_log()?);
        process::apply_env(&mut build, &self.env);
        process::run(&mut build, self.name(), build_file)
    }
}

/// Locate or install the CMake binary for this run
///
/// Preference order: the path recorded in a previous run, a system
/// installation on PATH, and finally the pinned release downloaded into the
/// workspace and extracted under the build root. The chosen path is
/// recorded in state.
pub async fn install(
    workspace: &Workspace,
    architecture: Architecture,
    state: &mut ResumableState,
    client: &HttpClient,
    output: &StepOutput,
) -> Result<PathBuf, BootstrapError> {
    if !state.cmake_path().is_empty() {
        let recorded = PathBuf::from(state.cmake_path());
        if recorded.exists() {
            output.print_detail(&format!("Using previous selection: {}", recorded.display()));
            return Ok(recorded);
        }
        tracing::warn!(path = %recorded.display(), "recorded CMake binary is gone, reinstalling");
    }

    if let Ok(system) = which::which("cmake") {
        output.print_detail(&format!("Using system CMake: {}", system.display()));
        state.set_cmake_path(&system.display().to_string())?;
        return Ok(system);
    }

    let package = release_package(architecture);
    let url = urls::cmake_release_url(defaults::CMAKE_VERSION, &package);
    let archive_path = workspace.downloads_dir().join(format!("{package}.zip"));

    output.print_detail(&format!("Installing CMake {}", defaults::CMAKE_VERSION));
    if !archive_path.exists() {
        client.download(&url, &archive_path).await?;
    }

    let install_root = workspace.build_dir().join(&package);
    filesystem::remove_dir_all(&install_root)?;
    extract::extract_zip(&archive_path, &workspace.build_dir())?;

    let binary = install_root.join("bin").join(binary_name());
    state.set_cmake_path(&binary.display().to_string())?;
    Ok(binary)
}

fn release_package(architecture: Architecture) -> String {
    let platform = if architecture.is_64bit() {
        "win64-x64"
    } else {
        "win32-x86"
    };
    format!("cmake-{}-{platform}", defaults::CMAKE_VERSION)
}

fn binary_name() -> &'static str {
    if cfg!(windows) {
        "cmake.exe"
    } else {
        "cmake"
    }
}
