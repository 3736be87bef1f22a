//! Projects
//!
//! A project is one buildable unit of the bootstrap: the archive(s) it needs
//! on disk, how the extracted trees are laid out, and which build tool turns
//! its build file into artifacts. Specializations are data, not code: extra
//! co-located archives, fan-out extraction destinations, and renamed vendor
//! directories are all declared per project.

use std::path::PathBuf;
use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;

use crate::cli::prompt::Prompt;
use crate::config::Workspace;
use crate::core::archive::ArchiveDescriptor;
use crate::core::downloader::DownloadSet;
use crate::core::environment::Environment;
use crate::error::{BootstrapError, BuildError, DownloadError};
use crate::tools::{process, BuildConfiguration, BuildToolset};

/// Which adapter builds the project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStrategy {
    /// Download-only, no build step
    None,
    /// CMake generate-then-build
    CMake,
    /// Compiler/IDE solution build
    Solution,
    /// In-house AnvilMake tool
    AnvilMake,
}

/// A third-party archive extracted into the owning project's source tree
#[derive(Debug, Clone)]
pub struct ExtraArchive {
    /// Repository name of the archive
    name: String,
    /// Destination directories, relative to the workspace root
    destinations: Vec<PathBuf>,
}

/// One buildable unit of the bootstrap
#[derive(Debug, Clone)]
pub struct Project {
    name: String,
    env_var: Option<String>,
    build_file: Option<String>,
    test_file: Option<String>,
    staging_artifact: Option<String>,
    strategy: BuildStrategy,
    extra_archives: Vec<ExtraArchive>,
    unzip_destinations: Vec<PathBuf>,
    built: bool,
}

impl Project {
    /// Declare a project
    ///
    /// `name` is hierarchical: `Org/Component` splits into a namespacing
    /// group and the repository name; a bare name has no group.
    pub fn new(name: &str, strategy: BuildStrategy) -> Self {
        Self {
            name: name.to_string(),
            env_var: None,
            build_file: None,
            test_file: None,
            staging_artifact: None,
            strategy,
            extra_archives: Vec::new(),
            unzip_destinations: Vec::new(),
            built: false,
        }
    }

    /// Export an environment variable pointing at this project's group root
    #[must_use]
    pub fn with_env_var(mut self, variable: &str) -> Self {
        self.env_var = Some(variable.to_string());
        self
    }

    /// Declare the build file template, relative to the workspace root
    ///
    /// Templates may contain `{compiler}` and `{arch}` tokens.
    #[must_use]
    pub fn with_build_file(mut self, template: &str) -> Self {
        self.build_file = Some(template.to_string());
        self
    }

    /// Declare a test executable template, run during the test phase
    #[must_use]
    pub fn with_test_file(mut self, template: &str) -> Self {
        self.test_file = Some(template.to_string());
        self
    }

    /// Declare the artifact staged for the second bootstrap phase
    #[must_use]
    pub fn with_staging_artifact(mut self, template: &str) -> Self {
        self.staging_artifact = Some(template.to_string());
        self
    }

    /// Extract an additional archive into the given destinations
    ///
    /// Destinations are relative to the workspace root; pointing one at a
    /// directory named differently from the archive is how vendor trees are
    /// normalized to the names the project's build files expect.
    #[must_use]
    pub fn with_extra_archive(mut self, name: &str, destinations: &[&str]) -> Self {
        self.extra_archives.push(ExtraArchive {
            name: name.to_string(),
            destinations: destinations.iter().map(PathBuf::from).collect(),
        });
        self
    }

    /// Override where this project's own archive is extracted
    ///
    /// Several destinations fan the same tree out, e.g. one copy per
    /// architecture.
    #[must_use]
    pub fn with_unzip_destinations(mut self, destinations: &[&str]) -> Self {
        self.unzip_destinations = destinations.iter().map(PathBuf::from).collect();
        self
    }

    /// Full hierarchical name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespacing group, when the name is hierarchical
    pub fn group(&self) -> Option<&str> {
        self.name.split_once('/').map(|(group, _)| group)
    }

    /// Repository name (the last segment of the hierarchical name)
    pub fn repo_name(&self) -> &str {
        self.name
            .rsplit_once('/')
            .map_or(self.name.as_str(), |(_, repo)| repo)
    }

    /// Build strategy
    pub fn strategy(&self) -> BuildStrategy {
        self.strategy
    }

    /// Whether this project has completed a build this run
    pub fn built(&self) -> bool {
        self.built
    }

    /// Record completion restored from persisted state
    pub fn mark_built(&mut self) {
        self.built = true;
    }

    /// The staged artifact template, when declared
    pub fn staging_artifact(&self) -> Option<&str> {
        self.staging_artifact.as_deref()
    }

    /// The environment binding exported for this project
    pub fn env_binding(&self, workspace: &Workspace) -> Option<(String, PathBuf)> {
        let variable = self.env_var.clone()?;
        let root = match self.group() {
            Some(group) => workspace.build_dir().join(group),
            None => workspace.build_dir().join(self.repo_name()),
        };
        Some((variable, root))
    }

    /// A download set pre-populated with this project's archive(s)
    pub fn create_downloader(&self, workspace: &Workspace) -> Result<DownloadSet, DownloadError> {
        let mut downloads = DownloadSet::new();
        downloads.add(ArchiveDescriptor::new(
            workspace,
            self.repo_name(),
            self.group(),
        ))?;
        for extra in &self.extra_archives {
            downloads.add(ArchiveDescriptor::new(workspace, &extra.name, None))?;
        }
        Ok(downloads)
    }

    /// Extract this project's archive(s) into place
    ///
    /// Safe to call when already unzipped; the download set's idempotence
    /// turns the repeat into a no-op.
    pub fn unzip(
        &self,
        downloads: &mut DownloadSet,
        workspace: &Workspace,
    ) -> Result<(), BootstrapError> {
        let destinations: Vec<PathBuf> = self
            .unzip_destinations
            .iter()
            .map(|d| workspace.resolve(d))
            .collect();
        let destinations = if destinations.is_empty() {
            None
        } else {
            Some(destinations.as_slice())
        };
        downloads.unzip(self.repo_name(), destinations)?;

        for extra in &self.extra_archives {
            let dests: Vec<PathBuf> = extra
                .destinations
                .iter()
                .map(|d| workspace.resolve(d))
                .collect();
            downloads.unzip(&extra.name, Some(&dests))?;
        }
        Ok(())
    }

    /// Resolve the build file template against the run's selections
    pub fn resolve_build_path(
        &self,
        workspace: &Workspace,
        config: &BuildConfiguration,
    ) -> Result<Option<PathBuf>, BuildError> {
        match &self.build_file {
            None => Ok(None),
            Some(template) => Ok(Some(workspace.resolve(resolve_template(template, config)?))),
        }
    }

    /// Build this project with the strategy it declares
    ///
    /// No build file means download-only: the project is marked built
    /// without touching a tool. A resolved path missing from disk is a
    /// declaration error, reported distinctly from a failing build. On a
    /// solution or AnvilMake failure the user may open the build in the IDE
    /// for inspection before the error propagates.
    pub fn build(
        &mut self,
        toolset: &BuildToolset,
        config: &BuildConfiguration,
        workspace: &Workspace,
        prompt: &mut dyn Prompt,
    ) -> Result<(), BuildError> {
        if self.built {
            return Ok(());
        }

        let Some(build_file) = self.resolve_build_path(workspace, config)? else {
            self.built = true;
            return Ok(());
        };

        if !build_file.exists() {
            return Err(BuildError::FileNotFound { path: build_file });
        }

        let result = match self.strategy {
            BuildStrategy::None => Ok(()),
            BuildStrategy::CMake => toolset.cmake().build(&build_file, &config.cmake_configuration),
            BuildStrategy::Solution => toolset
                .solution()
                .build(&build_file, &config.solution_configuration),
            BuildStrategy::AnvilMake => toolset
                .anvilmake()
                .build(&build_file, &config.anvilmake_configuration),
        };

        if let Err(error) = result {
            if matches!(
                self.strategy,
                BuildStrategy::Solution | BuildStrategy::AnvilMake
            ) && matches!(error, BuildError::Failed { .. })
            {
                let answer = prompt.query(
                    "    Compilation failed. Do you want to launch the IDE?",
                    &["y", "n"],
                    "n",
                );
                if answer == "y" {
                    if let Err(launch_error) = toolset.solution().launch(&build_file) {
                        tracing::warn!(error = %launch_error, "IDE launch failed");
                    }
                }
            }
            return Err(error);
        }

        self.built = true;
        Ok(())
    }

    /// Open this project's build file in the IDE
    pub fn launch(
        &self,
        toolset: &BuildToolset,
        config: &BuildConfiguration,
        workspace: &Workspace,
    ) -> Result<(), BuildError> {
        let Some(build_file) = self.resolve_build_path(workspace, config)? else {
            return Err(BuildError::FileNotFound {
                path: workspace.resolve(self.name()),
            });
        };
        if !build_file.exists() {
            return Err(BuildError::FileNotFound { path: build_file });
        }
        toolset.solution().launch(&build_file)
    }

    /// Resolve the staging artifact template, when one is declared
    pub fn resolve_staging_artifact(
        &self,
        workspace: &Workspace,
        config: &BuildConfiguration,
    ) -> Result<Option<PathBuf>, BuildError> {
        match &self.staging_artifact {
            None => Ok(None),
            Some(template) => Ok(Some(workspace.resolve(resolve_template(template, config)?))),
        }
    }

    /// Run this project's test executable, when one is declared
    pub fn run_tests(
        &self,
        workspace: &Workspace,
        config: &BuildConfiguration,
        env: &Environment,
    ) -> Result<bool, BuildError> {
        let Some(template) = &self.test_file else {
            return Ok(false);
        };
        let test_file = workspace.resolve(resolve_template(template, config)?);
        if !test_file.exists() {
            return Err(BuildError::FileNotFound { path: test_file });
        }

        let mut command = Command::new(&test_file);
        process::apply_env(&mut command, env);
        process::run(&mut command, "test runner", &test_file).map_err(|e| match e {
            BuildError::Failed { error, .. } => BuildError::TestsFailed {
                name: self.name.clone(),
                error,
            },
            other => other,
        })?;
        Ok(true)
    }
}

/// Substitute `{compiler}` and `{arch}` tokens
///
/// Resolution is total: any token left after substitution is an error, so
/// an unresolved placeholder can never reach the filesystem.
fn resolve_template(template: &str, config: &BuildConfiguration) -> Result<String, BuildError> {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    let token = TOKEN.get_or_init(|| Regex::new(r"\{[^{}]*\}").expect("valid token pattern"));

    let resolved = template
        .replace("{compiler}", &config.compiler_short_name)
        .replace("{arch}", &config.architecture_dir);

    if let Some(unresolved) = token.find(&resolved) {
        return Err(BuildError::UnresolvedToken {
            template: template.to_string(),
            token: unresolved.as_str().to_string(),
        });
    }
    Ok(resolved)
}
