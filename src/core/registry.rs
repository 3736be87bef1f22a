//! Project registry
//!
//! The ordered sequence of projects making up one bootstrap. Build order is
//! declaration order. The registry owns the merged download set of all its
//! projects, so archive conflicts between projects surface at construction
//! time, before anything touches the network.

use crate::cli::output::StepOutput;
use crate::config::Workspace;
use crate::core::downloader::{DownloadSet, DownloadSummary};
use crate::core::project::{BuildStrategy, Project};
use crate::error::DownloadError;
use crate::infra::download::HttpClient;

/// Ordered collection of projects with their merged download set
#[derive(Debug)]
pub struct ProjectRegistry {
    projects: Vec<Project>,
    downloads: DownloadSet,
}

impl ProjectRegistry {
    /// Build a registry, merging every project's downloads
    ///
    /// Two projects may share an archive only when their descriptors agree
    /// field for field; divergence fails construction.
    pub fn new(workspace: &Workspace, projects: Vec<Project>) -> Result<Self, DownloadError> {
        let mut downloads = DownloadSet::new();
        for project in &projects {
            downloads.merge(project.create_downloader(workspace)?)?;
        }
        Ok(Self {
            projects,
            downloads,
        })
    }

    /// The declared projects, in build order
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Find a project by its full name
    pub fn get(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name() == name)
    }

    /// The merged download set
    pub fn downloads(&self) -> &DownloadSet {
        &self.downloads
    }

    /// Split borrow for the per-project unzip/build loop
    pub fn parts_mut(&mut self) -> (&mut [Project], &mut DownloadSet) {
        (&mut self.projects, &mut self.downloads)
    }

    /// Fetch every archive of every project
    pub async fn download(
        &mut self,
        client: &HttpClient,
        output: &StepOutput,
    ) -> Result<DownloadSummary, DownloadError> {
        self.downloads.download(client, output).await
    }

    /// The project declaring the second-phase staging artifact, if any
    pub fn staging_project(&self) -> Option<&Project> {
        self.projects.iter().find(|p| p.staging_artifact().is_some())
    }
}

/// The Anvil bootstrap sequence
///
/// Declaration order is build order: the shared component libraries first,
/// then the third-party trees they depend on, then the IDE's own make tool,
/// and finally the Workbench built with it.
pub fn default_bootstrap(workspace: &Workspace) -> Result<ProjectRegistry, DownloadError> {
    let projects = vec![
        Project::new("Anvil/Errors", BuildStrategy::Solution)
            .with_env_var("ANVIL")
            .with_build_file("Build/Anvil/Errors/Makefiles/{compiler}/AnvilErrors.sln"),
        Project::new("Anvil/Process", BuildStrategy::Solution)
            .with_env_var("ANVIL")
            .with_build_file("Build/Anvil/Process/Makefiles/{compiler}/AnvilProcess.sln"),
        Project::new("Anvil/Registry", BuildStrategy::Solution)
            .with_env_var("ANVIL")
            .with_build_file("Build/Anvil/Registry/Makefiles/{compiler}/AnvilRegistry.sln"),
        Project::new("Anvil/FileTypes", BuildStrategy::Solution)
            .with_env_var("ANVIL")
            .with_build_file("Build/Anvil/FileTypes/Makefiles/{compiler}/AnvilFileTypes.sln"),
        Project::new("Anvil/TestKit", BuildStrategy::Solution)
            .with_env_var("ANVIL")
            .with_build_file("Build/Anvil/TestKit/Makefiles/{compiler}/AnvilTestKit.sln"),
        // Per-architecture out-of-source build trees
        Project::new("libgit2", BuildStrategy::CMake)
            .with_env_var("LIBGIT2")
            .with_unzip_destinations(&["Build/libgit2/Win32", "Build/libgit2/x64"])
            .with_build_file("Build/libgit2/{arch}"),
        // The toolkit expects its codec vendor trees under src/ with short names
        Project::new("wxWidgets", BuildStrategy::Solution)
            .with_env_var("WXWIDGETS")
            .with_build_file("Build/wxWidgets/build/msw/wx_{compiler}.sln")
            .with_extra_archive("zlib", &["Build/wxWidgets/src/zlib"])
            .with_extra_archive("libpng", &["Build/wxWidgets/src/png"])
            .with_extra_archive("libjpeg", &["Build/wxWidgets/src/jpeg"])
            .with_extra_archive("libtiff", &["Build/wxWidgets/src/tiff"])
            .with_extra_archive("libexpat", &["Build/wxWidgets/src/expat"]),
        Project::new("AnvilIDE/Make", BuildStrategy::Solution)
            .with_env_var("ANVILIDE")
            .with_build_file("Build/AnvilIDE/Make/Makefiles/{compiler}/AnvilMake.sln"),
        Project::new("AnvilIDE/Workbench", BuildStrategy::AnvilMake)
            .with_env_var("ANVILIDE")
            .with_build_file("Build/AnvilIDE/Workbench/Makefiles/AnvilWorkbench.amk")
            .with_test_file("Build/AnvilIDE/Workbench/Bin/{arch}/WorkbenchTests.exe")
            .with_staging_artifact("Build/AnvilIDE/Workbench/Bin/{arch}/Workbench.exe"),
    ];
    ProjectRegistry::new(workspace, projects)
}
