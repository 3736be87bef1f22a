//! Workspace directory layout
//!
//! All paths the orchestrator touches derive from an explicit root directory
//! so the whole pipeline can run against a scratch directory in tests.

use std::path::{Path, PathBuf};

use crate::config::{defaults, urls};

/// The directory layout of one bootstrap run
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Root directory of the run
    root: PathBuf,
    /// Base URL for source archives
    archive_base: String,
}

impl Workspace {
    /// Create a workspace rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            archive_base: urls::SOURCE_ARCHIVE_BASE.to_string(),
        }
    }

    /// Override the source archive base URL
    #[must_use]
    pub fn with_archive_base(mut self, base: &str) -> Self {
        self.archive_base = base.trim_end_matches('/').to_string();
        self
    }

    /// Root directory of the run
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Base URL for source archives
    pub fn archive_base(&self) -> &str {
        &self.archive_base
    }

    /// Directory receiving downloaded archives
    pub fn downloads_dir(&self) -> PathBuf {
        self.root.join(defaults::DOWNLOADS_DIR)
    }

    /// Directory receiving extracted sources and build output
    pub fn build_dir(&self) -> PathBuf {
        self.root.join(defaults::BUILD_DIR)
    }

    /// Directory receiving per-project build logs
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(defaults::LOGS_DIR)
    }

    /// Path of the persisted state snapshot
    pub fn state_file(&self) -> PathBuf {
        self.root.join(defaults::STATE_FILE)
    }

    /// Staging directory for the second bootstrap phase, next to the root
    pub fn second_phase_dir(&self) -> PathBuf {
        match self.root.parent() {
            Some(parent) => parent.join(defaults::SECOND_PHASE_DIR),
            None => self.root.join(defaults::SECOND_PHASE_DIR),
        }
    }

    /// Resolve a path relative to the workspace root
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}
