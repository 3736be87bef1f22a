//! Resumable state
//!
//! A single JSON snapshot records every selection and completion flag of a
//! run. Each mutator rewrites the whole document, so a crash between steps
//! leaves the previous valid snapshot on disk. A missing or malformed file
//! means "no previous state" and never fails the run.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// Persisted portion of the snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
struct Snapshot {
    /// Selected architecture ("32" or "64")
    #[serde(default)]
    architecture: String,

    /// Selected compiler name
    #[serde(default)]
    selected_compiler: String,

    /// Selected build configuration (e.g. "Debug")
    #[serde(default)]
    build_configuration: String,

    /// Path of the installed CMake binary
    #[serde(default)]
    cmake_path: String,

    /// Names of projects that completed a build
    #[serde(default)]
    built_projects: BTreeSet<String>,

    /// Whether the download phase completed
    #[serde(default)]
    download_complete: bool,

    /// Whether the whole build phase completed
    #[serde(default)]
    build_complete: bool,
}

/// Resumable bootstrap state backed by a JSON file
#[derive(Debug)]
pub struct ResumableState {
    path: PathBuf,
    snapshot: Snapshot,
    previous_state_found: bool,
}

impl ResumableState {
    /// Load the snapshot at `path`, or initialize and persist a fresh one
    ///
    /// Read failures of any kind (missing file, malformed JSON) degrade to a
    /// fresh snapshot with `previous_state_found == false`.
    pub fn load_or_init(path: impl Into<PathBuf>) -> Result<Self, StateError> {
        let path = path.into();
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Snapshot>(&content) {
                Ok(snapshot) => Ok(Self {
                    path,
                    snapshot,
                    previous_state_found: true,
                }),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "malformed state file, starting fresh");
                    Self::fresh(path)
                }
            },
            Err(_) => Self::fresh(path),
        }
    }

    fn fresh(path: PathBuf) -> Result<Self, StateError> {
        let state = Self {
            path,
            snapshot: Snapshot::default(),
            previous_state_found: false,
        };
        state.persist()?;
        Ok(state)
    }

    /// Whether a previous snapshot was found on disk
    pub fn previous_state_found(&self) -> bool {
        self.previous_state_found
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Selected architecture, empty when not yet chosen
    pub fn architecture(&self) -> &str {
        &self.snapshot.architecture
    }

    /// Selected compiler, empty when not yet chosen
    pub fn selected_compiler(&self) -> &str {
        &self.snapshot.selected_compiler
    }

    /// Selected build configuration, empty when not yet chosen
    pub fn build_configuration(&self) -> &str {
        &self.snapshot.build_configuration
    }

    /// Recorded CMake binary path, empty when not yet installed
    pub fn cmake_path(&self) -> &str {
        &self.snapshot.cmake_path
    }

    /// Whether the download phase completed
    pub fn download_complete(&self) -> bool {
        self.snapshot.download_complete
    }

    /// Whether the whole build phase completed
    pub fn build_complete(&self) -> bool {
        self.snapshot.build_complete
    }

    /// Whether the named project already completed a build
    pub fn is_project_built(&self, name: &str) -> bool {
        self.snapshot.built_projects.contains(name)
    }

    /// Names of projects that completed a build
    pub fn built_projects(&self) -> &BTreeSet<String> {
        &self.snapshot.built_projects
    }

    /// Record the selected architecture
    pub fn set_architecture(&mut self, architecture: &str) -> Result<(), StateError> {
        self.snapshot.architecture = architecture.to_string();
        self.persist()
    }

    /// Record the selected compiler
    pub fn set_selected_compiler(&mut self, compiler: &str) -> Result<(), StateError> {
        self.snapshot.selected_compiler = compiler.to_string();
        self.persist()
    }

    /// Record the selected build configuration
    pub fn set_build_configuration(&mut self, configuration: &str) -> Result<(), StateError> {
        self.snapshot.build_configuration = configuration.to_string();
        self.persist()
    }

    /// Record the installed CMake binary path
    pub fn set_cmake_path(&mut self, path: &str) -> Result<(), StateError> {
        self.snapshot.cmake_path = path.to_string();
        self.persist()
    }

    /// Record a project build completion (idempotent)
    pub fn set_built_project(&mut self, name: &str) -> Result<(), StateError> {
        self.snapshot.built_projects.insert(name.to_string());
        self.persist()
    }

    /// Record download phase completion
    pub fn set_download_complete(&mut self) -> Result<(), StateError> {
        self.snapshot.download_complete = true;
        self.persist()
    }

    /// Record build phase completion
    pub fn set_build_complete(&mut self) -> Result<(), StateError> {
        self.snapshot.build_complete = true;
        self.persist()
    }

    /// Clear every field to its initial value and persist
    ///
    /// The caller is responsible for discarding the build directory.
    pub fn reset(&mut self) -> Result<(), StateError> {
        self.snapshot = Snapshot::default();
        self.previous_state_found = false;
        self.persist()
    }

    /// Rewrite the whole snapshot
    fn persist(&self) -> Result<(), StateError> {
        let content = serde_json::to_string_pretty(&self.snapshot).map_err(|e| {
            StateError::Persist {
                path: self.path.clone(),
                error: e.to_string(),
            }
        })?;
        std::fs::write(&self.path, content).map_err(|e| StateError::Persist {
            path: self.path.clone(),
            error: e.to_string(),
        })?;
        tracing::debug!(path = %self.path.display(), "state persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn state_path(temp: &TempDir) -> PathBuf {
        temp.path().join("state.json")
    }

    #[test]
    fn test_missing_file_initializes_and_saves_fresh_state() {
        let temp = TempDir::new().unwrap();
        let state = ResumableState::load_or_init(state_path(&temp)).unwrap();

        assert!(!state.previous_state_found());
        assert!(!state.download_complete());
        assert!(state.architecture().is_empty());
        // The fresh snapshot is persisted immediately
        assert!(state_path(&temp).exists());
    }

    #[test]
    fn test_round_trip_preserves_every_field() {
        let temp = TempDir::new().unwrap();
        {
            let mut state = ResumableState::load_or_init(state_path(&temp)).unwrap();
            state.set_architecture("64").unwrap();
            state.set_selected_compiler("Visual Studio 2017").unwrap();
            state.set_build_configuration("Release").unwrap();
            state.set_cmake_path("Build/cmake/bin/cmake.exe").unwrap();
            state.set_built_project("Anvil/Errors").unwrap();
            state.set_built_project("libgit2").unwrap();
            state.set_download_complete().unwrap();
            state.set_build_complete().unwrap();
        }

        let reloaded = ResumableState::load_or_init(state_path(&temp)).unwrap();
        assert!(reloaded.previous_state_found());
        assert_eq!(reloaded.architecture(), "64");
        assert_eq!(reloaded.selected_compiler(), "Visual Studio 2017");
        assert_eq!(reloaded.build_configuration(), "Release");
        assert_eq!(reloaded.cmake_path(), "Build/cmake/bin/cmake.exe");
        assert!(reloaded.is_project_built("Anvil/Errors"));
        assert!(reloaded.is_project_built("libgit2"));
        assert!(reloaded.download_complete());
        assert!(reloaded.build_complete());
    }

    #[test]
    fn test_malformed_file_degrades_to_fresh_state() {
        let temp = TempDir::new().unwrap();
        std::fs::write(state_path(&temp), "{not json").unwrap();

        let state = ResumableState::load_or_init(state_path(&temp)).unwrap();
        assert!(!state.previous_state_found());
        assert!(!state.download_complete());
    }

    #[test]
    fn test_every_setter_persists_immediately() {
        let temp = TempDir::new().unwrap();
        let mut state = ResumableState::load_or_init(state_path(&temp)).unwrap();

        state.set_architecture("32").unwrap();
        let reloaded = ResumableState::load_or_init(state_path(&temp)).unwrap();
        assert_eq!(reloaded.architecture(), "32");

        state.set_built_project("Anvil/Process").unwrap();
        let reloaded = ResumableState::load_or_init(state_path(&temp)).unwrap();
        assert!(reloaded.is_project_built("Anvil/Process"));
    }

    #[test]
    fn test_set_built_project_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let mut state = ResumableState::load_or_init(state_path(&temp)).unwrap();

        state.set_built_project("Anvil/Errors").unwrap();
        state.set_built_project("Anvil/Errors").unwrap();

        assert_eq!(state.built_projects().len(), 1);
    }

    #[test]
    fn test_reset_clears_all_fields() {
        let temp = TempDir::new().unwrap();
        let mut state = ResumableState::load_or_init(state_path(&temp)).unwrap();
        state.set_architecture("64").unwrap();
        state.set_built_project("Anvil/Errors").unwrap();
        state.set_download_complete().unwrap();

        state.reset().unwrap();

        assert!(!state.previous_state_found());
        assert!(state.architecture().is_empty());
        assert!(state.built_projects().is_empty());
        assert!(!state.download_complete());

        let reloaded = ResumableState::load_or_init(state_path(&temp)).unwrap();
        assert!(reloaded.architecture().is_empty());
    }

    proptest! {
        /// Any set of recorded project names survives a save/load cycle.
        #[test]
        fn prop_built_projects_round_trip(names in proptest::collection::btree_set("[A-Za-z][A-Za-z0-9/]{0,20}", 0..8)) {
            let temp = TempDir::new().unwrap();
            {
                let mut state = ResumableState::load_or_init(state_path(&temp)).unwrap();
                for name in &names {
                    state.set_built_project(name).unwrap();
                }
            }
            let reloaded = ResumableState::load_or_init(state_path(&temp)).unwrap();
            prop_assert_eq!(reloaded.built_projects(), &names);
        }
    }
}
