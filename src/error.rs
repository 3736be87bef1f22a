//! Error types for anvilboot
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Network error
    #[error("Network error downloading '{url}': {error}")]
    NetworkError { url: String, error: String },

    /// Two registered archives share a URL but disagree on the rest
    #[error("Conflicting archives for '{url}': already registered as {existing}, also requested as {incoming}")]
    Conflict {
        url: String,
        existing: String,
        incoming: String,
    },

    /// No archive registered under the given name
    #[error("No archive named '{name}' is registered")]
    UnknownArchive { name: String },

    /// IO error
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },
}

/// Archive extraction errors
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Archive could not be opened or read
    #[error("Failed to read archive '{path}': {error}")]
    Archive { path: PathBuf, error: String },

    /// The expected top-level directory was missing after extraction
    #[error("Archive '{path}' did not contain directory '{expected}'")]
    MissingRoot { path: PathBuf, expected: String },

    /// IO error
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },
}

/// Environment resolution errors
#[derive(Error, Debug)]
pub enum EnvError {
    /// A required external dependency variable is not set
    #[error("Missing dependency: {variable} environment variable not set")]
    MissingDependency { variable: String },

    /// Two projects require different values for the same variable
    #[error("Conflicting values for environment variable '{variable}': '{existing}' vs '{incoming}'")]
    Conflict {
        variable: String,
        existing: String,
        incoming: String,
    },
}

/// Build errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Resolved build file does not exist on disk
    #[error("Build file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// A template still contained a placeholder after substitution
    #[error("Unresolved token '{token}' in build file template '{template}'")]
    UnresolvedToken { template: String, token: String },

    /// Build tool reported failure
    #[error("Build of '{name}' failed: {error}")]
    Failed { name: String, error: String },

    /// Build tool executable is missing
    #[error("Build tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// The tool has no interactive launch capability
    #[error("{tool} cannot open '{path}' interactively")]
    LaunchUnsupported { tool: String, path: PathBuf },

    /// Tests failed for a project
    #[error("Tests failed for '{name}': {error}")]
    TestsFailed { name: String, error: String },

    /// IO error while driving a build tool
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to move a directory into place
    #[error("Failed to move '{from}' to '{to}': {error}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to copy a file or directory
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },
}

/// State persistence errors
///
/// A failed read degrades to a fresh run and is never surfaced as fatal;
/// a failed write is.
#[derive(Error, Debug)]
pub enum StateError {
    /// Failed to write the state snapshot
    #[error("Failed to persist state to '{path}': {error}")]
    Persist { path: PathBuf, error: String },
}

/// Top-level anvilboot error type
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Download error
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// Extraction error
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Environment error
    #[error("Environment error: {0}")]
    Env(#[from] EnvError),

    /// Build error
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// State error
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Project lookup failure
    #[error("Project '{name}' is not part of the bootstrap")]
    UnknownProject { name: String },

    /// No usable compiler installation was found
    #[error("Missing dependency: no supported compiler installation found")]
    NoCompilerFound,

    /// IO error
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
