//! Source archive URLs

/// Base URL for source archives (GitHub)
pub const SOURCE_ARCHIVE_BASE: &str = "https://github.com";

/// Hosting organization all bootstrap sources are mirrored under
pub const HOSTING_ORG: &str = "anvil-ide";

/// CMake release download base URL
pub const CMAKE_DOWNLOAD: &str = "https://github.com/Kitware/CMake/releases/download";

/// Build the archive URL for a branch snapshot of a hosted repository
///
/// `repo` is the `org/name` pair, e.g. `anvil-ide/wxWidgets`.
pub fn archive_url(base: &str, repo: &str, branch: &str) -> String {
    format!("{base}/{repo}/archive/{branch}.zip")
}

/// Build the download URL for a pinned CMake release archive
pub fn cmake_release_url(version: &str, package: &str) -> String {
    format!("{CMAKE_DOWNLOAD}/v{version}/{package}.zip")
}
