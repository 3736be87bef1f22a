//! Archive descriptors
//!
//! An [`ArchiveDescriptor`] identifies one downloadable unit: the hosted
//! repository it comes from, the branch snapshot to fetch, and where the
//! archive lands locally before and after extraction.

use std::path::{Path, PathBuf};

use crate::config::{defaults, urls, Workspace};

/// One downloadable/extractable unit
#[derive(Debug, Clone)]
pub struct ArchiveDescriptor {
    /// Repository identifier, e.g. `wxWidgets`
    name: String,
    /// Full archive URL
    url: String,
    /// Archived branch
    branch: String,
    /// Local path of the downloaded archive
    download_path: PathBuf,
    /// Directory the archive extracts under
    extract_prefix: PathBuf,
    /// Set once the archive has been extracted and moved into place
    unzipped: bool,
}

impl ArchiveDescriptor {
    /// Create a descriptor for a repository hosted under the bootstrap org
    ///
    /// `group` namespaces both the download path and the extraction prefix,
    /// so archives belonging to one project family land side by side.
    pub fn new(workspace: &Workspace, name: &str, group: Option<&str>) -> Self {
        Self::with_branch(workspace, name, group, defaults::DEFAULT_BRANCH)
    }

    /// Create a descriptor pinned to a specific branch
    pub fn with_branch(
        workspace: &Workspace,
        name: &str,
        group: Option<&str>,
        branch: &str,
    ) -> Self {
        let url = urls::archive_url(
            workspace.archive_base(),
            &format!("{}/{name}", urls::HOSTING_ORG),
            branch,
        );
        let archive_file = format!("{name}-{branch}.zip");
        let (download_path, extract_prefix) = match group {
            Some(group) => (
                workspace.downloads_dir().join(group).join(archive_file),
                workspace.build_dir().join(group),
            ),
            None => (
                workspace.downloads_dir().join(archive_file),
                workspace.build_dir(),
            ),
        };
        Self {
            name: name.to_string(),
            url,
            branch: branch.to_string(),
            download_path,
            extract_prefix,
            unzipped: false,
        }
    }

    /// Repository identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full archive URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Archived branch
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Local path of the downloaded archive
    pub fn download_path(&self) -> &Path {
        &self.download_path
    }

    /// Directory the archive extracts under
    pub fn extract_prefix(&self) -> &Path {
        &self.extract_prefix
    }

    /// Whether the archive has been extracted and moved into place
    pub fn unzipped(&self) -> bool {
        self.unzipped
    }

    /// Mark extraction as complete
    pub(crate) fn set_unzipped(&mut self) {
        self.unzipped = true;
    }

    /// Name of the top-level directory inside the archive
    pub fn archive_root(&self) -> String {
        format!("{}-{}", self.name, self.branch)
    }

    /// Default destination directory after extraction
    pub fn default_destination(&self) -> PathBuf {
        self.extract_prefix.join(&self.name)
    }

    /// Structural equality, ignoring extraction progress
    pub fn is_same(&self, other: &ArchiveDescriptor) -> bool {
        self.name == other.name
            && self.url == other.url
            && self.branch == other.branch
            && self.download_path == other.download_path
            && self.extract_prefix == other.extract_prefix
    }

    /// Short description used in conflict reports
    pub fn describe(&self) -> String {
        format!(
            "{}@{} -> {}",
            self.name,
            self.branch,
            self.extract_prefix.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn workspace() -> Workspace {
        Workspace::new("/work")
    }

    #[test]
    fn grouped_descriptor_namespaces_both_paths() {
        let d = ArchiveDescriptor::new(&workspace(), "Process", Some("Anvil"));
        assert_eq!(
            d.download_path(),
            Path::new("/work/Downloads/Anvil/Process-master.zip")
        );
        assert_eq!(d.extract_prefix(), Path::new("/work/Build/Anvil"));
        assert_eq!(
            d.default_destination(),
            PathBuf::from("/work/Build/Anvil/Process")
        );
    }

    #[test]
    fn ungrouped_descriptor_lands_at_the_roots() {
        let d = ArchiveDescriptor::new(&workspace(), "libgit2", None);
        assert_eq!(
            d.download_path(),
            Path::new("/work/Downloads/libgit2-master.zip")
        );
        assert_eq!(d.extract_prefix(), Path::new("/work/Build"));
    }

    #[test]
    fn url_follows_the_hosted_archive_pattern() {
        let d = ArchiveDescriptor::new(&workspace(), "wxWidgets", None);
        assert_eq!(
            d.url(),
            "https://github.com/anvil-ide/wxWidgets/archive/master.zip"
        );
    }

    #[test]
    fn branch_default_is_the_stable_trunk() {
        let d = ArchiveDescriptor::new(&workspace(), "Errors", Some("Anvil"));
        assert_eq!(d.branch(), "master");
        assert_eq!(d.archive_root(), "Errors-master");
    }

    #[test]
    fn unzipped_starts_false() {
        let d = ArchiveDescriptor::new(&workspace(), "Errors", Some("Anvil"));
        assert!(!d.unzipped());
    }

    proptest! {
        /// Two descriptors built from the same inputs are structurally equal;
        /// changing the group always breaks equality.
        #[test]
        fn prop_structural_equality(name in crate::test_utils::generators::repo_name()) {
            let ws = workspace();
            let a = ArchiveDescriptor::new(&ws, &name, Some("Anvil"));
            let b = ArchiveDescriptor::new(&ws, &name, Some("Anvil"));
            let c = ArchiveDescriptor::new(&ws, &name, None);
            prop_assert!(a.is_same(&b));
            prop_assert!(!a.is_same(&c));
        }

        /// The downloaded file and the extracted root always carry the branch
        /// suffix, whatever the branch is called.
        #[test]
        fn prop_branch_flows_into_derived_names(
            name in crate::test_utils::generators::repo_name(),
            branch in crate::test_utils::generators::branch_name(),
        ) {
            let ws = workspace();
            let d = ArchiveDescriptor::with_branch(&ws, &name, None, &branch);
            prop_assert_eq!(d.archive_root(), format!("{name}-{branch}"));
            let file_name = d.download_path().file_name().unwrap().to_string_lossy().to_string();
            prop_assert_eq!(file_name, format!("{name}-{branch}.zip"));
        }
    }
}
