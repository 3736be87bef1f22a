//! Download/dedup management
//!
//! A [`DownloadSet`] owns the archive descriptors of one or more projects.
//! Merging reconciles archives shared between projects: a URL may appear
//! once, and a second registration must match the first field for field.
//! Downloads are sequential; extraction is idempotent per archive.

use std::path::PathBuf;

use crate::cli::output::{substep_label, StepOutput};
use crate::core::archive::ArchiveDescriptor;
use crate::error::{BootstrapError, DownloadError, ExtractError};
use crate::infra::{download::HttpClient, extract, filesystem};

/// Outcome of a download pass
#[derive(Debug, Default)]
pub struct DownloadSummary {
    /// Archives fetched over the network
    pub fetched: Vec<String>,
    /// Archives already on disk
    pub skipped: Vec<String>,
}

/// An ordered, URL-deduplicated collection of archive descriptors
#[derive(Debug, Default)]
pub struct DownloadSet {
    archives: Vec<ArchiveDescriptor>,
}

impl DownloadSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, deduplicating by URL
    ///
    /// A descriptor whose URL is already registered must be structurally
    /// identical to the existing one; divergence is a conflict naming both.
    pub fn add(&mut self, descriptor: ArchiveDescriptor) -> Result<(), DownloadError> {
        if let Some(existing) = self.archives.iter().find(|a| a.url() == descriptor.url()) {
            if existing.is_same(&descriptor) {
                return Ok(());
            }
            return Err(DownloadError::Conflict {
                url: descriptor.url().to_string(),
                existing: existing.describe(),
                incoming: descriptor.describe(),
            });
        }
        self.archives.push(descriptor);
        Ok(())
    }

    /// Incorporate another set's descriptors
    pub fn merge(&mut self, other: DownloadSet) -> Result<(), DownloadError> {
        for descriptor in other.archives {
            self.add(descriptor)?;
        }
        Ok(())
    }

    /// Number of registered archives
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// Iterate over the registered descriptors
    pub fn iter(&self) -> impl Iterator<Item = &ArchiveDescriptor> {
        self.archives.iter()
    }

    /// Fetch every archive not yet on disk, in registration order
    ///
    /// Substep labels (`a`, `b`, ...) follow registration order and exist
    /// only for log correlation.
    pub async fn download(
        &mut self,
        client: &HttpClient,
        output: &StepOutput,
    ) -> Result<DownloadSummary, DownloadError> {
        let mut summary = DownloadSummary::default();
        for (index, archive) in self.archives.iter().enumerate() {
            let label = substep_label(index);
            if archive.download_path().exists() {
                tracing::debug!(name = archive.name(), "archive already on disk");
                summary.skipped.push(archive.name().to_string());
                continue;
            }
            output.print_substep(
                label,
                &format!("Fetching {} code from {}", archive.name(), archive.url()),
            );
            let spinner = crate::cli::output::create_spinner(archive.name());
            let result = client.download(archive.url(), archive.download_path()).await;
            spinner.finish_and_clear();
            result?;
            summary.fetched.push(archive.name().to_string());
        }
        Ok(summary)
    }

    /// Extract an archive and move it into its destination(s)
    ///
    /// No-op when the archive was already unzipped this run. Pre-existing
    /// destinations and a stale same-named extraction directory are removed
    /// first so extraction always lands on clean ground. With multiple
    /// destinations the extracted tree is moved into the first and copied
    /// into the rest. Returns whether an extraction actually happened.
    pub fn unzip(
        &mut self,
        name: &str,
        destinations: Option<&[PathBuf]>,
    ) -> Result<bool, BootstrapError> {
        let archive = self
            .archives
            .iter_mut()
            .find(|a| a.name() == name)
            .ok_or_else(|| DownloadError::UnknownArchive {
                name: name.to_string(),
            })?;

        if archive.unzipped() {
            tracing::debug!(name, "archive already unzipped, skipping");
            return Ok(false);
        }

        let default_destination = [archive.default_destination()];
        let destinations = match destinations {
            Some(dirs) if !dirs.is_empty() => dirs,
            _ => &default_destination,
        };

        // Clean ground: stale temp dir from an interrupted run, then the
        // destinations themselves.
        let extracted_root = archive.extract_prefix().join(archive.archive_root());
        filesystem::remove_dir_all(&extracted_root)?;
        for destination in destinations {
            filesystem::remove_dir_all(destination)?;
        }

        extract::extract_zip(archive.download_path(), archive.extract_prefix())?;

        if !extracted_root.is_dir() {
            return Err(ExtractError::MissingRoot {
                path: archive.download_path().to_path_buf(),
                expected: archive.archive_root(),
            }
            .into());
        }

        let (first, rest) = destinations
            .split_first()
            .expect("destinations is never empty");
        filesystem::rename(&extracted_root, first)?;
        for destination in rest {
            filesystem::copy_dir_all(first, destination)?;
        }

        archive.set_unzipped();
        Ok(true)
    }
}
