//! Zip archive extraction
//!
//! Native extraction using the zip crate - no external tools required.
//! Entries with unsafe paths (absolute, or escaping the destination) are
//! skipped via `enclosed_name`.

use std::fs::File;
use std::path::Path;

use crate::error::ExtractError;

/// Extract a zip archive into the destination directory
///
/// The destination is created if it does not exist. Returns the number of
/// entries written.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<usize, ExtractError> {
    let file = File::open(archive_path).map_err(|e| ExtractError::Archive {
        path: archive_path.to_path_buf(),
        error: e.to_string(),
    })?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| ExtractError::Archive {
        path: archive_path.to_path_buf(),
        error: e.to_string(),
    })?;

    std::fs::create_dir_all(dest).map_err(|e| ExtractError::IoError {
        path: dest.to_path_buf(),
        error: e.to_string(),
    })?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| ExtractError::Archive {
            path: archive_path.to_path_buf(),
            error: e.to_string(),
        })?;

        let outpath = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            // Skip entries with unsafe paths
            None => continue,
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath).map_err(|e| ExtractError::IoError {
                path: outpath.clone(),
                error: e.to_string(),
            })?;
        } else {
            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ExtractError::IoError {
                    path: parent.to_path_buf(),
                    error: e.to_string(),
                })?;
            }

            let mut outfile = File::create(&outpath).map_err(|e| ExtractError::IoError {
                path: outpath.clone(),
                error: e.to_string(),
            })?;
            std::io::copy(&mut entry, &mut outfile).map_err(|e| ExtractError::IoError {
                path: outpath.clone(),
                error: e.to_string(),
            })?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode)).ok();
                }
            }

            written += 1;
        }
    }

    tracing::debug!(archive = %archive_path.display(), dest = %dest.display(), written, "extracted archive");

    Ok(written)
}
