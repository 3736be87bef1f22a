//! Filesystem operations
//!
//! Typed wrappers over std::fs plus the human-in-the-loop directory removal
//! used when a locked file (an open editor, a running process) blocks the
//! pipeline.

use std::path::Path;

use walkdir::WalkDir;

use crate::cli::prompt::Prompt;
use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory and all its contents
///
/// A missing directory is treated as success.
pub fn remove_dir_all(path: &Path) -> Result<(), FilesystemError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|e| FilesystemError::RemoveDir {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    Ok(())
}

/// Move a directory into place, replacing any previous occupant
pub fn rename(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    remove_dir_all(to)?;
    if let Some(parent) = to.parent() {
        create_dir_all(parent)?;
    }
    std::fs::rename(from, to).map_err(|e| FilesystemError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        error: e.to_string(),
    })
}

/// Copy a directory tree recursively
pub fn copy_dir_all(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| FilesystemError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            error: e.to_string(),
        })?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .expect("walkdir yields paths under its root");
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target).map_err(|e| FilesystemError::Copy {
                from: entry.path().to_path_buf(),
                to: target.clone(),
                error: e.to_string(),
            })?;
        }
    }
    Ok(())
}

/// Copy a single file, creating parent directories of the destination
pub fn copy_file(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    if let Some(parent) = to.parent() {
        create_dir_all(parent)?;
    }
    std::fs::copy(from, to).map_err(|e| FilesystemError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        error: e.to_string(),
    })?;
    Ok(())
}

/// Remove a directory, asking the user to retry on failure
///
/// A missing directory already satisfies the goal. Any other failure is
/// typically a file held open by another process on the host; the user is
/// asked whether to retry (closing the offending application in the
/// meantime) until removal succeeds or they decline.
pub fn remove_dir_with_retry(path: &Path, prompt: &mut dyn Prompt) -> Result<(), FilesystemError> {
    remove_with_retry(path, prompt, |p| std::fs::remove_dir_all(p))
}

fn remove_with_retry(
    path: &Path,
    prompt: &mut dyn Prompt,
    mut remove: impl FnMut(&Path) -> std::io::Result<()>,
) -> Result<(), FilesystemError> {
    loop {
        match remove(path) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                println!(
                    "Error while trying to remove directory {}: {e}",
                    path.display()
                );
                let answer = prompt.query("Do you want to retry?", &["y", "n"], "y");
                if answer == "n" {
                    return Err(FilesystemError::RemoveDir {
                        path: path.to_path_buf(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }
}
