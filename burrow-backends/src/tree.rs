//! Recursive directory removal

use burrow_core::{FileOperationError, FileResult};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Remove `dir` and everything below it, children before parents.
///
/// Symlinks are unlinked, never followed. The first failure ends the walk and
/// is returned; whatever was removed before it stays removed. On success the
/// number of removed nodes, `dir` included, is returned.
pub fn delete_tree(dir: &Path) -> FileResult<usize> {
    if !fs::symlink_metadata(dir)?.is_dir() {
        return Err(FileOperationError::NotADirectory);
    }

    let walk = WalkDir::new(dir)
        .follow_links(false)
        .follow_root_links(false)
        .contents_first(true);

    let mut removed = 0;
    for entry in walk {
        let entry = entry.map_err(walk_error)?;
        let path = entry.path();
        let result = if entry.file_type().is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };
        if let Err(err) = result {
            warn!(path = %path.display(), removed, error = %err, "recursive delete stopped");
            return Err(err.into());
        }
        removed += 1;
    }

    debug!(path = %dir.display(), removed, "directory tree removed");
    Ok(removed)
}

fn walk_error(err: walkdir::Error) -> FileOperationError {
    match err.io_error() {
        Some(io) => io.into(),
        None => FileOperationError::Unknown,
    }
}
