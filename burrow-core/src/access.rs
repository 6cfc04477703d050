//! File access dispatch

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use crate::{
    directory::{Directory, File},
    error::{FileOperationError, FileResult},
    process::ExecutingFile,
};

/// Buffer size used by [`FileAccess::mime_type`]
pub const MIME_TYPE_CAPACITY: usize = 256;

/// Backend families known to the dispatch layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
        }
    }
}

/// Operation table every backend implements.
///
/// All calls block the calling thread. Implementations hold no locks: callers
/// that mutate a subtree from several threads must serialize that themselves.
pub trait FileAccess: Send + Sync {
    fn kind(&self) -> BackendKind;
    fn display_name(&self) -> &str;

    /// Release backend-level resources.
    fn deinit(&self) -> bool;

    fn list_root(&self) -> FileResult<Directory> {
        self.list_directory("")
    }

    /// List `path`. Either every entry is returned or none is.
    fn list_directory(&self, path: &str) -> FileResult<Directory>;

    /// Create `path` and return its (empty) listing.
    fn create_directory(&self, path: &str) -> FileResult<Directory>;

    /// Remove `path` and everything below it. Stops at the first failure,
    /// leaving whatever was already removed gone.
    fn delete_directory(&self, path: &str) -> FileResult<()>;

    fn delete_file(&self, path: &str) -> FileResult<()>;

    fn close_directory(&self, directory: Directory) -> FileResult<()> {
        drop(directory);
        Ok(())
    }

    /// Write the MIME type of `file` into `mime`, returning the bytes written.
    /// A type longer than `mime.len()` fails with `NoSpace` and writes nothing.
    fn get_mime_type(&self, file: &File<'_>, mime: &mut [u8]) -> FileResult<usize>;

    fn execute_file(&self, file: &File<'_>, args: &str) -> FileResult<ExecutingFile>;

    /// Owned convenience wrapper over [`FileAccess::get_mime_type`]
    fn mime_type(&self, file: &File<'_>) -> FileResult<String> {
        let mut buf = [0u8; MIME_TYPE_CAPACITY];
        let len = self.get_mime_type(file, &mut buf)?;
        String::from_utf8(buf[..len].to_vec()).map_err(|_| FileOperationError::Unknown)
    }
}

/// Handle to an initialized backend
pub struct FileAccessState {
    root: PathBuf,
    access: Box<dyn FileAccess>,
}

impl FileAccessState {
    pub fn new(root: impl Into<PathBuf>, access: Box<dyn FileAccess>) -> Self {
        Self {
            root: root.into(),
            access,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn access(&self) -> &dyn FileAccess {
        self.access.as_ref()
    }

    /// Tear the backend down. Consumes the state, so it runs at most once.
    pub fn deinit(self) -> bool {
        self.access.deinit()
    }
}

impl Deref for FileAccessState {
    type Target = dyn FileAccess;

    fn deref(&self) -> &Self::Target {
        self.access.as_ref()
    }
}

impl fmt::Debug for FileAccessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileAccessState")
            .field("root", &self.root)
            .field("kind", &self.access.kind())
            .finish()
    }
}
