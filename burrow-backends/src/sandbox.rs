//! Root containment for the local backend

use burrow_core::{path, File, FileOperationError, FileResult};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// How far symlink containment is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Follow {
    /// The operation acts on the entry itself; only its ancestors must resolve
    /// inside the root.
    Entry,
    /// The operation opens whatever the path points at.
    Target,
}

/// Resolves caller paths and refuses any that land outside the root
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a caller-supplied relative path
    pub fn resolve(&self, relative: &str, follow: Follow) -> FileResult<PathBuf> {
        let full = path::resolve(&self.root, relative)?;
        self.contain(&full, follow)?;
        Ok(full)
    }

    /// Absolute path of a listed entry, rebuilt from its directory
    pub fn resolve_file(&self, file: &File<'_>, follow: Follow) -> FileResult<PathBuf> {
        let mut components = Path::new(file.name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return Err(FileOperationError::PermissionDenied),
        }

        let full = file.directory.path().under(&self.root).join(file.name);
        self.contain(&full, follow)?;
        Ok(full)
    }

    fn contain(&self, full: &Path, follow: Follow) -> FileResult<()> {
        let probe = match follow {
            Follow::Target => full,
            Follow::Entry if full == self.root => full,
            Follow::Entry => full.parent().unwrap_or(full),
        };
        self.ensure_contained(probe)
    }

    /// Canonicalize the deepest existing ancestor of `probe` and require it to
    /// sit under the canonical root.
    fn ensure_contained(&self, probe: &Path) -> FileResult<()> {
        let root = fs::canonicalize(&self.root)?;
        let mut probe = probe;
        loop {
            match fs::canonicalize(probe) {
                Ok(real) if real.starts_with(&root) => return Ok(()),
                Ok(real) => {
                    warn!(path = %probe.display(), resolved = %real.display(), "path escapes backend root");
                    return Err(FileOperationError::PermissionDenied);
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => match probe.parent() {
                    Some(parent) => probe = parent,
                    None => return Err(FileOperationError::NotFound),
                },
                Err(err) => return Err(err.into()),
            }
        }
    }
}
