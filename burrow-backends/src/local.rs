//! Local filesystem backend

use burrow_core::{
    access::{BackendKind, FileAccess},
    config::LocalConfig,
    directory::{Directory, DirectoryArena, File, FileStat, FileType},
    error::{FileOperationError, FileResult},
    process::{ExecutingFile, ProcessLauncher},
    RelativePath,
};
use chrono::{DateTime, Utc};
use std::fs;
use std::os::unix::fs::{DirBuilderExt, MetadataExt};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::launcher::CommandLauncher;
use crate::mime::MimeProbe;
use crate::sandbox::{Follow, Sandbox};
use crate::tree;

/// rwxrwxr-x, before umask
pub const DIRECTORY_MODE: u32 = 0o775;

/// Local filesystem backend
pub struct LocalBackend {
    sandbox: Sandbox,
    follow_symlinks: bool,
    mime: MimeProbe,
    launcher: Box<dyn ProcessLauncher>,
}

impl LocalBackend {
    /// Bind to `config.root`. Touches no files.
    pub fn new(config: &LocalConfig) -> Self {
        info!(root = %config.root.display(), "local backend initialized");
        Self {
            sandbox: Sandbox::new(&config.root),
            follow_symlinks: config.follow_symlinks,
            mime: MimeProbe::new(config.mime_sample_size),
            launcher: Box::new(CommandLauncher),
        }
    }

    pub fn with_launcher(mut self, launcher: Box<dyn ProcessLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn root(&self) -> &Path {
        self.sandbox.root()
    }

    fn classify(file_type: fs::FileType) -> FileType {
        if file_type.is_dir() {
            FileType::Folder
        } else if file_type.is_file() {
            FileType::RegularFile
        } else {
            FileType::Other
        }
    }

    fn stat_entry(&self, path: &Path) -> FileResult<FileStat> {
        let meta = if self.follow_symlinks {
            fs::metadata(path)?
        } else {
            fs::symlink_metadata(path)?
        };

        Ok(FileStat {
            size: meta.len(),
            uid: meta.uid(),
            gid: meta.gid(),
            permissions: meta.mode(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    /// Enumerate `full` into a fresh arena. Any failure drops the arena.
    fn read_listing(&self, relative: RelativePath, full: &Path) -> FileResult<Directory> {
        let mut arena = DirectoryArena::new(relative);

        for entry in fs::read_dir(full)? {
            let entry = entry?;
            let kind = entry
                .file_type()
                .map(Self::classify)
                .unwrap_or(FileType::Unknown);
            let stat = self.stat_entry(&entry.path())?;
            arena.push(&entry.file_name(), kind, stat)?;
        }

        Ok(arena.finish())
    }
}

fn logged<T>(op: &'static str, path: &str, result: FileResult<T>) -> FileResult<T> {
    if let Err(err) = &result {
        warn!(op, path, error = %err, "file operation failed");
    }
    result
}

impl FileAccess for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn display_name(&self) -> &str {
        "Local Filesystem"
    }

    fn deinit(&self) -> bool {
        info!(root = %self.root().display(), "local backend shut down");
        true
    }

    fn list_directory(&self, path: &str) -> FileResult<Directory> {
        debug!(path, "list_directory");
        let result = RelativePath::parse(path).and_then(|relative| {
            let full = self.sandbox.resolve(path, Follow::Target)?;
            self.read_listing(relative, &full)
        });
        logged("list_directory", path, result)
    }

    fn create_directory(&self, path: &str) -> FileResult<Directory> {
        debug!(path, "create_directory");
        let result = RelativePath::parse(path).and_then(|relative| {
            let full = self.sandbox.resolve(path, Follow::Entry)?;
            fs::DirBuilder::new().mode(DIRECTORY_MODE).create(&full)?;
            self.read_listing(relative, &full)
        });
        logged("create_directory", path, result)
    }

    fn delete_directory(&self, path: &str) -> FileResult<()> {
        debug!(path, "delete_directory");
        let result = RelativePath::parse(path).and_then(|relative| {
            if relative.is_root() {
                return Err(FileOperationError::PermissionDenied);
            }
            let full = self.sandbox.resolve(path, Follow::Entry)?;
            tree::delete_tree(&full).map(|_| ())
        });
        logged("delete_directory", path, result)
    }

    fn delete_file(&self, path: &str) -> FileResult<()> {
        debug!(path, "delete_file");
        let result = self
            .sandbox
            .resolve(path, Follow::Entry)
            .and_then(|full| Ok(fs::remove_file(full)?));
        logged("delete_file", path, result)
    }

    fn get_mime_type(&self, file: &File<'_>, mime: &mut [u8]) -> FileResult<usize> {
        let relative = file.relative_path();
        let path = relative.to_string_lossy();
        debug!(path = %path, "get_mime_type");

        let result = self
            .sandbox
            .resolve_file(file, Follow::Target)
            .and_then(|full| self.mime.probe(&full))
            .and_then(|found| {
                let bytes = found.as_bytes();
                let dst = mime
                    .get_mut(..bytes.len())
                    .ok_or(FileOperationError::NoSpace)?;
                dst.copy_from_slice(bytes);
                Ok(bytes.len())
            });
        logged("get_mime_type", &path, result)
    }

    fn execute_file(&self, file: &File<'_>, args: &str) -> FileResult<ExecutingFile> {
        let relative = file.relative_path();
        let path = relative.to_string_lossy();
        debug!(path = %path, args, "execute_file");

        let result = self
            .sandbox
            .resolve_file(file, Follow::Target)
            .and_then(|full| {
                self.launcher.launch(&full, args).map_err(|err| {
                    warn!(path = %full.display(), error = %err, "launch failed");
                    FileOperationError::Unknown
                })
            });
        logged("execute_file", &path, result)
    }
}
