//! Burrow Core
//!
//! Backend-agnostic file access: the dispatch trait, directory listings,
//! error kinds and root-relative path resolution.

pub mod access;
pub mod config;
pub mod directory;
pub mod error;
pub mod path;
pub mod process;

pub use access::{BackendKind, FileAccess, FileAccessState, MIME_TYPE_CAPACITY};
pub use config::{BackendConfig, Config, ConfigError, LocalConfig};
pub use directory::{Directory, DirectoryArena, File, FileStat, FileType};
pub use error::{status_code, FileOperationError, FileResult};
pub use path::RelativePath;
pub use process::{ExecutingFile, ProcessLauncher};
