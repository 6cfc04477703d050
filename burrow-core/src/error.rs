//! Error types for Burrow

use std::io;
use thiserror::Error;

/// Result type alias
pub type FileResult<T> = Result<T, FileOperationError>;

/// Closed set of failures a file access backend can report.
///
/// Success is the `Ok` arm of [`FileResult`]; [`status_code`] folds both arms
/// back into the numeric status table.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileOperationError {
    #[error("No such file or directory")]
    NotFound,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Already exists")]
    AlreadyExists,

    #[error("Not a directory")]
    NotADirectory,

    #[error("Is a directory")]
    IsADirectory,

    #[error("No space left")]
    NoSpace,

    #[error("Unknown error")]
    Unknown,
}

/// Status code reported for a successful operation.
pub const SUCCESS_CODE: u8 = 0;

impl FileOperationError {
    /// Map an OS error number to a failure kind. Total over every `i32`.
    pub fn from_errno(errno: i32) -> Self {
        match errno {
            libc::ENOENT => Self::NotFound,
            libc::EACCES | libc::EPERM => Self::PermissionDenied,
            libc::EEXIST => Self::AlreadyExists,
            libc::ENOTDIR => Self::NotADirectory,
            libc::EISDIR => Self::IsADirectory,
            libc::ENOSPC => Self::NoSpace,
            _ => Self::Unknown,
        }
    }

    /// Numeric status, in declaration order after success.
    pub fn code(self) -> u8 {
        match self {
            Self::NotFound => 1,
            Self::PermissionDenied => 2,
            Self::AlreadyExists => 3,
            Self::NotADirectory => 4,
            Self::IsADirectory => 5,
            Self::NoSpace => 6,
            Self::Unknown => 7,
        }
    }

    fn from_kind(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::AlreadyExists => Self::AlreadyExists,
            _ => Self::Unknown,
        }
    }
}

impl From<io::Error> for FileOperationError {
    fn from(err: io::Error) -> Self {
        match err.raw_os_error() {
            Some(errno) => Self::from_errno(errno),
            None => Self::from_kind(err.kind()),
        }
    }
}

impl From<&io::Error> for FileOperationError {
    fn from(err: &io::Error) -> Self {
        match err.raw_os_error() {
            Some(errno) => Self::from_errno(errno),
            None => Self::from_kind(err.kind()),
        }
    }
}

/// Collapse a result into its numeric status.
pub fn status_code<T>(result: &FileResult<T>) -> u8 {
    match result {
        Ok(_) => SUCCESS_CODE,
        Err(e) => e.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_errno() {
        assert_eq!(FileOperationError::from_errno(libc::ENOENT), FileOperationError::NotFound);
        assert_eq!(FileOperationError::from_errno(libc::EACCES), FileOperationError::PermissionDenied);
        assert_eq!(FileOperationError::from_errno(libc::EPERM), FileOperationError::PermissionDenied);
        assert_eq!(FileOperationError::from_errno(libc::EEXIST), FileOperationError::AlreadyExists);
        assert_eq!(FileOperationError::from_errno(libc::ENOTDIR), FileOperationError::NotADirectory);
        assert_eq!(FileOperationError::from_errno(libc::EISDIR), FileOperationError::IsADirectory);
        assert_eq!(FileOperationError::from_errno(libc::ENOSPC), FileOperationError::NoSpace);
    }

    #[test]
    fn test_from_errno_is_total() {
        for errno in [0, -1, libc::EIO, libc::ENOTEMPTY, i32::MAX, i32::MIN] {
            assert_eq!(FileOperationError::from_errno(errno), FileOperationError::Unknown);
        }
    }

    #[test]
    fn test_from_io_error_prefers_raw_code() {
        let err = io::Error::from_raw_os_error(libc::EISDIR);
        assert_eq!(FileOperationError::from(err), FileOperationError::IsADirectory);
    }

    #[test]
    fn test_from_io_error_falls_back_to_kind() {
        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(FileOperationError::from(&err), FileOperationError::NotFound);

        let err = io::Error::new(io::ErrorKind::OutOfMemory, "oom");
        assert_eq!(FileOperationError::from(err), FileOperationError::Unknown);
    }

    #[test]
    fn test_status_code() {
        let ok: FileResult<()> = Ok(());
        assert_eq!(status_code(&ok), SUCCESS_CODE);

        let err: FileResult<()> = Err(FileOperationError::Unknown);
        assert_eq!(status_code(&err), 7);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(FileOperationError::NotFound.to_string(), "No such file or directory");
        assert_eq!(FileOperationError::NoSpace.to_string(), "No space left");
    }
}
