//! Root-relative path resolution
//!
//! Caller paths are always interpreted relative to a backend root. Resolution
//! here is purely lexical; symlink containment needs filesystem access and is
//! left to the backend.

use crate::error::{FileOperationError, FileResult};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A normalized path below a backend root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct RelativePath {
    segments: Vec<String>,
}

impl RelativePath {
    /// Parse a caller path. A leading `/` still means "relative to the root".
    ///
    /// Empty and `.` segments are dropped. A `..` segment is refused with
    /// `PermissionDenied`; an interior NUL byte cannot name an OS path and
    /// yields `Unknown`.
    pub fn parse(path: &str) -> FileResult<Self> {
        if path.contains('\0') {
            return Err(FileOperationError::Unknown);
        }

        let mut segments = Vec::new();
        for part in path.split('/') {
            match part {
                "" | "." => {}
                ".." => return Err(FileOperationError::PermissionDenied),
                _ => segments.push(part.to_string()),
            }
        }
        Ok(Self { segments })
    }

    pub fn root() -> Self {
        Self::default()
    }

    pub fn join(&self, path: &str) -> FileResult<Self> {
        let tail = Self::parse(path)?;
        let mut segments = self.segments.clone();
        segments.extend(tail.segments);
        Ok(Self { segments })
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            let mut segments = self.segments.clone();
            segments.pop();
            Some(Self { segments })
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(|s| s.as_str())
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Slash-joined form without a leading slash; the root is `""`.
    pub fn to_path_string(&self) -> String {
        self.segments.join("/")
    }

    /// Absolute location of this path under `root`.
    pub fn under(&self, root: &Path) -> PathBuf {
        let mut real = root.to_path_buf();
        for seg in &self.segments {
            real.push(seg);
        }
        real
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// Join `root` with a caller-supplied path.
///
/// Fails with `Unknown` for an empty root or an unrepresentable path, and with
/// `PermissionDenied` for any path that would climb out of `root`.
pub fn resolve(root: &Path, path: &str) -> FileResult<PathBuf> {
    if root.as_os_str().is_empty() {
        return Err(FileOperationError::Unknown);
    }
    Ok(RelativePath::parse(path)?.under(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let path = RelativePath::parse("home/user/docs").unwrap();
        assert_eq!(path.segments(), ["home", "user", "docs"]);
    }

    #[test]
    fn test_parse_handles_empty_and_dot_segments() {
        let path = RelativePath::parse("//home/./user//").unwrap();
        assert_eq!(path.segments(), ["home", "user"]);
    }

    #[test]
    fn test_parse_empty_is_root() {
        assert!(RelativePath::parse("").unwrap().is_root());
        assert!(RelativePath::parse("/").unwrap().is_root());
        assert!(RelativePath::parse("./.").unwrap().is_root());
    }

    #[test]
    fn test_parse_rejects_parent_segments() {
        assert_eq!(RelativePath::parse(".."), Err(FileOperationError::PermissionDenied));
        assert_eq!(RelativePath::parse("a/../b"), Err(FileOperationError::PermissionDenied));
        assert_eq!(RelativePath::parse("/../etc/passwd"), Err(FileOperationError::PermissionDenied));
    }

    #[test]
    fn test_parse_keeps_dotted_names() {
        let path = RelativePath::parse("...").unwrap();
        assert_eq!(path.name(), Some("..."));
        let path = RelativePath::parse("a/..b").unwrap();
        assert_eq!(path.name(), Some("..b"));
    }

    #[test]
    fn test_parse_rejects_nul() {
        assert_eq!(RelativePath::parse("a\0b"), Err(FileOperationError::Unknown));
    }

    #[test]
    fn test_join() {
        let path = RelativePath::root().join("home").unwrap().join("user/docs").unwrap();
        assert_eq!(path.to_path_string(), "home/user/docs");
        assert!(RelativePath::root().join("../x").is_err());
    }

    #[test]
    fn test_parent_and_name() {
        let path = RelativePath::parse("a/b/c.txt").unwrap();
        assert_eq!(path.name(), Some("c.txt"));
        assert_eq!(path.parent().unwrap().to_path_string(), "a/b");
        assert!(RelativePath::root().parent().is_none());
        assert!(RelativePath::root().name().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(RelativePath::root().to_string(), "/");
        assert_eq!(RelativePath::parse("a/b").unwrap().to_string(), "/a/b");
    }

    #[test]
    fn test_resolve() {
        let resolved = resolve(Path::new("/srv/files"), "/docs/report.txt").unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/files/docs/report.txt"));

        let resolved = resolve(Path::new("/srv/files"), "").unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/files"));
    }

    #[test]
    fn test_resolve_rejects_empty_root() {
        assert_eq!(resolve(Path::new(""), "docs"), Err(FileOperationError::Unknown));
    }

    #[test]
    fn test_resolve_rejects_escape() {
        assert_eq!(
            resolve(Path::new("/srv/files"), "docs/../../etc"),
            Err(FileOperationError::PermissionDenied)
        );
    }
}
