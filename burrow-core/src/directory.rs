//! Directory listings
//!
//! A [`Directory`] owns every byte of a listing: one vector of fixed-size
//! records and one name table holding all entry names back to back. Callers
//! see entries as [`File`] views that borrow from the directory, so a name can
//! never outlive the listing it came from, and closing the listing is a single
//! drop.

use crate::error::{FileOperationError, FileResult};
use crate::path::RelativePath;
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::ffi::OsStr;
use std::fmt;
use std::ops::Range;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

/// Entry type as reported by the directory enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    Folder,
    RegularFile,
    /// The OS did not report a type for this entry
    Unknown,
    /// Symlinks, sockets, devices, fifos
    Other,
}

/// Metadata collected for an entry before it is packed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub uid: u32,
    pub gid: u32,
    /// Raw `st_mode`, file type bits included
    pub permissions: u32,
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct FileRecord {
    name: Range<usize>,
    kind: FileType,
    stat: FileStat,
}

/// Builder for a [`Directory`]; every append checks its growth.
#[derive(Debug)]
pub struct DirectoryArena {
    path: RelativePath,
    records: Vec<FileRecord>,
    names: Vec<u8>,
}

impl DirectoryArena {
    pub fn new(path: RelativePath) -> Self {
        Self {
            path,
            records: Vec::new(),
            names: Vec::new(),
        }
    }

    /// Pre-size the arena. Fails with `Unknown` if the memory is unavailable.
    pub fn with_capacity(path: RelativePath, entries: usize, name_bytes: usize) -> FileResult<Self> {
        let mut arena = Self::new(path);
        arena.reserve(entries, name_bytes)?;
        Ok(arena)
    }

    fn reserve(&mut self, entries: usize, name_bytes: usize) -> FileResult<()> {
        self.records
            .try_reserve(entries)
            .map_err(|_| FileOperationError::Unknown)?;
        self.names
            .try_reserve(name_bytes)
            .map_err(|_| FileOperationError::Unknown)?;
        Ok(())
    }

    /// Append one entry. On failure the arena is unchanged.
    pub fn push(&mut self, name: &OsStr, kind: FileType, stat: FileStat) -> FileResult<()> {
        let bytes = name.as_bytes();
        self.reserve(1, bytes.len())?;

        let start = self.names.len();
        self.names.extend_from_slice(bytes);
        self.records.push(FileRecord {
            name: start..self.names.len(),
            kind,
            stat,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn finish(self) -> Directory {
        Directory {
            path: self.path,
            records: self.records,
            names: self.names,
        }
    }
}

/// An open directory listing
pub struct Directory {
    path: RelativePath,
    records: Vec<FileRecord>,
    names: Vec<u8>,
}

impl Directory {
    /// Path of this directory relative to the backend root
    pub fn path(&self) -> &RelativePath {
        &self.path
    }

    pub fn files_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<File<'_>> {
        self.records.get(index).map(|record| self.view(record))
    }

    /// Entries in enumeration order
    pub fn files(&self) -> Files<'_> {
        Files {
            directory: self,
            inner: self.records.iter(),
        }
    }

    pub fn find(&self, name: impl AsRef<OsStr>) -> Option<File<'_>> {
        let name = name.as_ref();
        self.files().find(|file| file.name == name)
    }

    /// Bytes held by the name table
    pub fn name_bytes(&self) -> usize {
        self.names.len()
    }

    fn view<'a>(&'a self, record: &FileRecord) -> File<'a> {
        File {
            name: OsStr::from_bytes(&self.names[record.name.clone()]),
            kind: record.kind,
            size: record.stat.size,
            gid: record.stat.gid,
            uid: record.stat.uid,
            permissions: record.stat.permissions,
            modified: record.stat.modified,
            directory: self,
        }
    }
}

impl fmt::Debug for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directory")
            .field("path", &self.path)
            .field("files_count", &self.files_count())
            .field("files", &self.files().collect::<Vec<_>>())
            .finish()
    }
}

impl Serialize for Directory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Directory", 3)?;
        state.serialize_field("path", &self.path.to_path_string())?;
        state.serialize_field("files_count", &self.files_count())?;
        state.serialize_field("files", &self.files().collect::<Vec<_>>())?;
        state.end()
    }
}

impl<'a> IntoIterator for &'a Directory {
    type Item = File<'a>;
    type IntoIter = Files<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.files()
    }
}

/// Iterator over the entries of a [`Directory`]
pub struct Files<'a> {
    directory: &'a Directory,
    inner: std::slice::Iter<'a, FileRecord>,
}

impl<'a> Iterator for Files<'a> {
    type Item = File<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|record| self.directory.view(record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Files<'_> {}

/// One entry of an open [`Directory`]
#[derive(Clone, Copy, Serialize)]
pub struct File<'a> {
    #[serde(serialize_with = "serialize_name")]
    pub name: &'a OsStr,
    #[serde(rename = "type")]
    pub kind: FileType,
    pub size: u64,
    pub gid: u32,
    pub uid: u32,
    pub permissions: u32,
    pub modified: Option<DateTime<Utc>>,
    /// Listing this entry belongs to
    #[serde(skip)]
    pub directory: &'a Directory,
}

impl File<'_> {
    pub fn is_folder(&self) -> bool {
        self.kind == FileType::Folder
    }

    pub fn is_regular_file(&self) -> bool {
        self.kind == FileType::RegularFile
    }

    pub fn name_lossy(&self) -> std::borrow::Cow<'_, str> {
        self.name.to_string_lossy()
    }

    /// Path of this entry relative to the backend root
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::from(self.directory.path.to_path_string());
        path.push(self.name);
        path
    }
}

impl fmt::Debug for File<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("size", &self.size)
            .field("gid", &self.gid)
            .field("uid", &self.uid)
            .field("permissions", &format_args!("{:o}", self.permissions))
            .finish_non_exhaustive()
    }
}

fn serialize_name<S: Serializer>(name: &&OsStr, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&name.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn stat(size: u64) -> FileStat {
        FileStat {
            size,
            uid: 1000,
            gid: 100,
            permissions: 0o100644,
            modified: None,
        }
    }

    #[test]
    fn test_empty_arena() {
        let dir = DirectoryArena::new(RelativePath::root()).finish();
        assert_eq!(dir.files_count(), 0);
        assert!(dir.is_empty());
        assert_eq!(dir.files().count(), 0);
    }

    #[test]
    fn test_push_packs_names_back_to_back() {
        let mut arena = DirectoryArena::new(RelativePath::parse("docs").unwrap());
        arena.push(OsStr::new("a"), FileType::RegularFile, stat(3)).unwrap();
        arena.push(OsStr::new("bcd"), FileType::Folder, stat(0)).unwrap();
        let dir = arena.finish();

        assert_eq!(dir.files_count(), 2);
        assert_eq!(dir.name_bytes(), 4);

        let a = dir.get(0).unwrap();
        assert_eq!(a.name, "a");
        assert_eq!(a.size, 3);
        assert!(a.is_regular_file());

        let b = dir.get(1).unwrap();
        assert_eq!(b.name, "bcd");
        assert!(b.is_folder());
        assert!(dir.get(2).is_none());
    }

    #[test]
    fn test_files_count_matches_iteration() {
        let mut arena = DirectoryArena::new(RelativePath::root());
        for i in 0..50 {
            arena
                .push(OsStr::new(&format!("entry-{i}")), FileType::RegularFile, stat(i))
                .unwrap();
        }
        let dir = arena.finish();
        assert_eq!(dir.files().len(), dir.files_count());
        let names: HashSet<_> = dir.files().map(|f| f.name_lossy().into_owned()).collect();
        assert_eq!(names.len(), 50);
        assert!(names.contains("entry-49"));
    }

    #[test]
    fn test_non_utf8_names_survive() {
        let raw = OsStr::from_bytes(b"caf\xe9");
        let mut arena = DirectoryArena::new(RelativePath::root());
        arena.push(raw, FileType::RegularFile, stat(0)).unwrap();
        let dir = arena.finish();
        assert_eq!(dir.get(0).unwrap().name.as_bytes(), b"caf\xe9");
        assert!(dir.find(raw).is_some());
    }

    #[test]
    fn test_with_capacity_overflow_is_unknown() {
        let err = DirectoryArena::with_capacity(RelativePath::root(), 0, usize::MAX).unwrap_err();
        assert_eq!(err, FileOperationError::Unknown);
    }

    #[test]
    fn test_relative_path_uses_back_reference() {
        let mut arena = DirectoryArena::new(RelativePath::parse("a/b").unwrap());
        arena.push(OsStr::new("c.txt"), FileType::RegularFile, stat(1)).unwrap();
        let dir = arena.finish();
        let file = dir.find("c.txt").unwrap();
        assert_eq!(file.relative_path(), PathBuf::from("a/b/c.txt"));
        assert!(std::ptr::eq(file.directory, &dir));

        let mut root = DirectoryArena::new(RelativePath::root());
        root.push(OsStr::new("top"), FileType::Folder, stat(0)).unwrap();
        let root = root.finish();
        assert_eq!(root.get(0).unwrap().relative_path(), PathBuf::from("top"));
    }

    #[test]
    fn test_serialize() {
        let mut arena = DirectoryArena::new(RelativePath::parse("docs").unwrap());
        arena.push(OsStr::new("notes.md"), FileType::RegularFile, stat(12)).unwrap();
        let dir = arena.finish();

        let value = serde_json::to_value(&dir).unwrap();
        assert_eq!(value["path"], "docs");
        assert_eq!(value["files_count"], 1);
        assert_eq!(value["files"][0]["name"], "notes.md");
        assert_eq!(value["files"][0]["type"], "RegularFile");
        assert_eq!(value["files"][0]["size"], 12);
        assert!(value["files"][0].get("directory").is_none());
    }
}
