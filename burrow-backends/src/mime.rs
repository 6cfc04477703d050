//! Content-type sniffing

use burrow_core::FileResult;
use std::fs;
use std::io::Read;
use std::os::unix::fs::FileTypeExt;
use std::path::Path;

pub const DIRECTORY: &str = "inode/directory";
pub const EMPTY: &str = "inode/x-empty";
pub const TEXT: &str = "text/plain";
pub const BINARY: &str = "application/octet-stream";

/// Magic-number matcher, built once and shared by every probe
pub struct MimeProbe {
    matchers: infer::Infer,
    sample_size: usize,
}

impl MimeProbe {
    pub fn new(sample_size: usize) -> Self {
        Self {
            matchers: infer::Infer::new(),
            sample_size: sample_size.max(1),
        }
    }

    /// Classify the file at `path` (symlinks followed)
    pub fn probe(&self, path: &Path) -> FileResult<&'static str> {
        let meta = fs::metadata(path)?;
        let file_type = meta.file_type();

        if file_type.is_dir() {
            return Ok(DIRECTORY);
        }
        if file_type.is_fifo() {
            return Ok("inode/fifo");
        }
        if file_type.is_socket() {
            return Ok("inode/socket");
        }
        if file_type.is_char_device() {
            return Ok("inode/chardevice");
        }
        if file_type.is_block_device() {
            return Ok("inode/blockdevice");
        }
        if meta.len() == 0 {
            return Ok(EMPTY);
        }

        let limit = self.sample_size.min(meta.len() as usize);
        let mut sample = Vec::with_capacity(limit);
        fs::File::open(path)?
            .take(limit as u64)
            .read_to_end(&mut sample)?;

        Ok(self.classify(&sample))
    }

    /// Classify an in-memory sample taken from the head of a file
    pub fn classify(&self, sample: &[u8]) -> &'static str {
        if sample.is_empty() {
            return EMPTY;
        }
        if let Some(kind) = self.matchers.get(sample) {
            return kind.mime_type();
        }
        if looks_like_text(sample) {
            TEXT
        } else {
            BINARY
        }
    }
}

impl std::fmt::Debug for MimeProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MimeProbe")
            .field("sample_size", &self.sample_size)
            .finish_non_exhaustive()
    }
}

/// UTF-8 without NULs. A code point cut off by the end of the sample still
/// counts as text.
fn looks_like_text(sample: &[u8]) -> bool {
    if sample.contains(&0) {
        return false;
    }
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[test]
    fn test_classify_magic() {
        let probe = MimeProbe::new(8192);
        assert_eq!(probe.classify(PNG_HEADER), "image/png");
        assert_eq!(probe.classify(b"%PDF-1.7\n"), "application/pdf");
    }

    #[test]
    fn test_classify_text_and_binary() {
        let probe = MimeProbe::new(8192);
        assert_eq!(probe.classify(b"hello world\n"), TEXT);
        assert_eq!(probe.classify("příliš žluťoučký".as_bytes()), TEXT);
        assert_eq!(probe.classify(&[0x01, 0x00, 0xff, 0xfe, 0x00]), BINARY);
        assert_eq!(probe.classify(b""), EMPTY);
    }

    #[test]
    fn test_truncated_code_point_is_text() {
        let bytes = "žž".as_bytes();
        assert!(looks_like_text(&bytes[..3]));
        assert!(!looks_like_text(&[b'a', 0xff, b'b']));
    }

    #[test]
    fn test_probe_files() {
        let tmp = tempfile::tempdir().unwrap();
        let probe = MimeProbe::new(16);

        let png = tmp.path().join("pic");
        std::fs::write(&png, PNG_HEADER).unwrap();
        assert_eq!(probe.probe(&png).unwrap(), "image/png");

        let empty = tmp.path().join("empty");
        std::fs::write(&empty, b"").unwrap();
        assert_eq!(probe.probe(&empty).unwrap(), EMPTY);

        let long_text = tmp.path().join("long.txt");
        std::fs::write(&long_text, "ab".repeat(10_000)).unwrap();
        assert_eq!(probe.probe(&long_text).unwrap(), TEXT);

        assert_eq!(probe.probe(tmp.path()).unwrap(), DIRECTORY);
    }

    #[test]
    fn test_probe_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let probe = MimeProbe::new(8192);
        assert_eq!(
            probe.probe(&tmp.path().join("missing")),
            Err(burrow_core::FileOperationError::NotFound)
        );
    }
}
