//! 標準ファイルシステム実装（std::fs を委譲）

use crate::error::Error;
use crate::ports::outbound::{FileMetadata, FileSystem};
use std::path::{Path, PathBuf};

/// 標準ライブラリの fs をそのまま委譲する FileSystem 実装
#[derive(Debug, Clone, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, Error> {
        std::fs::read_to_string(path).map_err(|e| {
            Error::io_msg(format!("Failed to read '{}': {}", path.display(), e))
        })
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, Error> {
        std::fs::read(path).map_err(|e| {
            Error::io_msg(format!("Failed to read '{}': {}", path.display(), e))
        })
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), Error> {
        std::fs::write(path, contents).map_err(|e| {
            Error::io_msg(format!("Failed to write '{}': {}", path.display(), e))
        })
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), Error> {
        std::fs::rename(from, to).map_err(|e| {
            Error::io_msg(format!(
                "Failed to rename '{}' to '{}': {}",
                from.display(),
                to.display(),
                e
            ))
        })
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), Error> {
        std::fs::copy(from, to).map(|_| ()).map_err(|e| {
            Error::io_msg(format!(
                "Failed to copy '{}' to '{}': {}",
                from.display(),
                to.display(),
                e
            ))
        })
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), Error> {
        std::fs::create_dir_all(path).map_err(|e| {
            Error::io_msg(format!("Failed to create directory '{}': {}", path.display(), e))
        })
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata, Error> {
        let m = std::fs::metadata(path).map_err(|e| {
            Error::io_msg(format!(
                "Failed to get metadata for '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(FileMetadata::new(
            m.len(),
            m.is_file(),
            m.is_dir(),
            m.modified().ok(),
        ))
    }

    fn remove_file(&self, path: &Path) -> Result<(), Error> {
        std::fs::remove_file(path).map_err(|e| {
            Error::io_msg(format!("Failed to remove file '{}': {}", path.display(), e))
        })
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, Error> {
        let entries = std::fs::read_dir(path).map_err(|e| {
            Error::io_msg(format!(
                "Failed to read directory '{}': {}",
                path.display(),
                e
            ))
        })?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                Error::io_msg(format!("Failed to read directory entry: {}", e))
            })?;
            paths.push(entry.path());
        }
        Ok(paths)
    }

    fn open_append(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>, Error> {
        let f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                Error::io_msg(format!("Failed to open '{}' for append: {}", path.display(), e))
            })?;
        Ok(Box::new(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_copy_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let fs = StdFileSystem;
        let src = dir.path().join("a.jsonl");
        let dst = dir.path().join("b.jsonl");
        fs.write(&src, "{}\n").unwrap();
        fs.copy(&src, &dst).unwrap();
        assert_eq!(fs.read_to_string(&dst).unwrap(), "{}\n");
        let meta = fs.metadata(&dst).unwrap();
        assert!(meta.is_file());
        assert_eq!(meta.len(), 3);
        assert!(meta.modified().is_some());
    }

    #[test]
    fn test_open_append_appends() {
        let dir = tempfile::tempdir().unwrap();
        let fs = StdFileSystem;
        let path = dir.path().join("log.jsonl");
        {
            let mut w = fs.open_append(&path).unwrap();
            w.write_all(b"one\n").unwrap();
        }
        {
            let mut w = fs.open_append(&path).unwrap();
            w.write_all(b"two\n").unwrap();
        }
        assert_eq!(fs.read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let fs = StdFileSystem;
        let err = fs.read_to_string(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!fs.exists(&dir.path().join("nope")));
    }
}
