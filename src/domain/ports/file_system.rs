//! FileSystem port - abstraction over local file I/O
//!
//! The deployment source tree and the package store are read through this
//! trait so the pipeline can be exercised without touching real disks.

use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for file system operations
pub type FsResult<T> = Result<T, FsError>;

/// File system operation errors
#[derive(Debug, Error)]
pub enum FsError {
    /// File not found
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Permission denied
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(std::io::Error),
    /// Other error
    #[error("{0}")]
    Other(String),
}

impl FsError {
    /// Attach the path an I/O error refers to.
    pub fn at(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path.to_path_buf()),
            _ => FsError::Io(err),
        }
    }
}

impl From<std::io::Error> for FsError {
    fn from(err: std::io::Error) -> Self {
        FsError::at(Path::new(""), err)
    }
}

/// Abstract local file system interface
///
/// Implementations:
/// - `LocalFs` - standard file I/O
/// - test doubles backed by temp directories
pub trait FileSystem: Send + Sync {
    /// Check if path is an existing directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is an existing regular file
    fn is_file(&self, path: &Path) -> bool;

    /// Read file content as string
    fn read_to_string(&self, path: &Path) -> FsResult<String>;

    /// Open a file for streaming reads
    fn open(&self, path: &Path) -> FsResult<Box<dyn Read + Send>>;

    /// Files directly inside `dir`, sorted by name
    fn list_files(&self, dir: &Path) -> FsResult<Vec<PathBuf>>;

    /// Every file below `root` (recursive), sorted by path
    fn walk_files(&self, root: &Path) -> FsResult<Vec<PathBuf>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_error_display() {
        let err = FsError::NotFound(PathBuf::from("test.txt"));
        assert!(err.to_string().contains("test.txt"));
    }

    #[test]
    fn fs_error_at_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let fs_err = FsError::at(Path::new("a/b.dll"), io_err);
        assert!(matches!(fs_err, FsError::NotFound(p) if p == Path::new("a/b.dll")));
    }
}
