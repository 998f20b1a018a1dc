//! Local File System Implementation
//!
//! Implements the FileSystem port for local disk operations.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::domain::ports::file_system::{FileSystem, FsError, FsResult};

/// Local file system implementation
///
/// Walks are exhaustive: hidden files and ignore files are not filtered, a
/// build output directory is deployed as it is. Symlinks are followed and
/// reported under the link's own path.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    /// Create a new LocalFs instance
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFs {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> FsResult<String> {
        std::fs::read_to_string(path).map_err(|e| FsError::at(path, e))
    }

    fn open(&self, path: &Path) -> FsResult<Box<dyn Read + Send>> {
        let file = File::open(path).map_err(|e| FsError::at(path, e))?;
        Ok(Box::new(file))
    }

    fn list_files(&self, dir: &Path) -> FsResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|e| FsError::at(dir, e))? {
            let entry = entry.map_err(|e| FsError::at(dir, e))?;
            if entry.file_type().map_err(|e| FsError::at(dir, e))?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn walk_files(&self, root: &Path) -> FsResult<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(FsError::NotFound(root.to_path_buf()));
        }

        let mut files = Vec::new();
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(true)
            .build();
        for entry in walker {
            let entry = entry.map_err(|e| FsError::Other(e.to_string()))?;
            if entry.file_type().is_some_and(|t| t.is_file()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn walk_files_is_recursive_and_sorted() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("b.dll"));
        touch(&dir.path().join("a").join("z.txt"));
        touch(&dir.path().join(".hidden"));

        let files = LocalFs::new().walk_files(dir.path()).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from(".hidden"),
                PathBuf::from("a").join("z.txt"),
                PathBuf::from("b.dll"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn walk_files_follows_symlinks() {
        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        touch(&outside.path().join("runtimes").join("libnative.so"));
        touch(&outside.path().join("shared.dll"));
        std::os::unix::fs::symlink(outside.path().join("runtimes"), dir.path().join("runtimes"))
            .unwrap();
        std::os::unix::fs::symlink(outside.path().join("shared.dll"), dir.path().join("shared.dll"))
            .unwrap();

        let files = LocalFs::new().walk_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join("runtimes").join("libnative.so"),
                dir.path().join("shared.dll"),
            ]
        );
    }

    #[test]
    fn walk_files_keeps_gitignored_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "*.pdb\n").unwrap();
        touch(&dir.path().join("app.pdb"));

        let files = LocalFs::new().walk_files(dir.path()).unwrap();
        assert!(files.contains(&dir.path().join("app.pdb")));
    }

    #[test]
    fn list_files_is_shallow() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("app.deps.json"));
        touch(&dir.path().join("nested").join("other.deps.json"));

        let files = LocalFs::new().list_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("app.deps.json")]);
    }

    #[test]
    fn walk_missing_root_is_not_found() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            LocalFs::new().walk_files(&missing),
            Err(FsError::NotFound(_))
        ));
    }

    #[test]
    fn open_streams_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.bin");
        std::fs::write(&path, b"payload").unwrap();

        let mut buf = String::new();
        LocalFs::new()
            .open(&path)
            .unwrap()
            .read_to_string(&mut buf)
            .unwrap();
        assert_eq!(buf, "payload");
    }
}
