//! File Synchronizer
//!
//! Uploads resolved dependencies and the local payload tree. Transfers are
//! strictly sequential and the first failure aborts the pass; files already
//! uploaded stay on the remote side.

use std::path::{Path, PathBuf};

use crate::domain::entities::Dependency;
use crate::domain::ports::{DeployEvent, DeployEventSink, FileChannel, FileSystem};
use crate::domain::value_objects::{ExclusionRules, RemotePath};
use crate::error::{DeployError, DeployResult};

use super::remote_path_preparer::RemotePathPreparer;

/// Counts reported by one synchronization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub uploaded: usize,
    pub excluded: usize,
    pub bytes: u64,
}

pub struct FileSynchronizer<'a> {
    file_system: &'a dyn FileSystem,
    files: &'a dyn FileChannel,
    preparer: &'a RemotePathPreparer<'a>,
    events: &'a dyn DeployEventSink,
    package_store: Option<PathBuf>,
}

impl<'a> FileSynchronizer<'a> {
    pub fn new(
        file_system: &'a dyn FileSystem,
        files: &'a dyn FileChannel,
        preparer: &'a RemotePathPreparer<'a>,
        events: &'a dyn DeployEventSink,
    ) -> Self {
        Self {
            file_system,
            files,
            preparer,
            events,
            package_store: None,
        }
    }

    /// Root of the local package store dependencies are read from.
    pub fn with_package_store(mut self, root: Option<PathBuf>) -> Self {
        self.package_store = root;
        self
    }

    /// Upload every dependency to `target_root/<file name>`.
    ///
    /// Package-internal directories are flattened away.
    pub fn upload_dependencies(
        &self,
        target_root: &RemotePath,
        dependencies: &[Dependency],
    ) -> DeployResult<UploadSummary> {
        self.events.on_event(DeployEvent::DependenciesStarted {
            count: dependencies.len(),
        });

        let mut summary = UploadSummary::default();
        if dependencies.is_empty() {
            return Ok(summary);
        }

        self.preparer.ensure_directory(target_root)?;

        for dependency in dependencies {
            let remote = target_root.join(dependency.file_name());
            let local = self.locate(dependency, &remote)?;

            summary.bytes += self.upload_one(&local, &remote)?;
            summary.uploaded += 1;
            tracing::debug!(
                name = dependency.name(),
                version = dependency.version(),
                remote = %remote,
                "uploaded dependency"
            );
            self.events.on_event(DeployEvent::DependencyUploaded {
                name: dependency.name().to_string(),
                remote,
            });
        }
        Ok(summary)
    }

    /// Upload every non-excluded file under `source_root`, keeping the
    /// relative structure below `target_root`.
    pub fn upload_tree(
        &self,
        source_root: &Path,
        target_root: &RemotePath,
        exclusions: &ExclusionRules,
    ) -> DeployResult<UploadSummary> {
        let (included, excluded): (Vec<PathBuf>, Vec<PathBuf>) = self
            .file_system
            .walk_files(source_root)?
            .into_iter()
            .partition(|path| !exclusions.is_excluded(path));

        for path in &excluded {
            tracing::trace!(path = %path.display(), "excluded from upload");
        }
        self.events.on_event(DeployEvent::FilesStarted {
            count: included.len(),
            excluded: excluded.len(),
        });

        let mut summary = UploadSummary {
            excluded: excluded.len(),
            ..Default::default()
        };
        let detailed = self.events.wants_detailed_events();

        for (index, local) in included.iter().enumerate() {
            let relative = local.strip_prefix(source_root).unwrap_or(local.as_path());
            let remote = target_root.join_local(relative);
            if let Some(parent) = remote.parent() {
                self.preparer.ensure_directory(&parent)?;
            }

            summary.bytes += self.upload_one(local, &remote)?;
            summary.uploaded += 1;
            if detailed {
                self.events
                    .on_event(DeployEvent::FileUploaded { index, remote });
            }
        }
        Ok(summary)
    }

    /// `<store>/<name>/<version>/<path>`, falling back to the lower-cased
    /// name and version.
    fn locate(&self, dependency: &Dependency, remote: &RemotePath) -> DeployResult<PathBuf> {
        let Some(store) = self.package_store.as_deref() else {
            return Err(DeployError::Upload {
                local: PathBuf::from(dependency.path()),
                remote: remote.to_string(),
                message: "package store could not be located".to_string(),
            });
        };

        let exact = dependency.store_location(store);
        if self.file_system.is_file(&exact) {
            return Ok(exact);
        }
        let lowercase = dependency.store_location_lowercase(store);
        if self.file_system.is_file(&lowercase) {
            return Ok(lowercase);
        }
        Ok(exact)
    }

    fn upload_one(&self, local: &Path, remote: &RemotePath) -> DeployResult<u64> {
        let upload_error = |message: String| DeployError::Upload {
            local: local.to_path_buf(),
            remote: remote.to_string(),
            message,
        };

        let mut reader = self
            .file_system
            .open(local)
            .map_err(|e| upload_error(e.to_string()))?;
        let bytes = self
            .files
            .upload(&mut *reader, remote)
            .map_err(|e| upload_error(e.to_string()))?;
        tracing::trace!(local = %local.display(), remote = %remote, bytes, "uploaded");
        Ok(bytes)
    }
}
