//! Remote Path Preparer
//!
//! Creates remote directories segment by segment and remembers which ones
//! are known to exist, so each segment costs at most one round trip per
//! deployment.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use crate::domain::entities::DeploymentConfig;
use crate::domain::ports::{ChannelError, ChannelResult, DeployEvent, DeployEventSink, FileChannel};
use crate::domain::value_objects::RemotePath;
use crate::error::{DeployError, DeployResult};

/// Idempotent remote directory preparation for one deployment run.
pub struct RemotePathPreparer<'a> {
    files: &'a dyn FileChannel,
    events: &'a dyn DeployEventSink,
    known: RefCell<HashSet<RemotePath>>,
    created: Cell<usize>,
}

impl<'a> RemotePathPreparer<'a> {
    pub fn new(files: &'a dyn FileChannel, events: &'a dyn DeployEventSink) -> Self {
        Self {
            files,
            events,
            known: RefCell::new(HashSet::new()),
            created: Cell::new(0),
        }
    }

    /// Create every missing segment from the top of `path` down to `path`.
    pub fn ensure_directory(&self, path: &RemotePath) -> DeployResult<()> {
        for dir in path.ancestors_from_root() {
            if self.known.borrow().contains(&dir) {
                continue;
            }

            let exists = self
                .files
                .exists(&dir)
                .map_err(|source| preparation_error(&dir, source))?;
            if !exists {
                tracing::debug!(path = %dir, "creating remote directory");
                self.files
                    .create_directory(&dir)
                    .map_err(|source| preparation_error(&dir, source))?;
                self.created.set(self.created.get() + 1);
                self.events
                    .on_event(DeployEvent::DirectoryCreated { path: dir.clone() });
            }
            self.known.borrow_mut().insert(dir);
        }
        Ok(())
    }

    /// Ensure the target directory exists, wiping it first when
    /// `clean_target` is set.
    pub fn prepare_target(&self, config: &DeploymentConfig) -> DeployResult<()> {
        let target = config.target_path();
        if config.clean_target {
            self.clean(&target)?;
        }
        self.ensure_directory(&target)
    }

    /// Number of directories this preparer created.
    pub fn directories_created(&self) -> usize {
        self.created.get()
    }

    fn clean(&self, target: &RemotePath) -> DeployResult<()> {
        if target.is_root() || target.file_name().is_none() {
            return Err(preparation_error(
                target,
                ChannelError::PermissionDenied(format!("refusing to clean '{}'", target)),
            ));
        }

        let exists = self
            .files
            .exists(target)
            .map_err(|source| preparation_error(target, source))?;
        if !exists {
            return Ok(());
        }

        self.events.on_event(DeployEvent::CleaningTarget {
            path: target.clone(),
        });
        tracing::info!(path = %target, "cleaning remote target");
        self.delete_tree(target)
            .map_err(|source| preparation_error(target, source))?;
        self.known.borrow_mut().retain(|p| !p.starts_with(target));
        Ok(())
    }

    /// Files first, then directories, depth first.
    fn delete_tree(&self, dir: &RemotePath) -> ChannelResult<()> {
        for entry in self.files.list_entries(dir)? {
            if entry.is_navigation() {
                continue;
            }
            if entry.is_directory {
                self.delete_tree(&entry.path)?;
            } else {
                tracing::trace!(path = %entry.path, "deleting remote file");
                self.files.delete(&entry.path)?;
            }
        }
        self.files.delete(dir)
    }
}

fn preparation_error(path: &RemotePath, source: ChannelError) -> DeployError {
    DeployError::Preparation {
        path: path.to_string(),
        source,
    }
}
