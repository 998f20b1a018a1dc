//! In-memory remote host
//!
//! A `SessionProvider` whose file and command channels operate on an
//! in-process directory tree. Every operation is recorded so callers can
//! inspect what a deployment would do. Used by `--dry-run` and the tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::domain::entities::ConnectionInfo;
use crate::domain::ports::{
    ChannelError, ChannelResult, CommandChannel, CommandOutput, FileChannel, RemoteEntry,
    RemoteSession, SessionProvider, ShellHandle,
};
use crate::domain::value_objects::RemotePath;

/// One recorded remote operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOp {
    Connect(String),
    Exists(RemotePath),
    CreateDirectory(RemotePath),
    Delete(RemotePath),
    List(RemotePath),
    Upload(RemotePath),
    Execute(String),
    OpenShell,
    ShellSend(String),
    CloseShell,
    CloseFiles,
    CloseCommands,
}

#[derive(Debug, Default)]
struct Tree {
    directories: BTreeSet<RemotePath>,
    files: BTreeMap<RemotePath, Vec<u8>>,
}

impl Tree {
    fn exists(&self, path: &RemotePath) -> bool {
        path.is_root()
            || path.as_str() == "."
            || self.directories.contains(path)
            || self.files.contains_key(path)
    }

    fn is_directory(&self, path: &RemotePath) -> bool {
        path.is_root() || path.as_str() == "." || self.directories.contains(path)
    }

    fn parent_exists(&self, path: &RemotePath) -> bool {
        path.parent().map_or(true, |p| self.is_directory(&p))
    }

    fn has_children(&self, path: &RemotePath) -> bool {
        let is_child = |p: &RemotePath| p.parent().as_ref() == Some(path);
        self.directories.iter().any(is_child) || self.files.keys().any(is_child)
    }
}

#[derive(Debug, Default)]
struct Faults {
    connect: Option<String>,
    upload_suffix: Option<String>,
    create_directory: Option<RemotePath>,
    commands: HashMap<String, ChannelError>,
    results: HashMap<String, CommandOutput>,
    command_delay: Option<Duration>,
    shell_output: String,
}

#[derive(Debug, Default)]
struct Shared {
    tree: Mutex<Tree>,
    log: Mutex<Vec<RemoteOp>>,
    faults: Mutex<Faults>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Shared {
    fn record(&self, op: RemoteOp) {
        lock(&self.log).push(op);
    }
}

/// In-memory remote host. Clones share the same tree and operation log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRemote {
    shared: Arc<Shared>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-create a directory and all of its ancestors.
    pub fn with_directory(self, path: &str) -> Self {
        {
            let mut tree = lock(&self.shared.tree);
            for dir in RemotePath::new(path).ancestors_from_root() {
                tree.directories.insert(dir);
            }
        }
        self
    }

    /// Pre-create a file; its parent directories are created too.
    pub fn with_file(self, path: &str, contents: &[u8]) -> Self {
        let path = RemotePath::new(path);
        let this = match path.parent() {
            Some(parent) => self.with_directory(parent.as_str()),
            None => self,
        };
        lock(&this.shared.tree).files.insert(path, contents.to_vec());
        this
    }

    pub fn fail_connect(self, message: &str) -> Self {
        lock(&self.shared.faults).connect = Some(message.to_string());
        self
    }

    /// Fail every upload whose remote path ends with `suffix`.
    pub fn fail_uploads_ending_with(self, suffix: &str) -> Self {
        lock(&self.shared.faults).upload_suffix = Some(suffix.to_string());
        self
    }

    pub fn fail_create_directory(self, path: &str) -> Self {
        lock(&self.shared.faults).create_directory = Some(RemotePath::new(path));
        self
    }

    /// Make `command` fail at the transport level.
    pub fn fail_command(self, command: &str, error: ChannelError) -> Self {
        lock(&self.shared.faults)
            .commands
            .insert(command.to_string(), error);
        self
    }

    /// Canned exit status and output for `command`.
    pub fn command_result(self, command: &str, exit_status: i32, output: &str) -> Self {
        lock(&self.shared.faults).results.insert(
            command.to_string(),
            CommandOutput {
                exit_status,
                output: output.to_string(),
            },
        );
        self
    }

    /// Every `execute_and_wait` takes at least this long.
    pub fn command_delay(self, delay: Duration) -> Self {
        lock(&self.shared.faults).command_delay = Some(delay);
        self
    }

    /// Output produced by every shell opened on this host.
    pub fn shell_output(self, output: &str) -> Self {
        lock(&self.shared.faults).shell_output = output.to_string();
        self
    }

    pub fn operations(&self) -> Vec<RemoteOp> {
        lock(&self.shared.log).clone()
    }

    pub fn count(&self, predicate: impl Fn(&RemoteOp) -> bool) -> usize {
        lock(&self.shared.log).iter().filter(|op| predicate(op)).count()
    }

    /// Upload destinations in the order they were attempted.
    pub fn uploads(&self) -> Vec<RemotePath> {
        lock(&self.shared.log)
            .iter()
            .filter_map(|op| match op {
                RemoteOp::Upload(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn created_directories(&self) -> Vec<RemotePath> {
        lock(&self.shared.log)
            .iter()
            .filter_map(|op| match op {
                RemoteOp::CreateDirectory(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn executed_commands(&self) -> Vec<String> {
        lock(&self.shared.log)
            .iter()
            .filter_map(|op| match op {
                RemoteOp::Execute(cmd) => Some(cmd.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn shell_commands(&self) -> Vec<String> {
        lock(&self.shared.log)
            .iter()
            .filter_map(|op| match op {
                RemoteOp::ShellSend(cmd) => Some(cmd.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        lock(&self.shared.tree).files.get(&RemotePath::new(path)).cloned()
    }

    pub fn files(&self) -> Vec<RemotePath> {
        lock(&self.shared.tree).files.keys().cloned().collect()
    }

    pub fn has_directory(&self, path: &str) -> bool {
        lock(&self.shared.tree).is_directory(&RemotePath::new(path))
    }
}

impl SessionProvider for InMemoryRemote {
    fn connect(&self, connection: &ConnectionInfo) -> ChannelResult<RemoteSession> {
        self.shared.record(RemoteOp::Connect(connection.address()));
        if let Some(message) = lock(&self.shared.faults).connect.clone() {
            return Err(ChannelError::ConnectionError(message));
        }
        Ok(RemoteSession::new(
            Box::new(MemoryFiles {
                shared: Arc::clone(&self.shared),
            }),
            Box::new(MemoryCommands {
                shared: Arc::clone(&self.shared),
            }),
        ))
    }
}

struct MemoryFiles {
    shared: Arc<Shared>,
}

impl FileChannel for MemoryFiles {
    fn upload(&self, source: &mut dyn Read, remote_path: &RemotePath) -> ChannelResult<u64> {
        self.shared.record(RemoteOp::Upload(remote_path.clone()));
        let injected = lock(&self.shared.faults)
            .upload_suffix
            .as_deref()
            .is_some_and(|suffix| remote_path.as_str().ends_with(suffix));
        if injected {
            return Err(ChannelError::IoError(format!(
                "write to {} was interrupted",
                remote_path
            )));
        }

        let mut tree = lock(&self.shared.tree);
        if !tree.parent_exists(remote_path) {
            return Err(ChannelError::NotFound(remote_path.to_string()));
        }
        if tree.directories.contains(remote_path) {
            return Err(ChannelError::IoError(format!("{} is a directory", remote_path)));
        }

        let mut bytes = Vec::new();
        source
            .read_to_end(&mut bytes)
            .map_err(|e| ChannelError::IoError(e.to_string()))?;
        let len = bytes.len() as u64;
        tree.files.insert(remote_path.clone(), bytes);
        Ok(len)
    }

    fn exists(&self, remote_path: &RemotePath) -> ChannelResult<bool> {
        self.shared.record(RemoteOp::Exists(remote_path.clone()));
        Ok(lock(&self.shared.tree).exists(remote_path))
    }

    fn create_directory(&self, remote_path: &RemotePath) -> ChannelResult<()> {
        self.shared
            .record(RemoteOp::CreateDirectory(remote_path.clone()));
        if lock(&self.shared.faults).create_directory.as_ref() == Some(remote_path) {
            return Err(ChannelError::PermissionDenied(remote_path.to_string()));
        }

        let mut tree = lock(&self.shared.tree);
        if !tree.parent_exists(remote_path) {
            return Err(ChannelError::NotFound(remote_path.to_string()));
        }
        if tree.files.contains_key(remote_path) {
            return Err(ChannelError::IoError(format!("{} is a file", remote_path)));
        }
        tree.directories.insert(remote_path.clone());
        Ok(())
    }

    fn delete(&self, remote_path: &RemotePath) -> ChannelResult<()> {
        self.shared.record(RemoteOp::Delete(remote_path.clone()));
        let mut tree = lock(&self.shared.tree);
        if tree.files.remove(remote_path).is_some() {
            return Ok(());
        }
        if !tree.directories.contains(remote_path) {
            return Err(ChannelError::NotFound(remote_path.to_string()));
        }
        if tree.has_children(remote_path) {
            return Err(ChannelError::IoError(format!(
                "{} is not empty",
                remote_path
            )));
        }
        tree.directories.remove(remote_path);
        Ok(())
    }

    fn list_entries(&self, remote_path: &RemotePath) -> ChannelResult<Vec<RemoteEntry>> {
        self.shared.record(RemoteOp::List(remote_path.clone()));
        let tree = lock(&self.shared.tree);
        if !tree.is_directory(remote_path) {
            return Err(ChannelError::NotFound(remote_path.to_string()));
        }

        let is_child = |p: &&RemotePath| p.parent().as_ref() == Some(remote_path);
        let mut entries = vec![
            RemoteEntry {
                name: ".".to_string(),
                path: remote_path.clone(),
                is_directory: true,
            },
            RemoteEntry {
                name: "..".to_string(),
                path: remote_path.parent().unwrap_or_else(|| remote_path.clone()),
                is_directory: true,
            },
        ];
        entries.extend(
            tree.directories
                .iter()
                .filter(is_child)
                .map(|p| RemoteEntry::directory(p.clone())),
        );
        entries.extend(
            tree.files
                .keys()
                .filter(is_child)
                .map(|p| RemoteEntry::file(p.clone())),
        );
        Ok(entries)
    }

    fn close(&self) -> ChannelResult<()> {
        self.shared.record(RemoteOp::CloseFiles);
        Ok(())
    }
}

struct MemoryCommands {
    shared: Arc<Shared>,
}

impl CommandChannel for MemoryCommands {
    fn execute_and_wait(
        &self,
        command: &str,
        timeout: Option<Duration>,
    ) -> ChannelResult<CommandOutput> {
        self.shared.record(RemoteOp::Execute(command.to_string()));
        let (delay, failure, result) = {
            let faults = lock(&self.shared.faults);
            (
                faults.command_delay,
                faults.commands.get(command).cloned(),
                faults.results.get(command).cloned(),
            )
        };

        if let Some(delay) = delay {
            match timeout {
                Some(limit) if limit < delay => {
                    std::thread::sleep(limit);
                    return Err(ChannelError::Timeout(command.to_string()));
                }
                _ => std::thread::sleep(delay),
            }
        }

        if let Some(error) = failure {
            return Err(error);
        }
        Ok(result.unwrap_or(CommandOutput {
            exit_status: 0,
            output: String::new(),
        }))
    }

    fn open_shell(&self) -> ChannelResult<Box<dyn ShellHandle>> {
        self.shared.record(RemoteOp::OpenShell);
        let output = lock(&self.shared.faults).shell_output.clone().into_bytes();
        Ok(Box::new(MemoryShell {
            shared: Arc::clone(&self.shared),
            output: Some(Box::new(Cursor::new(output))),
        }))
    }

    fn close(&self) -> ChannelResult<()> {
        self.shared.record(RemoteOp::CloseCommands);
        Ok(())
    }
}

struct MemoryShell {
    shared: Arc<Shared>,
    output: Option<Box<dyn Read + Send>>,
}

impl ShellHandle for MemoryShell {
    fn send(&mut self, command: &str) -> ChannelResult<()> {
        self.shared.record(RemoteOp::ShellSend(command.to_string()));
        if let Some(error) = lock(&self.shared.faults).commands.get(command).cloned() {
            return Err(error);
        }
        Ok(())
    }

    fn take_output(&mut self) -> Option<Box<dyn Read + Send>> {
        self.output.take()
    }

    fn close(&mut self, _grace: Duration) -> ChannelResult<()> {
        self.shared.record(RemoteOp::CloseShell);
        Ok(())
    }
}
