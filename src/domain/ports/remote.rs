//! Remote Session Port
//!
//! Abstracts the two remote channels a deployment uses:
//! - a file channel (upload, stat, mkdir, delete, list)
//! - a command channel (run-and-wait, long-lived shell)
//!
//! Both are opened together by a `SessionProvider` and released when the
//! `RemoteSession` is dropped.

use std::io::Read;
use std::time::Duration;

use thiserror::Error;

use crate::domain::entities::ConnectionInfo;
use crate::domain::value_objects::RemotePath;

/// Result type for remote channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Error during remote channel operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// Remote file system error
    #[error("I/O error: {0}")]
    IoError(String),
    /// Remote connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// Remote path not writable
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// Remote path does not exist
    #[error("Not found: {0}")]
    NotFound(String),
    /// Command could not be executed
    #[error("Command failed: {0}")]
    CommandFailed(String),
    /// Command did not finish in time
    #[error("Timed out: {0}")]
    Timeout(String),
    /// Channel was already closed
    #[error("Channel closed")]
    Closed,
}

/// One entry of a remote directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub path: RemotePath,
    pub is_directory: bool,
}

impl RemoteEntry {
    pub fn file(path: RemotePath) -> Self {
        Self::new(path, false)
    }

    pub fn directory(path: RemotePath) -> Self {
        Self::new(path, true)
    }

    fn new(path: RemotePath, is_directory: bool) -> Self {
        Self {
            name: path.file_name().unwrap_or_default().to_string(),
            path,
            is_directory,
        }
    }

    /// `.` and `..` pseudo entries
    pub fn is_navigation(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}

/// Captured result of a completed remote command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_status: i32,
    /// stdout followed by stderr
    pub output: String,
}

impl CommandOutput {
    pub fn is_success(&self) -> bool {
        self.exit_status == 0
    }
}

/// File transfer channel
pub trait FileChannel: Send {
    /// Stream `source` into `remote_path`, replacing any existing file.
    /// Returns the number of bytes written.
    fn upload(&self, source: &mut dyn Read, remote_path: &RemotePath) -> ChannelResult<u64>;

    /// Check whether a file or directory exists
    fn exists(&self, remote_path: &RemotePath) -> ChannelResult<bool>;

    /// Create a single directory; the parent must already exist
    fn create_directory(&self, remote_path: &RemotePath) -> ChannelResult<()>;

    /// Delete a file or an empty directory
    fn delete(&self, remote_path: &RemotePath) -> ChannelResult<()>;

    /// Entries directly inside a directory
    fn list_entries(&self, remote_path: &RemotePath) -> ChannelResult<Vec<RemoteEntry>>;

    /// Release the channel. Called at most once.
    fn close(&self) -> ChannelResult<()> {
        Ok(())
    }
}

/// A long-lived interactive remote shell
pub trait ShellHandle: Send {
    /// Write a command line into the shell
    fn send(&mut self, command: &str) -> ChannelResult<()>;

    /// Take the shell output stream. Returns `None` after the first call.
    fn take_output(&mut self) -> Option<Box<dyn Read + Send>>;

    /// End the session, waiting at most `grace` before forcing it closed
    fn close(&mut self, grace: Duration) -> ChannelResult<()>;
}

/// Remote command execution channel
pub trait CommandChannel: Send {
    /// Run a command and wait for it to exit
    fn execute_and_wait(
        &self,
        command: &str,
        timeout: Option<Duration>,
    ) -> ChannelResult<CommandOutput>;

    /// Open an interactive shell session
    fn open_shell(&self) -> ChannelResult<Box<dyn ShellHandle>>;

    /// Release the channel. Called at most once.
    fn close(&self) -> ChannelResult<()> {
        Ok(())
    }
}

/// The pair of channels used by one deployment invocation
pub struct RemoteSession {
    files: Box<dyn FileChannel>,
    commands: Box<dyn CommandChannel>,
}

impl RemoteSession {
    pub fn new(files: Box<dyn FileChannel>, commands: Box<dyn CommandChannel>) -> Self {
        Self { files, commands }
    }

    pub fn files(&self) -> &dyn FileChannel {
        self.files.as_ref()
    }

    pub fn commands(&self) -> &dyn CommandChannel {
        self.commands.as_ref()
    }
}

impl Drop for RemoteSession {
    fn drop(&mut self) {
        if let Err(e) = self.files.close() {
            tracing::debug!(error = %e, "file channel close failed");
        }
        if let Err(e) = self.commands.close() {
            tracing::debug!(error = %e, "command channel close failed");
        }
    }
}

/// Opens remote sessions
pub trait SessionProvider: Send + Sync {
    fn connect(&self, connection: &ConnectionInfo) -> ChannelResult<RemoteSession>;
}
