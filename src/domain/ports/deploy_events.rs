//! Deploy Event Port
//!
//! Provides an observable interface for deploy operations.
//! Enables operator status lines, JSON event streams, and testing.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::value_objects::{CommandMode, RemotePath};

/// Sub-step of the locked deployment region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeployStep {
    PreCommand,
    Preparing,
    UploadingDependencies,
    UploadingPayload,
    PostCommand,
}

impl DeployStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployStep::PreCommand => "pre_command",
            DeployStep::Preparing => "preparing",
            DeployStep::UploadingDependencies => "uploading_dependencies",
            DeployStep::UploadingPayload => "uploading_payload",
            DeployStep::PostCommand => "post_command",
        }
    }
}

/// Event emitted during deploy operations
#[derive(Debug, Clone, PartialEq)]
pub enum DeployEvent {
    /// Deployment lock acquired
    Started {
        source: PathBuf,
        target: RemotePath,
        address: String,
    },

    /// Trigger dropped because a deployment is already in flight
    Skipped { reason: String },

    /// A pipeline step began
    StepStarted { step: DeployStep },

    /// A remote command was dispatched
    CommandStarted { mode: CommandMode, command: String },

    /// A line of remote command output
    CommandOutput { line: String },

    /// A command failed but the pipeline continues
    CommandFailed { command: String, message: String },

    /// Target directory contents are being removed
    CleaningTarget { path: RemotePath },

    /// A missing remote directory was created
    DirectoryCreated { path: RemotePath },

    /// Dependency upload started
    DependenciesStarted { count: usize },

    /// One dependency was uploaded
    DependencyUploaded { name: String, remote: RemotePath },

    /// Payload upload started
    FilesStarted { count: usize, excluded: usize },

    /// One payload file was uploaded
    FileUploaded { index: usize, remote: RemotePath },

    /// Pipeline step failed; remaining steps are skipped
    Failed {
        step: Option<DeployStep>,
        message: String,
    },

    /// Lock released
    Finished { sequence: u64, elapsed: Duration },

    /// Output relayed from the post-deployment shell
    ShellOutput { line: String },
}

/// Trait for receiving deploy events
///
/// Implementations can be:
/// - ConsoleEventSink: status lines in the terminal
/// - JsonEventSink: NDJSON event stream for CI
/// - NoopEventSink: Silent operation
pub trait DeployEventSink: Send + Sync {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);

    /// Check if this sink wants per-file events
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
