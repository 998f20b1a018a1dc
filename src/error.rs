//! Error types for sshdeploy
//!
//! Uses `thiserror` for library errors. Each variant maps to one failure
//! class of the deployment pipeline so the operator report can say which
//! step broke and with what context.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::{ChannelError, FsError};
use crate::domain::services::ResolveError;

/// Result type alias for sshdeploy operations
pub type DeployResult<T> = Result<T, DeployError>;

/// Main error type for deployment operations
#[derive(Error, Debug)]
pub enum DeployError {
    /// Source path is missing or not a directory
    #[error("source path '{path}' was not found")]
    SourceNotFound { path: PathBuf },

    /// Could not open the remote session
    #[error("could not connect to {address}: {source}")]
    Connection {
        address: String,
        #[source]
        source: ChannelError,
    },

    /// Manifest did not have the expected structure
    #[error("failed to resolve dependencies from {manifest}: {source}")]
    Resolution {
        manifest: PathBuf,
        #[source]
        source: ResolveError,
    },

    /// Could not create or clean a remote directory
    #[error("failed to prepare remote path '{path}': {source}")]
    Preparation {
        path: String,
        #[source]
        source: ChannelError,
    },

    /// A single file transfer failed
    #[error("failed to upload '{local}' to '{remote}': {message}")]
    Upload {
        local: PathBuf,
        remote: String,
        message: String,
    },

    /// Remote command exited non-zero or could not be run
    #[error("command '{command}' failed: {message}")]
    Command { command: String, message: String },

    /// Local filesystem error outside of a single upload
    #[error("local filesystem error: {0}")]
    Fs(#[from] FsError),

    /// Invalid configuration
    #[error("invalid configuration in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The pipeline ran but reported a failure
    #[error("deployment #{sequence} failed: {message}")]
    PipelineFailed { sequence: u64, message: String },
}
