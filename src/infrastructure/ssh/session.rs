//! SSH session provider

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use crate::domain::entities::ConnectionInfo;
use crate::domain::ports::{ChannelError, ChannelResult, RemoteSession, SessionProvider};

use super::commands::SshCommandChannel;
use super::files::SshFileChannel;
use super::SshTarget;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Opens sessions by shelling out to the system `ssh` binary.
#[derive(Debug, Clone)]
pub struct SshSessionProvider {
    connect_timeout: Duration,
}

impl SshSessionProvider {
    pub fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for SshSessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection shared by the channels of one session.
///
/// The control master is asked to exit and its socket directory removed
/// once the last channel or shell holding it is dropped.
#[derive(Debug)]
pub(crate) struct SshControl {
    pub(crate) target: SshTarget,
    _socket_dir: Option<TempDir>,
}

impl Drop for SshControl {
    fn drop(&mut self) {
        self.target.exit_master();
    }
}

impl SessionProvider for SshSessionProvider {
    fn connect(&self, connection: &ConnectionInfo) -> ChannelResult<RemoteSession> {
        let socket_dir = if connection.multiplex {
            Some(
                tempfile::Builder::new()
                    .prefix("sshdeploy-")
                    .tempdir()
                    .map_err(|e| ChannelError::IoError(e.to_string()))?,
            )
        } else {
            None
        };
        let control_path = socket_dir.as_ref().map(|d| d.path().join("control"));

        let control = Arc::new(SshControl {
            target: SshTarget::new(connection, control_path, self.connect_timeout),
            _socket_dir: socket_dir,
        });

        let (probe, _) = control.target.run("true", None, Some(self.connect_timeout * 2))?;
        if !probe.is_success() {
            return Err(ChannelError::ConnectionError(probe.output.trim().to_string()));
        }
        tracing::info!(address = %connection.address(), "connected");

        Ok(RemoteSession::new(
            Box::new(SshFileChannel::new(Arc::clone(&control))),
            Box::new(SshCommandChannel::new(control)),
        ))
    }
}
