//! Command channel and interactive shell over `ssh`

use std::io::{Read, Write};
use std::process::{Child, ChildStdin, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::ports::{ChannelError, ChannelResult, CommandChannel, CommandOutput, ShellHandle};

use super::session::SshControl;
use super::POLL_INTERVAL;

pub(crate) struct SshCommandChannel {
    control: Arc<SshControl>,
}

impl SshCommandChannel {
    pub(crate) fn new(control: Arc<SshControl>) -> Self {
        Self { control }
    }
}

impl CommandChannel for SshCommandChannel {
    fn execute_and_wait(
        &self,
        command: &str,
        timeout: Option<Duration>,
    ) -> ChannelResult<CommandOutput> {
        self.control
            .target
            .run(command, None, timeout)
            .map(|(output, _)| output)
    }

    fn open_shell(&self) -> ChannelResult<Box<dyn ShellHandle>> {
        let mut child = self
            .control
            .target
            .shell_command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ChannelError::ConnectionError(format!("failed to spawn ssh: {}", e)))?;

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .map(|s| Box::new(s) as Box<dyn Read + Send>);
        Ok(Box::new(SshShell {
            child,
            stdin,
            stdout,
            _control: Arc::clone(&self.control),
        }))
    }
}

/// A remote login shell on a forced tty
struct SshShell {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<Box<dyn Read + Send>>,
    /// Keeps the control master alive while the shell runs
    _control: Arc<SshControl>,
}

impl ShellHandle for SshShell {
    fn send(&mut self, command: &str) -> ChannelResult<()> {
        let stdin = self.stdin.as_mut().ok_or(ChannelError::Closed)?;
        writeln!(stdin, "{}", command)
            .and_then(|_| stdin.flush())
            .map_err(|e| ChannelError::IoError(e.to_string()))
    }

    fn take_output(&mut self) -> Option<Box<dyn Read + Send>> {
        self.stdout.take()
    }

    fn close(&mut self, grace: Duration) -> ChannelResult<()> {
        // EOF lets the remote shell exit once its command returns.
        drop(self.stdin.take());

        let deadline = Instant::now() + grace;
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) => return Ok(()),
                Ok(None) if Instant::now() >= deadline => break,
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(ChannelError::IoError(e.to_string())),
            }
        }

        tracing::debug!("shell did not exit within grace period, killing");
        self.child
            .kill()
            .and_then(|_| self.child.wait().map(|_| ()))
            .map_err(|e| ChannelError::IoError(e.to_string()))
    }
}

impl Drop for SshShell {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
