//! SSH subprocess transport
//!
//! Every remote operation is one `ssh` invocation. When multiplexing is on
//! they all ride a single control connection whose socket lives in a
//! temporary directory owned by the session.

mod commands;
mod files;
mod session;

pub use session::SshSessionProvider;

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

use crate::domain::entities::ConnectionInfo;
use crate::domain::ports::{ChannelError, ChannelResult, CommandOutput};

/// Exit status `ssh` itself uses for connection failures
const SSH_FAILURE_STATUS: i32 = 255;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How to reach the remote host with the `ssh` binary.
#[derive(Debug, Clone)]
pub(crate) struct SshTarget {
    program: PathBuf,
    destination: String,
    port: u16,
    identity_file: Option<PathBuf>,
    control_path: Option<PathBuf>,
    connect_timeout: Duration,
}

impl SshTarget {
    pub(crate) fn new(
        connection: &ConnectionInfo,
        control_path: Option<PathBuf>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            program: PathBuf::from("ssh"),
            destination: connection.destination(),
            port: connection.port,
            identity_file: connection.identity_file.clone(),
            control_path,
            connect_timeout,
        }
    }

    #[cfg(test)]
    fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// `ssh` with the connection options applied, destination not yet added.
    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-p")
            .arg(self.port.to_string())
            .args(["-o", "BatchMode=yes", "-o", "LogLevel=ERROR"])
            .arg("-o")
            .arg(format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)));
        if let Some(identity) = &self.identity_file {
            cmd.arg("-i").arg(identity);
        }
        if let Some(control) = &self.control_path {
            cmd.args(["-o", "ControlMaster=auto", "-o", "ControlPersist=yes"])
                .arg("-o")
                .arg(format!("ControlPath={}", control.display()));
        }
        cmd
    }

    /// Command running `remote_command` on the host.
    pub(crate) fn command(&self, remote_command: &str) -> Command {
        let mut cmd = self.base_command();
        cmd.arg(&self.destination).arg(remote_command);
        cmd
    }

    /// Command opening an interactive shell with a forced tty.
    pub(crate) fn shell_command(&self) -> Command {
        let mut cmd = self.base_command();
        cmd.arg("-tt").arg(&self.destination);
        cmd
    }

    /// Ask the control master to exit.
    pub(crate) fn exit_master(&self) {
        let Some(control) = &self.control_path else {
            return;
        };
        let result = Command::new(&self.program)
            .arg("-o")
            .arg(format!("ControlPath={}", control.display()))
            .args(["-O", "exit"])
            .arg(&self.destination)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if let Err(e) = result {
            tracing::debug!(error = %e, "ssh -O exit failed");
        }
    }

    /// Run a remote command, optionally feeding `input` on stdin.
    pub(crate) fn run(
        &self,
        remote_command: &str,
        input: Option<&mut dyn Read>,
        timeout: Option<Duration>,
    ) -> ChannelResult<(CommandOutput, u64)> {
        tracing::debug!(destination = %self.destination, command = remote_command, "ssh");
        let mut cmd = self.command(remote_command);
        cmd.stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| ChannelError::ConnectionError(format!("failed to spawn ssh: {}", e)))?;

        let mut written = 0;
        let mut copy_error = None;
        if let Some(source) = input {
            if let Some(mut stdin) = child.stdin.take() {
                match std::io::copy(source, &mut stdin) {
                    Ok(n) => written = n,
                    Err(e) => copy_error = Some(e),
                }
            }
        }

        // The remote side closing stdin early still leaves its exit status
        // and stderr to collect.
        let output = wait_with_timeout(child, timeout, remote_command)?;
        let exit_status = output.status.code().unwrap_or(SSH_FAILURE_STATUS);
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if exit_status == SSH_FAILURE_STATUS {
            return Err(ChannelError::ConnectionError(text.trim().to_string()));
        }
        if let Some(e) = copy_error {
            if exit_status == 0 {
                return Err(ChannelError::IoError(e.to_string()));
            }
            tracing::debug!(error = %e, exit_status, "remote closed stdin early");
        }
        Ok((
            CommandOutput {
                exit_status,
                output: text,
            },
            written,
        ))
    }
}

/// Collect a child's output, killing it once `timeout` elapses.
fn wait_with_timeout(
    mut child: Child,
    timeout: Option<Duration>,
    command: &str,
) -> ChannelResult<Output> {
    let Some(timeout) = timeout else {
        return child
            .wait_with_output()
            .map_err(|e| ChannelError::IoError(e.to_string()));
    };

    let stdout = child.stdout.take().map(spawn_reader);
    let stderr = child.stderr.take().map(spawn_reader);
    let deadline = Instant::now() + timeout;

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                if let Err(e) = child.kill() {
                    tracing::debug!(error = %e, "failed to kill timed out ssh");
                }
                let _ = child.wait();
                return Err(ChannelError::Timeout(command.to_string()));
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(ChannelError::IoError(e.to_string())),
        }
    };

    let collect = |handle: Option<std::thread::JoinHandle<Vec<u8>>>| {
        handle.and_then(|h| h.join().ok()).unwrap_or_default()
    };
    Ok(Output {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut stream: R) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stream.read_to_end(&mut buf);
        buf
    })
}

/// Map a failed file operation's output onto a channel error.
pub(crate) fn classify_failure(path: &str, output: &CommandOutput) -> ChannelError {
    let text = output.output.trim();
    if text.contains("Permission denied") {
        ChannelError::PermissionDenied(path.to_string())
    } else if text.contains("No such file") {
        ChannelError::NotFound(path.to_string())
    } else {
        ChannelError::IoError(format!("{} (exit {}): {}", path, output.exit_status, text))
    }
}
