//! Remote Command Runner
//!
//! `client` mode blocks until the remote command exits. `shell` mode hands
//! the command to a long-lived shell and relays its output from a
//! background thread while [`ShellForwarding`] is enabled.

use std::io::{BufRead, BufReader, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::domain::ports::{CommandChannel, CommandOutput, DeployEvent, DeployEventSink, ShellHandle};
use crate::domain::value_objects::CommandMode;
use crate::error::{DeployError, DeployResult};

/// Shared switch deciding whether shell output reaches the operator.
#[derive(Debug, Clone, Default)]
pub struct ShellForwarding(Arc<AtomicBool>);

impl ShellForwarding {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn enable(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn disable(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A dispatched shell command and the thread relaying its output.
///
/// Dropping the relay closes the shell (waiting at most the grace period)
/// and joins the thread.
pub struct ShellRelay {
    shell: Option<Box<dyn ShellHandle>>,
    relay: Option<JoinHandle<()>>,
    grace: Duration,
}

impl ShellRelay {
    /// Close the shell now and wait for the relay to drain.
    pub fn finish(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(mut shell) = self.shell.take() {
            if let Err(e) = shell.close(self.grace) {
                tracing::debug!(error = %e, "shell close failed");
            }
        }
        if let Some(relay) = self.relay.take() {
            if relay.join().is_err() {
                tracing::warn!("shell output relay panicked");
            }
        }
    }
}

impl Drop for ShellRelay {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ShellRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellRelay")
            .field("open", &self.shell.is_some())
            .field("grace", &self.grace)
            .finish()
    }
}

/// What running a command produced
#[derive(Debug)]
pub enum CommandOutcome {
    /// The command text was blank
    NotRequested,
    Completed(CommandOutput),
    ShellStarted(ShellRelay),
}

pub struct RemoteCommandRunner<'a> {
    commands: &'a dyn CommandChannel,
    events: Arc<dyn DeployEventSink>,
    forwarding: ShellForwarding,
    timeout: Option<Duration>,
    grace: Duration,
}

impl<'a> RemoteCommandRunner<'a> {
    pub fn new(
        commands: &'a dyn CommandChannel,
        events: Arc<dyn DeployEventSink>,
        forwarding: ShellForwarding,
    ) -> Self {
        Self {
            commands,
            events,
            forwarding,
            timeout: None,
            grace: Duration::from_secs(2),
        }
    }

    /// Upper bound for `client` mode commands
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// How long a shell may take to exit when its relay is dropped
    pub fn with_shell_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn run(&self, mode: CommandMode, command: &str) -> DeployResult<CommandOutcome> {
        let command = command.trim();
        if command.is_empty() {
            return Ok(CommandOutcome::NotRequested);
        }

        tracing::info!(mode = %mode, command, "running remote command");
        self.events.on_event(DeployEvent::CommandStarted {
            mode,
            command: command.to_string(),
        });

        match mode {
            CommandMode::Client => self.run_client(command).map(CommandOutcome::Completed),
            CommandMode::Shell => self.run_shell(command).map(CommandOutcome::ShellStarted),
        }
    }

    fn run_client(&self, command: &str) -> DeployResult<CommandOutput> {
        let output = self
            .commands
            .execute_and_wait(command, self.timeout)
            .map_err(|e| command_error(command, e.to_string()))?;

        for line in output.output.lines() {
            self.events.on_event(DeployEvent::CommandOutput {
                line: line.to_string(),
            });
        }

        if !output.is_success() {
            return Err(command_error(
                command,
                format!("exited with status {}", output.exit_status),
            ));
        }
        Ok(output)
    }

    fn run_shell(&self, command: &str) -> DeployResult<ShellRelay> {
        let mut shell = self
            .commands
            .open_shell()
            .map_err(|e| command_error(command, e.to_string()))?;
        let output = shell.take_output();

        if let Err(e) = shell.send(command) {
            if let Err(close_err) = shell.close(Duration::ZERO) {
                tracing::debug!(error = %close_err, "shell close failed");
            }
            return Err(command_error(command, e.to_string()));
        }

        let relay = match output {
            Some(stream) => {
                let events = Arc::clone(&self.events);
                let forwarding = self.forwarding.clone();
                Some(
                    std::thread::Builder::new()
                        .name("shell-relay".to_string())
                        .spawn(move || relay_lines(stream, events.as_ref(), &forwarding))?,
                )
            }
            None => None,
        };

        Ok(ShellRelay {
            shell: Some(shell),
            relay,
            grace: self.grace,
        })
    }
}

fn relay_lines(
    stream: Box<dyn Read + Send>,
    events: &dyn DeployEventSink,
    forwarding: &ShellForwarding,
) {
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                tracing::trace!(line, "shell output");
                if forwarding.is_enabled() {
                    events.on_event(DeployEvent::ShellOutput {
                        line: line.to_string(),
                    });
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "shell output stream ended");
                break;
            }
        }
    }
}

fn command_error(command: &str, message: String) -> DeployError {
    DeployError::Command {
        command: command.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ConnectionInfo;
    use crate::domain::ports::{ChannelError, SessionProvider};
    use crate::infrastructure::{InMemoryRemote, RemoteOp};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<DeployEvent>>,
    }

    impl DeployEventSink for Recorder {
        fn on_event(&self, event: DeployEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn runner<'a>(
        channel: &'a dyn CommandChannel,
        recorder: &Arc<Recorder>,
        forwarding: &ShellForwarding,
    ) -> RemoteCommandRunner<'a> {
        RemoteCommandRunner::new(channel, recorder.clone(), forwarding.clone())
    }

    #[test]
    fn blank_command_is_not_requested() {
        let remote = InMemoryRemote::new();
        let session = remote.connect(&ConnectionInfo::new("pi")).unwrap();
        let recorder = Arc::new(Recorder::default());

        let outcome = runner(session.commands(), &recorder, &ShellForwarding::default())
            .run(CommandMode::Client, "   ")
            .unwrap();

        assert!(matches!(outcome, CommandOutcome::NotRequested));
        assert!(remote.executed_commands().is_empty());
        assert!(recorder.events.lock().unwrap().is_empty());
    }

    #[test]
    fn client_mode_relays_output_lines() {
        let remote = InMemoryRemote::new().command_result("uname -m", 0, "armv7l\n");
        let session = remote.connect(&ConnectionInfo::new("pi")).unwrap();
        let recorder = Arc::new(Recorder::default());

        let outcome = runner(session.commands(), &recorder, &ShellForwarding::default())
            .run(CommandMode::Client, "uname -m")
            .unwrap();

        assert!(matches!(outcome, CommandOutcome::Completed(output) if output.is_success()));
        assert!(recorder.events.lock().unwrap().contains(&DeployEvent::CommandOutput {
            line: "armv7l".to_string()
        }));
    }

    #[test]
    fn non_zero_exit_is_a_command_error() {
        let remote = InMemoryRemote::new().command_result("false", 1, "");
        let session = remote.connect(&ConnectionInfo::new("pi")).unwrap();
        let recorder = Arc::new(Recorder::default());

        let err = runner(session.commands(), &recorder, &ShellForwarding::default())
            .run(CommandMode::Client, "false")
            .unwrap_err();

        assert_eq!(err.to_string(), "command 'false' failed: exited with status 1");
    }

    #[test]
    fn timeout_surfaces_as_command_error() {
        let remote = InMemoryRemote::new().command_delay(Duration::from_millis(200));
        let session = remote.connect(&ConnectionInfo::new("pi")).unwrap();
        let recorder = Arc::new(Recorder::default());

        let err = runner(session.commands(), &recorder, &ShellForwarding::default())
            .with_timeout(Some(Duration::from_millis(10)))
            .run(CommandMode::Client, "sleep 5")
            .unwrap_err();

        assert!(err.to_string().contains("Timed out"));
    }

    #[test]
    fn shell_mode_forwards_only_while_enabled() {
        let remote = InMemoryRemote::new().shell_output("started\n");
        let session = remote.connect(&ConnectionInfo::new("pi")).unwrap();

        let recorder = Arc::new(Recorder::default());
        let quiet = ShellForwarding::new(false);
        match runner(session.commands(), &recorder, &quiet)
            .run(CommandMode::Shell, "dotnet app.dll")
            .unwrap()
        {
            CommandOutcome::ShellStarted(relay) => relay.finish(),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!recorder
            .events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, DeployEvent::ShellOutput { .. })));

        let recorder = Arc::new(Recorder::default());
        let loud = ShellForwarding::new(true);
        match runner(session.commands(), &recorder, &loud)
            .run(CommandMode::Shell, "dotnet app.dll")
            .unwrap()
        {
            CommandOutcome::ShellStarted(relay) => relay.finish(),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(recorder.events.lock().unwrap().contains(&DeployEvent::ShellOutput {
            line: "started".to_string()
        }));
        assert_eq!(remote.shell_commands().len(), 2);
        assert_eq!(remote.count(|op| matches!(op, RemoteOp::CloseShell)), 2);
    }

    #[test]
    fn failed_send_closes_the_shell() {
        let remote = InMemoryRemote::new().fail_command("reboot", ChannelError::Closed);
        let session = remote.connect(&ConnectionInfo::new("pi")).unwrap();
        let recorder = Arc::new(Recorder::default());

        let err = runner(session.commands(), &recorder, &ShellForwarding::default())
            .run(CommandMode::Shell, "reboot")
            .unwrap_err();

        assert!(matches!(err, DeployError::Command { .. }));
        assert_eq!(remote.count(|op| matches!(op, RemoteOp::CloseShell)), 1);
    }

    #[test]
    fn forwarding_switch_is_shared() {
        let forwarding = ShellForwarding::new(false);
        let clone = forwarding.clone();
        clone.enable();
        assert!(forwarding.is_enabled());
        forwarding.disable();
        assert!(!clone.is_enabled());
    }
}
