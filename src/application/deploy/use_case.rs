//! Deployment Orchestrator
//!
//! Runs one deployment per trigger:
//! 1. Check the source directory (before any remote action)
//! 2. Take the single-flight lease
//! 3. Pre-command, prepare target, upload dependencies, upload payload
//! 4. Release the lease, record timing, run the post-command in a shell
//!
//! A failing step skips the steps after it but never the finalization.

use std::sync::{Arc, Mutex};

use crate::domain::entities::{DeploymentConfig, DeploymentState};
use crate::domain::ports::{
    DeployEvent, DeployEventSink, DeployStep, FileSystem, ManifestDecoder, NoopEventSink,
    PackageStore, RemoteSession, SessionProvider,
};
use crate::domain::value_objects::CommandMode;
use crate::error::{DeployError, DeployResult};

use super::result::{DeploymentReport, DeploymentStatus};
use crate::application::command_runner::{
    CommandOutcome, RemoteCommandRunner, ShellForwarding, ShellRelay,
};
use crate::application::dependency_resolver::ManifestDependencyResolver;
use crate::application::file_synchronizer::FileSynchronizer;
use crate::application::remote_path_preparer::RemotePathPreparer;

struct StepFailure {
    step: DeployStep,
    error: DeployError,
}

trait AtStep<T> {
    fn at(self, step: DeployStep) -> Result<T, StepFailure>;
}

impl<T> AtStep<T> for DeployResult<T> {
    fn at(self, step: DeployStep) -> Result<T, StepFailure> {
        self.map_err(|error| StepFailure { step, error })
    }
}

/// Deployment orchestrator - owns the lock, the counter and the pipeline
///
/// Parameterized by its transport and local filesystem ports.
pub struct DeploymentOrchestrator<P, FS>
where
    P: SessionProvider,
    FS: FileSystem,
{
    provider: P,
    file_system: FS,
    decoder: Box<dyn ManifestDecoder>,
    package_store: Box<dyn PackageStore>,
    events: Arc<dyn DeployEventSink>,
    state: DeploymentState,
    forwarding: ShellForwarding,
    shell: Mutex<Option<ShellRelay>>,
}

impl<P, FS> DeploymentOrchestrator<P, FS>
where
    P: SessionProvider,
    FS: FileSystem,
{
    pub fn new(
        provider: P,
        file_system: FS,
        decoder: Box<dyn ManifestDecoder>,
        package_store: Box<dyn PackageStore>,
    ) -> Self {
        Self {
            provider,
            file_system,
            decoder,
            package_store,
            events: Arc::new(NoopEventSink),
            state: DeploymentState::new(),
            forwarding: ShellForwarding::new(false),
            shell: Mutex::new(None),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn state(&self) -> &DeploymentState {
        &self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn forwarding(&self) -> &ShellForwarding {
        &self.forwarding
    }

    /// Connect, deploy once and close the session.
    ///
    /// Returns `Err` only when the run never reached the pipeline (missing
    /// source, connection failure). Pipeline failures come back as a
    /// [`DeploymentStatus::Failed`] report.
    pub fn execute_deployment(&self, config: &DeploymentConfig) -> DeployResult<DeploymentReport> {
        let config = config.normalized();
        self.check_source(&config)?;

        if self.state.is_deploying() {
            return Ok(self.skip());
        }

        let session = self.open_session(&config)?;
        let report = self.deploy_with_session(&session, &config);
        // The shell lives on the session's connection; close it first.
        self.finish_shell();
        report
    }

    /// Open a session to the configured host.
    pub fn open_session(&self, config: &DeploymentConfig) -> DeployResult<RemoteSession> {
        let address = config.connection.address();
        tracing::debug!(address = %address, "connecting");
        self.provider
            .connect(&config.connection)
            .map_err(|source| DeployError::Connection { address, source })
    }

    /// Deploy once over an already open session.
    pub fn deploy_with_session(
        &self,
        session: &RemoteSession,
        config: &DeploymentConfig,
    ) -> DeployResult<DeploymentReport> {
        let config = config.normalized();
        self.check_source(&config)?;

        let Some(lease) = self.state.try_acquire() else {
            return Ok(self.skip());
        };
        self.forwarding.disable();

        let target = config.target_path();
        tracing::info!(
            source = %config.source.display(),
            target = %target,
            address = %config.connection.address(),
            "deployment started"
        );
        self.events.on_event(DeployEvent::Started {
            source: config.source.clone(),
            target,
            address: config.connection.address(),
        });

        let mut report = DeploymentReport::new();
        if let Err(failure) = self.run_pipeline(session, &config, &mut report) {
            let message = failure.error.to_string();
            tracing::error!(step = failure.step.as_str(), error = %message, "deployment failed");
            self.events.on_event(DeployEvent::Failed {
                step: Some(failure.step),
                message: message.clone(),
            });
            report.status = DeploymentStatus::Failed {
                step: failure.step,
                message,
            };
        }

        let (sequence, elapsed) = lease.complete();
        report.sequence = Some(sequence);
        report.elapsed = elapsed;
        tracing::info!(sequence, elapsed_ms = elapsed.as_millis() as u64, "deployment finished");
        self.events
            .on_event(DeployEvent::Finished { sequence, elapsed });

        self.run_post_command(session, &config, &mut report);
        Ok(report)
    }

    /// Close the post-command shell, if one is running.
    pub fn finish_shell(&self) {
        let relay = self
            .shell
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(relay) = relay {
            relay.finish();
        }
    }

    /// Fail with `SourceNotFound` unless the source directory exists.
    pub fn check_source(&self, config: &DeploymentConfig) -> DeployResult<()> {
        if self.file_system.is_dir(&config.source) {
            Ok(())
        } else {
            Err(DeployError::SourceNotFound {
                path: config.source.clone(),
            })
        }
    }

    fn skip(&self) -> DeploymentReport {
        let reason = "a deployment is already in progress".to_string();
        tracing::info!("{}", reason);
        self.events.on_event(DeployEvent::Skipped { reason });
        DeploymentReport::skipped()
    }

    fn command_runner<'s>(
        &self,
        session: &'s RemoteSession,
        config: &DeploymentConfig,
    ) -> RemoteCommandRunner<'s> {
        RemoteCommandRunner::new(
            session.commands(),
            Arc::clone(&self.events),
            self.forwarding.clone(),
        )
        .with_timeout(config.pre_command_timeout)
        .with_shell_grace(config.shell_grace)
    }

    fn enter(&self, step: DeployStep) {
        tracing::debug!(step = step.as_str(), "entering step");
        self.events.on_event(DeployEvent::StepStarted { step });
    }

    fn run_pipeline(
        &self,
        session: &RemoteSession,
        config: &DeploymentConfig,
        report: &mut DeploymentReport,
    ) -> Result<(), StepFailure> {
        let events = self.events.as_ref();
        let target = config.target_path();

        self.enter(DeployStep::PreCommand);
        let runner = self.command_runner(session, config);
        if let Err(error) = runner.run(CommandMode::Client, &config.pre_command) {
            if config.strict_pre_command {
                return Err(StepFailure {
                    step: DeployStep::PreCommand,
                    error,
                });
            }
            let message = error.to_string();
            tracing::warn!(error = %message, "pre-command failed, continuing");
            events.on_event(DeployEvent::CommandFailed {
                command: config.pre_command.clone(),
                message: message.clone(),
            });
            report.warnings.push(message);
        }

        self.enter(DeployStep::Preparing);
        let preparer = RemotePathPreparer::new(session.files(), events);
        let outcome = self.transfer(session, config, &preparer, report);
        report.directories_created = preparer.directories_created();
        outcome?;

        tracing::debug!(target = %target, "pipeline complete");
        Ok(())
    }

    fn transfer(
        &self,
        session: &RemoteSession,
        config: &DeploymentConfig,
        preparer: &RemotePathPreparer<'_>,
        report: &mut DeploymentReport,
    ) -> Result<(), StepFailure> {
        let events = self.events.as_ref();
        let target = config.target_path();

        preparer.prepare_target(config).at(DeployStep::Preparing)?;

        self.enter(DeployStep::UploadingDependencies);
        let dependencies = ManifestDependencyResolver::new(
            &self.file_system,
            self.decoder.as_ref(),
            &config.runtime_identifier,
        )
        .resolve(&config.source)
        .at(DeployStep::UploadingDependencies)?;

        let package_store = config
            .package_store
            .clone()
            .or_else(|| self.package_store.root());
        let synchronizer = FileSynchronizer::new(&self.file_system, session.files(), preparer, events)
            .with_package_store(package_store);

        let deps = synchronizer
            .upload_dependencies(&target, &dependencies)
            .at(DeployStep::UploadingDependencies)?;
        report.dependencies_uploaded = deps.uploaded;
        report.bytes_uploaded += deps.bytes;

        self.enter(DeployStep::UploadingPayload);
        let payload = synchronizer
            .upload_tree(&config.source, &target, &config.exclusions)
            .at(DeployStep::UploadingPayload)?;
        report.files_uploaded = payload.uploaded;
        report.files_excluded = payload.excluded;
        report.bytes_uploaded += payload.bytes;
        Ok(())
    }

    fn run_post_command(
        &self,
        session: &RemoteSession,
        config: &DeploymentConfig,
        report: &mut DeploymentReport,
    ) {
        if config.post_command.trim().is_empty() {
            return;
        }
        self.enter(DeployStep::PostCommand);
        // One shell at a time; the previous post-command's shell ends here.
        self.finish_shell();
        if config.forward_shell_output {
            self.forwarding.enable();
        }

        match self
            .command_runner(session, config)
            .run(CommandMode::Shell, &config.post_command)
        {
            Ok(CommandOutcome::ShellStarted(relay)) => {
                *self
                    .shell
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(relay);
            }
            Ok(_) => {}
            Err(error) => {
                let message = error.to_string();
                tracing::warn!(error = %message, "post-command failed");
                self.events.on_event(DeployEvent::CommandFailed {
                    command: config.post_command.clone(),
                    message: message.clone(),
                });
                report.warnings.push(message);
            }
        }
    }
}
