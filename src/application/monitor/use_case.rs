//! Monitor Use Case implementation

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::application::deploy::DeploymentOrchestrator;
use crate::domain::entities::DeploymentConfig;
use crate::domain::ports::{FileSystem, RemoteSession, SessionProvider};
use crate::error::{DeployError, DeployResult};

use super::state::{ChangeFilter, MonitorEvent, MonitorOptions, WatcherState};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const STARTUP_COOLDOWN: Duration = Duration::from_millis(500);

/// Monitor Use Case
///
/// Keeps one session open and redeploys after every settled burst of
/// changes. This is the main entry point for `sshdeploy monitor`.
pub struct MonitorUseCase<'a, P, FS>
where
    P: SessionProvider,
    FS: FileSystem,
{
    orchestrator: &'a DeploymentOrchestrator<P, FS>,
    config: DeploymentConfig,
    options: MonitorOptions,
}

impl<'a, P, FS> MonitorUseCase<'a, P, FS>
where
    P: SessionProvider,
    FS: FileSystem,
{
    pub fn new(
        orchestrator: &'a DeploymentOrchestrator<P, FS>,
        config: &DeploymentConfig,
        options: MonitorOptions,
    ) -> Self {
        Self {
            orchestrator,
            config: config.normalized(),
            options,
        }
    }

    /// Path handed to the file watcher
    pub fn watched_path(&self) -> PathBuf {
        match &self.options.trigger_file {
            Some(trigger) => match trigger.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
            None => self.config.source.clone(),
        }
    }

    /// Start monitoring (blocking)
    ///
    /// Blocks until the running flag is set to false. Deployment progress
    /// goes to the orchestrator's event sink; monitor-level events go to
    /// `on_event`.
    pub fn start<F>(&self, running: Arc<AtomicBool>, on_event: F) -> DeployResult<()>
    where
        F: Fn(MonitorEvent),
    {
        self.orchestrator.check_source(&self.config)?;

        let watching = self
            .options
            .trigger_file
            .clone()
            .unwrap_or_else(|| self.config.source.clone());
        on_event(MonitorEvent::MonitorStarted {
            source: self.config.source.display().to_string(),
            watching: watching.display().to_string(),
        });

        let session = self.orchestrator.open_session(&self.config)?;
        let outcome = self.run(&session, &running, &on_event);

        // The shell lives on the session's connection; close it first.
        self.orchestrator.finish_shell();
        drop(session);

        on_event(MonitorEvent::Shutdown);
        outcome
    }

    fn run<F>(
        &self,
        session: &RemoteSession,
        running: &AtomicBool,
        on_event: &F,
    ) -> DeployResult<()>
    where
        F: Fn(MonitorEvent),
    {
        if self.options.deploy_on_start {
            self.deploy(session, on_event);
        }
        if !running.load(Ordering::SeqCst) {
            return Ok(());
        }

        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    for path in event.paths {
                        let _ = tx.send(path);
                    }
                }
            },
            Config::default(),
        )
        .map_err(watch_error)?;

        let mode = if self.options.trigger_file.is_some() {
            RecursiveMode::NonRecursive
        } else {
            RecursiveMode::Recursive
        };
        let watched = self.watched_path();
        watcher.watch(&watched, mode).map_err(watch_error)?;
        tracing::info!(path = %watched.display(), "watching for changes");

        let mut filter = ChangeFilter::new(self.options.trigger_file.clone());
        self.remember_source(&mut filter);

        // notify may report existing files right after registration
        let cooldown_end = Instant::now() + STARTUP_COOLDOWN;
        while running.load(Ordering::SeqCst) && Instant::now() < cooldown_end {
            let _ = rx.recv_timeout(POLL_INTERVAL);
        }

        let mut state = WatcherState::new(self.options.debounce);
        while running.load(Ordering::SeqCst) {
            if let Ok(path) = rx.recv_timeout(POLL_INTERVAL) {
                if let Some(changed) = filter.accept(path) {
                    tracing::debug!(path = %changed.display(), "change detected");
                    state.add_change(changed);
                }
            }

            if state.should_sync() {
                let changes = state.take_changes();
                on_event(MonitorEvent::ChangesDetected {
                    paths: changes.iter().map(|p| p.display().to_string()).collect(),
                });
                self.deploy(session, on_event);

                let dropped = drain(&rx);
                if dropped > 0 {
                    tracing::info!(count = dropped, "dropped changes seen during deployment");
                    on_event(MonitorEvent::ChangesDropped { count: dropped });
                }
            }
        }

        Ok(())
    }

    fn deploy<F>(&self, session: &RemoteSession, on_event: &F)
    where
        F: Fn(MonitorEvent),
    {
        if let Err(e) = self.orchestrator.deploy_with_session(session, &self.config) {
            tracing::error!(error = %e, "deployment could not run");
            on_event(MonitorEvent::Error {
                message: e.to_string(),
            });
        }
    }

    /// Seed the filter with the current tree so unchanged files stay quiet.
    fn remember_source(&self, filter: &mut ChangeFilter) {
        if self.options.trigger_file.is_some() {
            return;
        }
        let walker = ignore::WalkBuilder::new(&self.config.source)
            .standard_filters(false)
            .build();
        for entry in walker.flatten() {
            if entry.file_type().is_some_and(|t| t.is_file()) {
                filter.remember(entry.path());
            }
        }
    }
}

fn drain(rx: &Receiver<PathBuf>) -> usize {
    rx.try_iter().count()
}

fn watch_error(e: notify::Error) -> DeployError {
    DeployError::Io(std::io::Error::other(e.to_string()))
}
