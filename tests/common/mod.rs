//! Common test utilities for sshdeploy integration tests.
//!
//! This module provides:
//! - `RecordingSink`: thread-safe event recorder
//! - Source tree and package store builders on temp directories
//! - Fixtures: reusable manifest content

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::*;

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use sshdeploy::domain::ports::{DeployEvent, DeployEventSink, DeployStep};
use sshdeploy::infrastructure::{FixedPackageStore, InMemoryRemote, JsonManifestDecoder, LocalFs};
use sshdeploy::{ConnectionInfo, DeploymentConfig, DeploymentOrchestrator};
use tempfile::{tempdir, TempDir};

/// Records every event it receives.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<DeployEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<DeployEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn steps(&self) -> Vec<DeployStep> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DeployEvent::StepStarted { step } => Some(step),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&DeployEvent) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

impl DeployEventSink for RecordingSink {
    fn on_event(&self, event: DeployEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Write `files` (relative path, contents) under a fresh temp directory.
pub fn source_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempdir().unwrap();
    write_files(dir.path(), files);
    dir
}

pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, contents) in files {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

pub fn config(source: &Path, target: &str) -> DeploymentConfig {
    DeploymentConfig::new(source, target, ConnectionInfo::new("raspberrypi").with_username("pi"))
}

pub fn orchestrator(
    remote: &InMemoryRemote,
    sink: Arc<dyn DeployEventSink>,
    store: Option<&Path>,
) -> DeploymentOrchestrator<InMemoryRemote, LocalFs> {
    let store = match store {
        Some(root) => FixedPackageStore::new(root),
        None => FixedPackageStore::none(),
    };
    DeploymentOrchestrator::new(
        remote.clone(),
        LocalFs::new(),
        Box::new(JsonManifestDecoder::new()),
        Box::new(store),
    )
    .with_events(sink)
}
