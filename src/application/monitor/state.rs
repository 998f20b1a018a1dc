//! Monitor options, events and debounce state

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

/// Debounce duration in milliseconds
pub const DEBOUNCE_MS: u64 = 500;

/// Monitor options
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// Watch only this file instead of the whole source tree
    pub trigger_file: Option<PathBuf>,
    /// Quiet period after the last change before deploying
    pub debounce: Duration,
    /// Deploy once before waiting for changes
    pub deploy_on_start: bool,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            trigger_file: None,
            debounce: Duration::from_millis(DEBOUNCE_MS),
            deploy_on_start: true,
        }
    }
}

impl MonitorOptions {
    pub fn with_trigger_file(mut self, path: Option<PathBuf>) -> Self {
        self.trigger_file = path;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_deploy_on_start(mut self, deploy: bool) -> Self {
        self.deploy_on_start = deploy;
        self
    }
}

/// Monitor event types for NDJSON output
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// Monitoring started
    MonitorStarted { source: String, watching: String },
    /// A settled burst of changes triggered a deployment
    ChangesDetected { paths: Vec<String> },
    /// Change events that arrived while a deployment ran
    ChangesDropped { count: usize },
    /// A trigger could not be deployed
    Error { message: String },
    /// Monitoring stopped
    Shutdown,
}

impl MonitorEvent {
    /// Convert to JSON string with "command": "monitor" field included
    pub fn to_json(&self) -> String {
        let mut value =
            serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({"event": "error"}));
        if let Some(obj) = value.as_object_mut() {
            obj.insert("command".to_string(), serde_json::json!("monitor"));
        }
        serde_json::to_string(&value).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Watcher state for debouncing
#[derive(Debug)]
pub struct WatcherState {
    pending_changes: HashSet<PathBuf>,
    last_change: Option<Instant>,
    debounce: Duration,
}

impl Default for WatcherState {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEBOUNCE_MS))
    }
}

impl WatcherState {
    pub fn new(debounce: Duration) -> Self {
        Self {
            pending_changes: HashSet::new(),
            last_change: None,
            debounce,
        }
    }

    /// Add a file change to pending changes
    pub fn add_change(&mut self, path: PathBuf) {
        self.pending_changes.insert(path);
        self.last_change = Some(Instant::now());
    }

    /// Check if debounce period has passed and we have pending changes
    pub fn should_sync(&self) -> bool {
        match self.last_change {
            Some(last) => !self.pending_changes.is_empty() && last.elapsed() >= self.debounce,
            None => false,
        }
    }

    /// Take all pending changes, resetting state
    pub fn take_changes(&mut self) -> Vec<PathBuf> {
        let mut changes: Vec<_> = self.pending_changes.drain().collect();
        changes.sort();
        self.last_change = None;
        changes
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_changes.is_empty()
    }
}

/// `sha256:<hex>` of a file's bytes; `None` when the file cannot be read.
pub fn compute_content_hash(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    Some(format!("sha256:{:x}", Sha256::digest(&bytes)))
}

/// Decides which raw watcher paths count as changes.
///
/// A path counts when it is the trigger file (or any file under the source
/// when no trigger is set) and its content hash differs from the last one
/// seen. Removing a previously seen file also counts.
#[derive(Debug, Default)]
pub struct ChangeFilter {
    trigger: Option<PathBuf>,
    hashes: HashMap<PathBuf, String>,
}

impl ChangeFilter {
    pub fn new(trigger: Option<PathBuf>) -> Self {
        let trigger = trigger.map(|t| t.canonicalize().unwrap_or(t));
        let mut hashes = HashMap::new();
        if let Some(path) = &trigger {
            if let Some(hash) = compute_content_hash(path) {
                hashes.insert(path.clone(), hash);
            }
        }
        Self { trigger, hashes }
    }

    /// Record the current hash of `path` without reporting it.
    pub fn remember(&mut self, path: &Path) {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if let Some(hash) = compute_content_hash(&path) {
            self.hashes.insert(path, hash);
        }
    }

    /// Returns the canonical path when the event is a real change.
    pub fn accept(&mut self, path: PathBuf) -> Option<PathBuf> {
        let path = path.canonicalize().unwrap_or(path);
        if let Some(trigger) = &self.trigger {
            if &path != trigger {
                return None;
            }
        }

        match compute_content_hash(&path) {
            Some(hash) => {
                if self.hashes.get(&path) == Some(&hash) {
                    return None;
                }
                self.hashes.insert(path.clone(), hash);
                Some(path)
            }
            None => self.hashes.remove(&path).map(|_| path),
        }
    }
}
