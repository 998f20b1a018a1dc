//! Monitor Use Case
//!
//! Continuous deployment: one session stays open while the source tree (or
//! a single trigger file) is watched.
//! - File system monitoring (via `notify` crate)
//! - Debouncing (500ms default)
//! - Content hashing so touch-only events are ignored
//! - Changes seen while a deployment runs are dropped, not queued
//!
//! ## Usage
//!
//! ```ignore
//! let monitor = MonitorUseCase::new(&orchestrator, &config, MonitorOptions::default());
//! monitor.start(running, |event| { ... });
//! ```

mod state;
mod use_case;


pub use state::{
    compute_content_hash, ChangeFilter, MonitorEvent, MonitorOptions, WatcherState, DEBOUNCE_MS,
};
pub use use_case::MonitorUseCase;
