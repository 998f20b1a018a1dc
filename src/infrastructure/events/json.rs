//! JSON Event Sink
//!
//! Outputs deploy events as NDJSON for CI/automation consumption.

use crate::domain::ports::{DeployEvent, DeployEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
    command: &'static str,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout(command: &'static str) -> Self {
        Self::with_writer(command, io::stdout())
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(command: &'static str, writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            command,
        }
    }

    fn write_event(&self, mut event: serde_json::Value) {
        if let Some(object) = event.as_object_mut() {
            object.insert("command".to_string(), self.command.into());
        }
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        let json = match event {
            DeployEvent::Started {
                source,
                target,
                address,
            } => serde_json::json!({
                "event": "start",
                "source": source.display().to_string(),
                "target": target.as_str(),
                "address": address,
            }),

            DeployEvent::Skipped { reason } => serde_json::json!({
                "event": "skipped",
                "reason": reason,
            }),

            DeployEvent::StepStarted { step } => serde_json::json!({
                "event": "step",
                "step": step.as_str(),
            }),

            DeployEvent::CommandStarted { mode, command } => serde_json::json!({
                "event": "command_start",
                "mode": mode.as_str(),
                "command_text": command,
            }),

            DeployEvent::CommandOutput { line } => serde_json::json!({
                "event": "command_output",
                "line": line,
            }),

            DeployEvent::CommandFailed { command, message } => serde_json::json!({
                "event": "command_failed",
                "command_text": command,
                "error": message,
            }),

            DeployEvent::CleaningTarget { path } => serde_json::json!({
                "event": "cleaning",
                "path": path.as_str(),
            }),

            DeployEvent::DirectoryCreated { path } => serde_json::json!({
                "event": "directory_created",
                "path": path.as_str(),
            }),

            DeployEvent::DependenciesStarted { count } => serde_json::json!({
                "event": "dependencies",
                "count": count,
            }),

            DeployEvent::DependencyUploaded { name, remote } => serde_json::json!({
                "event": "dependency_uploaded",
                "name": name,
                "path": remote.as_str(),
            }),

            DeployEvent::FilesStarted { count, excluded } => serde_json::json!({
                "event": "files",
                "count": count,
                "excluded": excluded,
            }),

            DeployEvent::FileUploaded { index, remote } => serde_json::json!({
                "event": "item_written",
                "index": index,
                "path": remote.as_str(),
            }),

            DeployEvent::Failed { step, message } => serde_json::json!({
                "event": "error",
                "step": step.map(|s| s.as_str()),
                "error": message,
            }),

            DeployEvent::Finished { sequence, elapsed } => serde_json::json!({
                "event": "complete",
                "sequence": sequence,
                "elapsed_secs": elapsed.as_secs_f64(),
            }),

            DeployEvent::ShellOutput { line } => serde_json::json!({
                "event": "shell_output",
                "line": line,
            }),
        };

        self.write_event(json);
    }

    fn wants_detailed_events(&self) -> bool {
        true // JSON mode wants all events
    }
}
