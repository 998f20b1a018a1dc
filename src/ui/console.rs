//! Console Event Sink
//!
//! Renders deploy events as operator status lines.

use std::io::{self, Write};
use std::sync::Mutex;

use sshdeploy::domain::ports::{DeployEvent, DeployEventSink};

use crate::ui::context::UiContext;
use crate::ui::views::deploy::render_deploy_event;

pub struct ConsoleEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
    detailed: bool,
    color: bool,
    unicode: bool,
}

impl ConsoleEventSink {
    pub fn stdout(ui: &UiContext) -> Self {
        Self::with_writer(ui, io::stdout())
    }

    pub fn with_writer<W: Write + Send + 'static>(ui: &UiContext, writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            detailed: ui.verbose > 0,
            color: ui.color,
            unicode: ui.unicode,
        }
    }
}

impl DeployEventSink for ConsoleEventSink {
    fn on_event(&self, event: DeployEvent) {
        let Some(line) = render_deploy_event(&event, self.detailed, self.color, self.unicode)
        else {
            return;
        };
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.write_all(line.as_bytes());
            let _ = writer.flush();
        }
    }

    fn wants_detailed_events(&self) -> bool {
        self.detailed
    }
}
