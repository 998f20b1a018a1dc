pub mod monitor;
pub mod push;

use std::sync::Arc;

use anyhow::Result;
use sshdeploy::domain::ports::{DeployEventSink, SessionProvider};
use sshdeploy::infrastructure::{JsonEventSink, JsonManifestDecoder, LocalFs, NuGetPackageStore};
use sshdeploy::{Config, ConfigOverrides, DeploymentOrchestrator};

use crate::cli::DeployArgs;
use crate::ui::console::ConsoleEventSink;
use crate::ui::context::UiContext;
use crate::ui::primitives::icon::Icon;

/// Config file, then `SSHDEPLOY_*`, then command line values.
pub fn load_config(args: &DeployArgs, overrides: &ConfigOverrides, ui: &UiContext) -> Result<Config> {
    let working_dir = std::env::current_dir()?;
    let (config, warnings) = Config::discover(args.config.as_deref(), &working_dir)?;

    for warning in &warnings {
        tracing::warn!(key = %warning.key, "unknown config key");
        if !ui.json {
            eprintln!(
                "{} {}",
                Icon::Warning.colored(ui.color, ui.unicode),
                warning
            );
        }
    }

    Ok(config.with_env_overrides().with_overrides(overrides))
}

pub fn event_sink(ui: &UiContext, command: &'static str) -> Arc<dyn DeployEventSink> {
    if ui.json {
        Arc::new(JsonEventSink::stdout(command))
    } else {
        Arc::new(ConsoleEventSink::stdout(ui))
    }
}

pub fn orchestrator<P: SessionProvider>(
    provider: P,
    events: Arc<dyn DeployEventSink>,
) -> DeploymentOrchestrator<P, LocalFs> {
    DeploymentOrchestrator::new(
        provider,
        LocalFs::new(),
        Box::new(JsonManifestDecoder::new()),
        Box::new(NuGetPackageStore::new()),
    )
    .with_events(events)
}
