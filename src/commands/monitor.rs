use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use sshdeploy::infrastructure::SshSessionProvider;
use sshdeploy::{MonitorEvent, MonitorOptions, MonitorUseCase};

use crate::cli::DeployArgs;
use crate::ui::context::UiContext;
use crate::ui::views::monitor::{render_monitor_event, render_monitor_header};

pub struct MonitorArgs {
    pub trigger_file: Option<PathBuf>,
    pub debounce_ms: Option<u64>,
    pub no_initial_deploy: bool,
}

pub fn cmd_monitor(
    args: &DeployArgs,
    monitor: MonitorArgs,
    json: bool,
    verbose: u8,
) -> Result<ExitCode> {
    let ui = UiContext::new(json, verbose);
    let mut overrides = args.overrides();
    overrides.trigger_file = monitor.trigger_file;

    let mut config = super::load_config(args, &overrides, &ui)?;
    if let Some(ms) = monitor.debounce_ms {
        config.monitor.debounce_ms = ms;
    }
    let deployment = config.deployment_config()?;

    let options = MonitorOptions::default()
        .with_trigger_file(config.monitor.trigger_file.clone())
        .with_debounce(config.debounce())
        .with_deploy_on_start(!monitor.no_initial_deploy);

    let orchestrator =
        super::orchestrator(SshSessionProvider::new(), super::event_sink(&ui, "monitor"));
    let use_case = MonitorUseCase::new(&orchestrator, &deployment, options);

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .context("failed to install the Ctrl+C handler")?;

    if !json {
        let watching = config
            .monitor
            .trigger_file
            .as_ref()
            .unwrap_or(&deployment.source)
            .display()
            .to_string();
        print!(
            "{}",
            render_monitor_header(&deployment, &watching, ui.color, ui.unicode)
        );
    }

    use_case.start(running, |event| {
        if json {
            println!("{}", event.to_json());
            return;
        }
        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
        let rendered = render_monitor_event(&timestamp, &event, ui.color, ui.unicode);
        match event {
            MonitorEvent::Error { .. } => eprint!("{rendered}"),
            _ => print!("{rendered}"),
        }
    })?;

    Ok(ExitCode::SUCCESS)
}
