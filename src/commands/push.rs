use std::process::ExitCode;

use anyhow::Result;
use sshdeploy::infrastructure::{InMemoryRemote, SshSessionProvider};
use sshdeploy::{DeploymentConfig, DeploymentReport};

use crate::cli::DeployArgs;
use crate::ui::context::UiContext;
use crate::ui::views::push::{
    push_report_json, render_dry_run, render_push_header, render_push_summary,
};

pub fn cmd_push(args: &DeployArgs, dry_run: bool, json: bool, verbose: u8) -> Result<ExitCode> {
    let ui = UiContext::new(json, verbose);
    let config = super::load_config(args, &args.overrides(), &ui)?;
    let deployment = config.deployment_config()?;

    if !json {
        print!(
            "{}",
            render_push_header(&deployment, dry_run, ui.color, ui.unicode)
        );
    }

    let report = if dry_run {
        push_dry_run(&deployment, &ui)?
    } else {
        let orchestrator =
            super::orchestrator(SshSessionProvider::new(), super::event_sink(&ui, "push"));
        orchestrator.execute_deployment(&deployment)?
    };

    if json {
        println!("{}", push_report_json(&report));
    } else {
        print!("{}", render_push_summary(&report, ui.color, ui.unicode));
    }

    Ok(if report.failure().is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn push_dry_run(deployment: &DeploymentConfig, ui: &UiContext) -> Result<DeploymentReport> {
    let remote = InMemoryRemote::new();
    let orchestrator = super::orchestrator(remote.clone(), super::event_sink(ui, "push"));
    let report = orchestrator.execute_deployment(deployment)?;

    if !ui.json {
        print!(
            "{}",
            render_dry_run(
                &remote.created_directories(),
                &remote.uploads(),
                &remote.shell_commands(),
                ui.verbose > 0,
                ui.color,
                ui.unicode
            )
        );
    }
    Ok(report)
}
