use sshdeploy::domain::ports::DeployStep;
use sshdeploy::domain::value_objects::RemotePath;
use sshdeploy::{DeploymentConfig, DeploymentReport, DeploymentStatus};

use crate::ui::blocks::header::CommandHeader;
use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

pub fn render_push_header(
    config: &DeploymentConfig,
    dry_run: bool,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let title = if dry_run {
        "SSH Deploy (dry run)"
    } else {
        "SSH Deploy"
    };
    let mut header = CommandHeader::new(Icon::Deploy, title);
    add_options(&mut header, config);
    header.render(supports_color, supports_unicode)
}

/// Operator-facing rows describing one deployment configuration.
pub fn add_options(header: &mut CommandHeader, config: &DeploymentConfig) {
    header.add("Configuration", config.configuration.as_str());
    header.add("Framework", config.framework.as_str());
    header.add("Source Path", config.source.display().to_string());
    header.add("Excluded Files", config.exclusions.joined());
    header.add("Target Address", config.connection.address());
    header.add(
        "Username",
        config.connection.username.clone().unwrap_or_default(),
    );
    header.add("Target Path", config.target.as_str());
    header.add(
        "Clean Target",
        if config.clean_target { "YES" } else { "NO" },
    );
    header.add("Pre Deployment", config.pre_command.as_str());
    header.add("Post Deployment", config.post_command.as_str());
}

pub fn render_push_summary(
    report: &DeploymentReport,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    match &report.status {
        DeploymentStatus::Succeeded => {
            let icon = if report.warnings.is_empty() {
                Icon::Success
            } else {
                Icon::Warning
            };
            format!(
                "{} Deployed {} files and {} dependencies ({} bytes, {} excluded)\n",
                icon.colored(supports_color, supports_unicode),
                report.files_uploaded,
                report.dependencies_uploaded,
                report.bytes_uploaded,
                report.files_excluded
            )
        }
        DeploymentStatus::Failed { step, message } => format!(
            "{} {}\n",
            Icon::Error.colored(supports_color, supports_unicode),
            ColoredText::error(format!(
                "Deployment failed while {}: {}",
                step_label(*step),
                message
            ))
            .render(supports_color)
        ),
        DeploymentStatus::Skipped => format!(
            "{} Another deployment is in progress, nothing was done\n",
            Icon::Warning.colored(supports_color, supports_unicode)
        ),
    }
}

/// What a dry run would have done on the remote host.
pub fn render_dry_run(
    directories: &[RemotePath],
    uploads: &[RemotePath],
    shell_commands: &[String],
    detailed: bool,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut out = format!(
        "{} Dry run: would create {} directories and upload {} files\n",
        Icon::Remote.colored(supports_color, supports_unicode),
        directories.len(),
        uploads.len()
    );
    if detailed {
        for dir in directories {
            out.push_str(&format!("    mkdir {}\n", dir));
        }
        for file in uploads {
            out.push_str(&format!("    put   {}\n", file));
        }
    }
    for command in shell_commands {
        out.push_str(&format!("    shell {}\n", command));
    }
    out
}

/// Final NDJSON record of a push.
pub fn push_report_json(report: &DeploymentReport) -> serde_json::Value {
    let status = match report.status {
        DeploymentStatus::Succeeded => "succeeded",
        DeploymentStatus::Failed { .. } => "failed",
        DeploymentStatus::Skipped => "skipped",
    };
    let mut value = serde_json::json!({
        "event": "complete",
        "command": "push",
        "status": status,
        "sequence": report.sequence,
        "elapsed_ms": report.elapsed.as_millis() as u64,
        "dependencies": report.dependencies_uploaded,
        "files": report.files_uploaded,
        "excluded": report.files_excluded,
        "directories_created": report.directories_created,
        "bytes": report.bytes_uploaded,
        "warnings": report.warnings,
    });
    if let (Some((step, message)), Some(object)) = (report.failure(), value.as_object_mut()) {
        object.insert("step".to_string(), step.as_str().into());
        object.insert("error".to_string(), message.into());
    }
    value
}

pub fn step_label(step: DeployStep) -> &'static str {
    match step {
        DeployStep::PreCommand => "running the pre-deployment command",
        DeployStep::Preparing => "preparing the target path",
        DeployStep::UploadingDependencies => "uploading dependencies",
        DeployStep::UploadingPayload => "uploading files",
        DeployStep::PostCommand => "running the post-deployment command",
    }
}
