use std::time::Duration;

use sshdeploy::domain::ports::DeployEvent;

use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;
use crate::ui::views::push::step_label;

/// Render one pipeline event as a status line.
///
/// Returns `None` for events that are only shown with `detailed` output.
pub fn render_deploy_event(
    event: &DeployEvent,
    detailed: bool,
    supports_color: bool,
    supports_unicode: bool,
) -> Option<String> {
    let line = match event {
        DeployEvent::Started {
            source,
            target,
            address,
        } => format!(
            "\n{} Deploying {} to {} on {}\n",
            Icon::Remote.colored(supports_color, supports_unicode),
            source.display(),
            target,
            address
        ),
        DeployEvent::Skipped { reason } => format!(
            "{} Skipped: {}\n",
            Icon::Warning.colored(supports_color, supports_unicode),
            reason
        ),
        DeployEvent::StepStarted { step } if detailed => format!(
            "    {} {}\n",
            Icon::Progress.colored(supports_color, supports_unicode),
            ColoredText::dim(step_label(*step)).render(supports_color)
        ),
        DeployEvent::StepStarted { .. } => return None,
        DeployEvent::CommandStarted { mode, command } => format!(
            "    {} {} {}\n",
            Icon::Arrow.colored(supports_color, supports_unicode),
            mode,
            command
        ),
        DeployEvent::CommandOutput { line } | DeployEvent::ShellOutput { line } => {
            format!("{}\n", line)
        }
        DeployEvent::CommandFailed { message, .. } => format!(
            "    {} {}\n",
            Icon::Warning.colored(supports_color, supports_unicode),
            ColoredText::warning(message.as_str()).render(supports_color)
        ),
        DeployEvent::CleaningTarget { path } => format!(
            "    {} Cleaning {}\n",
            Icon::Trash.colored(supports_color, supports_unicode),
            path
        ),
        DeployEvent::DirectoryCreated { path } if detailed => format!(
            "    {} Created {}\n",
            Icon::Arrow.colored(supports_color, supports_unicode),
            path
        ),
        DeployEvent::DirectoryCreated { .. } => return None,
        DeployEvent::DependenciesStarted { count } => format!(
            "{}\n",
            ColoredText::success(format!("    Deploying {} dependencies.", count))
                .render(supports_color)
        ),
        DeployEvent::DependencyUploaded { name, .. } => format!(
            "{}\n",
            ColoredText::success(format!("    {}", name)).render(supports_color)
        ),
        DeployEvent::FilesStarted { count, excluded } => {
            let text = if *excluded > 0 {
                format!("    Deploying {} files ({} excluded).", count, excluded)
            } else {
                format!("    Deploying {} files.", count)
            };
            format!("{}\n", ColoredText::success(text).render(supports_color))
        }
        DeployEvent::FileUploaded { index, remote } if detailed => format!(
            "    {} {}\n",
            ColoredText::dim(format!("{:>4}", index + 1)).render(supports_color),
            remote
        ),
        DeployEvent::FileUploaded { .. } => return None,
        DeployEvent::Failed { step, message } => {
            let text = match step {
                Some(step) => format!("Failed while {}: {}", step_label(*step), message),
                None => format!("Failed: {}", message),
            };
            format!(
                "    {} {}\n",
                Icon::Error.colored(supports_color, supports_unicode),
                ColoredText::error(text).render(supports_color)
            )
        }
        DeployEvent::Finished { elapsed, .. } => format!(
            "{}\n",
            ColoredText::success(format!(
                "    Finished deployment in {} seconds.",
                rounded_seconds(*elapsed)
            ))
            .render(supports_color)
        ),
    };
    Some(line)
}

/// Seconds rounded to two decimals, without trailing zeros.
pub fn rounded_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}
