use sshdeploy::{DeploymentConfig, MonitorEvent};

use crate::ui::blocks::header::CommandHeader;
use crate::ui::primitives::icon::Icon;
use crate::ui::views::push::add_options;

pub fn render_monitor_header(
    config: &DeploymentConfig,
    watching: &str,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut header = CommandHeader::new(Icon::Watch, "SSH Deploy Monitor");
    add_options(&mut header, config);
    header.add("Monitoring", watching);
    header.add("Hint", "Press Ctrl+C to stop");
    header.render(supports_color, supports_unicode)
}

pub fn render_monitor_event(
    timestamp: &str,
    event: &MonitorEvent,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let prefix = format!("[{}]", timestamp);

    match event {
        MonitorEvent::MonitorStarted { watching, .. } => format!(
            "{} {} Monitoring: {}\n",
            prefix,
            Icon::Watch.colored(supports_color, supports_unicode),
            watching
        ),
        MonitorEvent::ChangesDetected { paths } => {
            let mut out = format!(
                "{} {} {} change(s) detected\n",
                prefix,
                Icon::Arrow.colored(supports_color, supports_unicode),
                paths.len()
            );
            for path in paths {
                out.push_str(&format!("    {}\n", path));
            }
            out
        }
        MonitorEvent::ChangesDropped { count } => format!(
            "{} {} Ignored {} change(s) made during the deployment\n",
            prefix,
            Icon::Warning.colored(supports_color, supports_unicode),
            count
        ),
        MonitorEvent::Error { message } => format!(
            "{} {} Error: {}\n",
            prefix,
            Icon::Error.colored(supports_color, supports_unicode),
            message
        ),
        MonitorEvent::Shutdown => format!(
            "\n{} {} Monitor stopped.\n",
            prefix,
            Icon::Watch.colored(supports_color, supports_unicode)
        ),
    }
}
