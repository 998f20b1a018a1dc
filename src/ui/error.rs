use sshdeploy::DeployError;

use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

pub fn format_error(err: &anyhow::Error) -> String {
    let caps = crate::ui::terminal::detect_capabilities();
    format_error_with(err, caps.supports_color, caps.supports_unicode)
}

pub(crate) fn format_error_with(
    err: &anyhow::Error,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut out = format!(
        "{} {}\n",
        Icon::Error.colored(supports_color, supports_unicode),
        ColoredText::error(err.to_string()).render(supports_color)
    );
    if let Some(fix) = err.downcast_ref::<DeployError>().and_then(fix_for) {
        out.push_str(&format!(
            "  {} {}\n",
            Icon::Arrow.colored(supports_color, supports_unicode),
            ColoredText::dim(fix).render(supports_color)
        ));
    }
    out
}

fn fix_for(err: &DeployError) -> Option<&'static str> {
    match err {
        DeployError::SourceNotFound { .. } => {
            Some("Build the project first or pass the output directory with --source.")
        }
        DeployError::Connection { .. } => {
            Some("Check the host, port and credentials; `ssh` must be able to log in without a prompt.")
        }
        DeployError::Config { .. } => {
            Some("Fix the setting in sshdeploy.toml or pass it on the command line.")
        }
        _ => None,
    }
}
