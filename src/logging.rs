//! Diagnostic tracing.
//!
//! - **Tracing (this module)**: diagnostics via `RUST_LOG` or `-v`, written to
//!   stderr so they never mix with NDJSON on stdout.
//! - **Operator status lines**: deploy events rendered by the console or JSON
//!   sink. Unaffected by the log level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for a `-v` count.
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "sshdeploy=info",
        2 => "sshdeploy=debug",
        _ => "sshdeploy=trace",
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the verbosity count decides.
/// Output: stderr, compact format. Calling this twice is harmless.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(default_directive(0), "warn");
        assert_eq!(default_directive(1), "sshdeploy=info");
        assert_eq!(default_directive(2), "sshdeploy=debug");
        assert_eq!(default_directive(7), "sshdeploy=trace");
    }

    #[test]
    fn init_twice_does_not_panic() {
        init(0);
        init(2);
    }
}
