use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use super::TracingConfig;

/// Filter used when `RUST_LOG` is absent: the configured level globally,
/// with the crate itself one notch chattier and HTTP traces on.
fn default_directives(level: &str) -> String {
    format!("{level},dealcoach=debug,tower_http=debug")
}

/// Initialize the tracing subscriber with structured logging.
pub fn init_tracing(config: TracingConfig, port: u16) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.default_level)));

    if config.json_format {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }

    tracing::info!(
        port = port,
        environment = %config.environment,
        json_format = config.json_format,
        "Server initialized"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_drives_the_fallback_filter() {
        assert_eq!(default_directives("warn"), "warn,dealcoach=debug,tower_http=debug");
        // The directive string must parse as an EnvFilter.
        assert!(default_directives("info").parse::<EnvFilter>().is_ok());
    }
}
