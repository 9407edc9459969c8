//! Logging and tracing initialization.

use std::fs::File;
use std::sync::Mutex;

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber with the given configuration.
///
/// `RUST_LOG` wins when set; otherwise the configured level is expanded
/// into a Peekframe-scoped directive. With a log file configured, output
/// goes there (plain format, no ANSI); otherwise stderr, JSON or plain
/// per the configuration.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(&config.level)));

    let builder = fmt::Subscriber::builder().with_env_filter(env_filter);

    if let Some(path) = config.file.as_ref() {
        match File::create(path) {
            Ok(file) => {
                let subscriber = builder
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .finish();
                tracing::subscriber::set_global_default(subscriber).ok();
                return;
            }
            Err(e) => {
                eprintln!("Failed to open log file {}: {e}", path.display());
            }
        }
    }

    if config.json {
        let subscriber = builder.json().finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = builder
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

/// Expand a bare level ("debug") into a directive that applies it to the
/// Peekframe crates while keeping dependencies at warn. Anything already
/// carrying targets or commas passes through untouched.
fn filter_directive(level: &str) -> String {
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }
    let crates = [
        "peekframe_common",
        "peekframe_model",
        "peekframe_backend",
        "peekframe_coordinator",
        "peekframe",
    ];
    let mut directive = String::from("warn");
    for krate in crates {
        directive.push_str(&format!(",{krate}={level}"));
    }
    directive
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_is_scoped_to_peekframe_crates() {
        let directive = filter_directive("debug");
        assert!(directive.starts_with("warn,"));
        assert!(directive.contains("peekframe_coordinator=debug"));
        assert!(directive.contains("peekframe=debug"));
    }

    #[test]
    fn explicit_directives_pass_through() {
        assert_eq!(
            filter_directive("peekframe_backend=trace,warn"),
            "peekframe_backend=trace,warn"
        );
        assert_eq!(filter_directive("info,hyper=off"), "info,hyper=off");
    }
}
