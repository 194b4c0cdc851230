use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

use crate::errors::{ClawIqError, Result};

/// Initializes the tracing subscriber used by the ClawIQ binaries.
///
/// Output goes to stderr so machine-readable results on stdout stay clean.
/// `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(level: Option<&str>) -> Result<()> {
    let default_level = level.unwrap_or("warn");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init()
        .map_err(|err| ClawIqError::LoggingError(err.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialization_reports_logging_error() {
        let _ = init_tracing(Some("debug"));
        let err = init_tracing(Some("debug")).unwrap_err();
        assert!(matches!(err, ClawIqError::LoggingError(_)));
        assert!(err.to_string().starts_with("logging setup failed"));
    }
}
