use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output for terminals.
    #[default]
    Compact,
    /// One JSON object per event, for log shippers.
    Json,
}

/// Directive used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "uni_scout=debug,info"
    } else {
        "uni_scout=info"
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn try_init_logger(
    format: LogFormat,
    verbose: bool,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .compact(),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .json()
                    .with_current_span(false),
            )
            .try_init(),
    }
}

pub fn init_logger(format: LogFormat, verbose: bool) {
    if let Err(e) = try_init_logger(format, verbose) {
        eprintln!("⚠️ Logger already initialised: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_parses() {
        for verbose in [false, true] {
            assert!(default_directive(verbose).parse::<EnvFilter>().is_ok());
        }
        assert!(default_directive(true).contains("debug"));
    }

    #[test]
    fn test_second_init_is_reported_not_fatal() {
        let _ = try_init_logger(LogFormat::Compact, false);
        assert!(try_init_logger(LogFormat::Json, false).is_err());
        init_logger(LogFormat::Json, true);
    }
}
