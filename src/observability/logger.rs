//! Log subscriber setup
//!
//! The library only emits through `tracing`; the binary installs a
//! subscriber exactly once at startup.

use tracing_subscriber::{fmt, EnvFilter};

use super::{ObservabilityError, ObservabilityResult};

/// Build the filter from `RUST_LOG` when set, otherwise from `default_filter`.
pub fn build_filter(default_filter: &str) -> ObservabilityResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_filter).map_err(|e| {
            ObservabilityError::InvalidFilter {
                filter: default_filter.to_string(),
                reason: e.to_string(),
            }
        }),
    }
}

/// Install the global subscriber.
///
/// Logs go to stderr so that stdout stays reserved for command output.
/// `json` switches to one JSON object per line.
pub fn init_logging(default_filter: &str, json: bool) -> ObservabilityResult<()> {
    let filter = build_filter(default_filter)?;

    let result = if json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };

    result.map_err(|e| ObservabilityError::AlreadyInitialized(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_directives() {
        assert!(build_filter("neurochain=debug,warn").is_ok());
    }

    #[test]
    fn test_second_init_reports_error() {
        // Whichever call wins, a later one must fail instead of panicking.
        let _ = init_logging("info", false);
        let second = init_logging("info", false);
        assert!(matches!(
            second,
            Err(ObservabilityError::AlreadyInitialized(_))
        ));
    }
}
