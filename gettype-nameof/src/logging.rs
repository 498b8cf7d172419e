//! Diagnostic logging setup.
//!
//! Logs go to stderr so that stdout stays clean for reports and JSON.
//! The filter is read from `GETTYPE_NAMEOF_LOG`, then `RUST_LOG`, and
//! falls back to `warn` (or `debug` with `--verbose`).

use crate::constants::LOG_ENV_VAR;
use tracing_subscriber::EnvFilter;

fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "gettype_nameof=debug"
    } else {
        "warn"
    }
}

/// Installs the global subscriber.
///
/// Calling it more than once is harmless: later calls keep the first
/// subscriber, which matters when the entry point runs repeatedly in tests.
pub fn init_tracing(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "warn");
        assert_eq!(default_directive(true), "gettype_nameof=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(false);
        init_tracing(true);
    }
}
