//! Logging configuration using tracing.
//!
//! Diagnostics go to stderr; stdout carries the lock status line that the
//! parent program reads.

use crate::error::{LockSpoolError, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Filtering follows `RUST_LOG`, defaulting to `warn` so that lock failures
/// and quarantined spool items are always reported.
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .map_err(|e| LockSpoolError::UserError(format!("failed to initialize logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_reports_error_instead_of_panicking() {
        let _ = init();
        assert!(init().is_err());
    }
}
