// ABOUTME: Tracing subscriber setup for the gateway binary.
// ABOUTME: Installs a single fmt layer on stderr filtered by the configured directives.

use std::io;

use anyhow::{Context, Result};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `filter` uses `RUST_LOG` directive syntax.
///
/// Logs go to stderr so `parse` output on stdout stays machine-readable.
pub fn configure_logging(filter: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_new(filter).with_context(|| format!("invalid log filter {:?}", filter))?;

    let stderr_log = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_filter(env_filter);

    tracing_subscriber::Registry::default()
        .with(stderr_log)
        .try_init()
        .context("failed to install tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_filter() {
        assert!(configure_logging("info,web_request=notalevel").is_err());
    }
}
