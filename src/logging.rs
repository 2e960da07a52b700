//! Logging setup.
//!
//! Installs a global `tracing` subscriber writing to stderr, so command
//! output on stdout stays clean for `--format json`.

use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor the configured level parses.
const FALLBACK_FILTER: &str = "info";

/// Build the filter: `RUST_LOG` first, then the configured level.
pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(level: &str) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_does_not_panic() {
        init("warn");
        init("debug");
    }

    #[test]
    fn bad_level_falls_back() {
        // Builds a usable filter even for garbage input.
        let f = filter("not a [valid] directive ===");
        assert!(!f.to_string().is_empty());
    }
}
