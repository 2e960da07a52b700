/// Configuration schema and defaults for stockdash.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[backend]`, `[server]`, `[display]` and `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level stockdash configuration.
///
/// Maps directly to the `~/.stockdash/config.toml` and `.stockdash.toml`
/// file schemas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub backend: BackendConfig,
    pub server: ServerConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Where the prediction service lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL; endpoint paths (`/api/...`) are appended to it.
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Embedded dashboard server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address for `stockdash serve`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

/// Wording used in rendered panels.
///
/// These only change text; the service decides which stocks qualify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Outperformance threshold the service labels against, in percent.
    pub outperformance_threshold_pct: u32,
    /// Benchmark index named in the prediction banner.
    pub benchmark_name: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            outperformance_threshold_pct: 10,
            benchmark_name: "S&P500".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive: `"error"`, `"warn"`, `"info"`, `"debug"`,
    /// or any `tracing_subscriber` filter string. `RUST_LOG` wins over it.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl DashboardConfig {
    /// Annotated default config file content, written by `stockdash config init`.
    pub fn default_toml() -> String {
        r#"# stockdash configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (STOCKDASH_*)
#   2. Project config (.stockdash.toml in current directory)
#   3. User global config (~/.stockdash/config.toml)
#   4. Built-in defaults

[backend]
base_url = "http://127.0.0.1:5000"   # Prediction service (STOCKDASH_BACKEND_URL)

[server]
addr = "127.0.0.1:9747"              # Dashboard listen address (STOCKDASH_ADDR)
open_browser = true                  # Open the dashboard on start (STOCKDASH_OPEN_BROWSER)

[display]
outperformance_threshold_pct = 10    # Threshold named in prediction messages
benchmark_name = "S&P500"            # Benchmark named in the prediction banner

[logging]
level = "info"                       # error | warn | info | debug (STOCKDASH_LOG, RUST_LOG)
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_matches_defaults() {
        let parsed: DashboardConfig = toml::from_str(&DashboardConfig::default_toml()).unwrap();
        assert_eq!(parsed, DashboardConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let parsed: DashboardConfig = toml::from_str(
            r#"
[backend]
base_url = "http://ml-box:8000"
"#,
        )
        .unwrap();
        assert_eq!(parsed.backend.base_url, "http://ml-box:8000");
        assert_eq!(parsed.server, ServerConfig::default());
        assert_eq!(parsed.display.outperformance_threshold_pct, 10);
    }

    #[test]
    fn round_trips_through_toml() {
        let text = toml::to_string_pretty(&DashboardConfig::default()).unwrap();
        let back: DashboardConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, DashboardConfig::default());
    }
}
