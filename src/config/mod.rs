/// Configuration system for stockdash.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::DashboardConfig::default()`]
/// 2. **User global config**: `~/.stockdash/config.toml`
/// 3. **Project local config**: `.stockdash.toml` in the current working directory
/// 4. **Environment variables**: `STOCKDASH_*` overrides (highest precedence)
///
/// Later layers override earlier ones key by key: a file that only sets
/// `backend.base_url` leaves every other value from the previous layer.
///
/// # Usage
///
/// ```rust,ignore
/// use stockdash::config;
///
/// let cfg = config::load();
/// let client = stockdash::api::ApiClient::from_config(&cfg.backend);
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::DashboardConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges defaults → global TOML → project TOML → env vars.
pub fn load() -> DashboardConfig {
    let mut config = load_from_paths(global_config_path(), project_config_path());
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Merge the file layers only, in order. Missing or malformed files are
/// skipped with a warning.
pub fn load_from_paths(global: Option<PathBuf>, project: Option<PathBuf>) -> DashboardConfig {
    let mut merged = match toml::Value::try_from(DashboardConfig::default()) {
        Ok(value) => value,
        Err(_) => return DashboardConfig::default(),
    };

    for path in [global, project].into_iter().flatten() {
        if let Some(layer) = load_toml_value(&path) {
            merge_values(&mut merged, layer);
        }
    }

    merged.try_into().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "merged config is invalid, using defaults");
        DashboardConfig::default()
    })
}

/// Read a TOML file as an untyped value tree.
fn load_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            None
        }
    }
}

/// Recursively overlay `overlay` onto `base`. Tables merge key by key;
/// any other value replaces the base value.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.stockdash/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".stockdash").join("config.toml"))
}

/// Path to the project local config: `.stockdash.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".stockdash.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment overrides (highest precedence layer).
///
/// Supported variables:
/// - `STOCKDASH_BACKEND_URL`: prediction service base URL
/// - `STOCKDASH_ADDR`: dashboard listen address
/// - `STOCKDASH_OPEN_BROWSER`: open the browser on start (`1`/`true`/`yes`/`on`)
/// - `STOCKDASH_LOG`: default log filter
///
/// `lookup` abstracts `std::env::var` so tests need not mutate the process
/// environment.
pub fn apply_env_overrides<F>(config: &mut DashboardConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("STOCKDASH_BACKEND_URL")
        && !val.is_empty()
    {
        config.backend.base_url = val;
    }
    if let Some(val) = lookup("STOCKDASH_ADDR")
        && !val.is_empty()
    {
        config.server.addr = val;
    }
    if let Some(val) = lookup("STOCKDASH_OPEN_BROWSER") {
        config.server.open_browser = is_truthy(&val);
    }
    if let Some(val) = lookup("STOCKDASH_LOG")
        && !val.is_empty()
    {
        config.logging.level = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.stockdash/config.toml`.
///
/// Returns an error if the file already exists and `force` is false.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    init_config_at(&path, force)?;
    Ok(path)
}

fn init_config_at(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }

    fs::write(path, DashboardConfig::default_toml()).context("failed to write config file")
}

/// Set a single dotted key (e.g. `backend.base_url`) in the global config
/// file, creating the file from defaults if needed.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_at(&path, key, value)
}

fn set_config_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    let source = if path.exists() {
        fs::read_to_string(path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&DashboardConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&source).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Refuse writes that would make the file undecodable.
    let _: DashboardConfig = root
        .clone()
        .try_into()
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The new value takes the type of the value it replaces.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(*leaf) {
        None => anyhow::bail!("config key not found: '{key}'"),
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
    };

    table.insert((*leaf).to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        for val in ["1", "true", "TRUE", "yes", "On"] {
            assert!(is_truthy(val), "{val} should be truthy");
        }
        for val in ["0", "false", "no", "off", ""] {
            assert!(!is_truthy(val), "{val} should be falsy");
        }
    }

    #[test]
    fn no_files_yield_defaults() {
        let config = load_from_paths(None, None);
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn project_layer_overrides_global_key_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        fs::write(
            &global,
            "[backend]\nbase_url = \"http://global:5000\"\n[server]\naddr = \"0.0.0.0:8000\"\n",
        )
        .unwrap();
        fs::write(&project, "[backend]\nbase_url = \"http://project:5000\"\n").unwrap();

        let config = load_from_paths(Some(global), Some(project));
        assert_eq!(config.backend.base_url, "http://project:5000");
        assert_eq!(config.server.addr, "0.0.0.0:8000");
        assert!(config.server.open_browser);
    }

    #[test]
    fn malformed_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        fs::write(&global, "[backend\nbase_url = ").unwrap();
        let config = load_from_paths(Some(global), None);
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn env_overrides_win() {
        let mut config = DashboardConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            "STOCKDASH_BACKEND_URL" => Some("http://ml:9000".to_string()),
            "STOCKDASH_OPEN_BROWSER" => Some("0".to_string()),
            "STOCKDASH_ADDR" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.backend.base_url, "http://ml:9000");
        assert!(!config.server.open_browser);
        assert_eq!(config.server.addr, "127.0.0.1:9747");
    }

    #[test]
    fn set_toml_value_keeps_types() {
        let mut root: toml::Value = toml::from_str(
            r#"
[server]
open_browser = true
[display]
outperformance_threshold_pct = 10
benchmark_name = "S&P500"
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "server.open_browser", "off").unwrap();
        set_toml_value(&mut root, "display.outperformance_threshold_pct", "15").unwrap();
        set_toml_value(&mut root, "display.benchmark_name", "NIFTY 50").unwrap();

        assert_eq!(root["server"]["open_browser"].as_bool(), Some(false));
        assert_eq!(root["display"]["outperformance_threshold_pct"].as_integer(), Some(15));
        assert_eq!(root["display"]["benchmark_name"].as_str(), Some("NIFTY 50"));
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let mut root = toml::Value::try_from(DashboardConfig::default()).unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "x").is_err());
        assert!(set_toml_value(&mut root, "backend.nope", "x").is_err());
        assert!(set_toml_value(&mut root, "display.outperformance_threshold_pct", "ten").is_err());
    }

    #[test]
    fn set_value_creates_file_from_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        set_config_value_at(&path, "backend.base_url", "http://ml:7000").unwrap();

        let config = load_from_paths(Some(path), None);
        assert_eq!(config.backend.base_url, "http://ml:7000");
        assert_eq!(config.server, schema::ServerConfig::default());
    }

    #[test]
    fn set_value_rejects_negative_unsigned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let result = set_config_value_at(&path, "display.outperformance_threshold_pct", "-5");
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        init_config_at(&path, false).unwrap();
        assert!(init_config_at(&path, false).is_err());
        assert!(init_config_at(&path, true).is_ok());
    }
}
