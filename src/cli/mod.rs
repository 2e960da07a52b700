//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `stockdash info`: dataset summary
//! - `stockdash backtest`: run the model backtest
//! - `stockdash predict`: stocks predicted to outperform the benchmark
//! - `stockdash features`: feature importance ranking
//! - `stockdash health`: check config files and service reachability
//! - `stockdash config show|init|set|reset`: configuration management
//!
//! Every data command takes `--format table|json`. JSON output is the
//! service's payload re-serialized, so it can be piped into other tools.

use anyhow::{Result, anyhow};
use colored::Colorize;
use serde::Serialize;

use crate::api::{
    ApiClient, BacktestResult, DashboardApi, DatasetInfo, FeatureImportanceReport, FetchError,
    PredictionSet, Reply,
};
use crate::config::{self, DashboardConfig};
use crate::render::Confidence;
use crate::render::format::{group_thousands, pct1, ratio_pct, signed_pct1};
use crate::render::html::market_description;

/// Output format for data commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Collapse a fetch outcome into a plain `Result`.
///
/// In-band service errors carry the service's message as is; rejected
/// fetches are prefixed with what was being attempted.
fn settle<T>(doing: &str, outcome: Result<Reply<T>, FetchError>) -> Result<T> {
    match outcome {
        Ok(Reply::Data(data)) => Ok(data),
        Ok(Reply::Failed(message)) => Err(anyhow!("{message}")),
        Err(e) => Err(anyhow!("Error {doing}: {e}")),
    }
}

fn print_json<T: Serialize>(data: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

fn print_rows(rows: &[String]) {
    for (i, line) in rows.iter().enumerate() {
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

// ---------------------------------------------------------------------------
// stockdash info
// ---------------------------------------------------------------------------

/// Show the dataset summary.
pub fn run_info<A: DashboardApi>(api: &A, format: OutputFormat) -> Result<()> {
    let info = settle("loading dataset info", api.dataset_info())?;
    match format {
        OutputFormat::Json => print_json(&info),
        OutputFormat::Table => {
            println!("{}", "Dataset".bold().cyan());
            println!("{}", "=".repeat(50));
            for (label, value) in info_rows(&info) {
                println!("  {} {}", format!("{label:<18}").bold(), value);
            }
            Ok(())
        }
    }
}

fn info_rows(info: &DatasetInfo) -> Vec<(&'static str, String)> {
    vec![
        ("Training samples:", group_thousands(info.training_samples)),
        ("Forward samples:", group_thousands(info.forward_samples)),
        ("Features:", info.features_count.to_string()),
        (
            "Date range:",
            format!("{} to {}", info.date_range.start, info.date_range.end),
        ),
        ("Market:", market_description(info)),
    ]
}

// ---------------------------------------------------------------------------
// stockdash backtest
// ---------------------------------------------------------------------------

/// Run the backtest and show its metrics.
pub fn run_backtest<A: DashboardApi>(api: &A, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Table {
        println!("{}", "Running backtest...".dimmed());
    }
    let result = settle("running backtest", api.backtest())?;
    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Table => {
            println!("{}", "Backtest Results".bold().cyan());
            println!("{}", "=".repeat(50));
            for (label, value) in backtest_rows(&result) {
                println!("  {} {}", format!("{label:<20}").bold(), value);
            }
            let edge = signed_pct1(result.outperformance);
            let edge = if result.outperformance >= 0.0 {
                edge.green()
            } else {
                edge.red()
            };
            println!("  {} {}", format!("{:<20}", "Outperformance:").bold(), edge);
            Ok(())
        }
    }
}

fn backtest_rows(r: &BacktestResult) -> Vec<(&'static str, String)> {
    vec![
        ("Accuracy:", ratio_pct(r.accuracy, 1)),
        ("Precision:", ratio_pct(r.precision, 1)),
        ("Total trades:", r.total_trades.to_string()),
        ("Avg stock return:", pct1(r.avg_stock_return)),
        ("Avg market return:", pct1(r.avg_market_return)),
    ]
}

// ---------------------------------------------------------------------------
// stockdash predict
// ---------------------------------------------------------------------------

/// Generate predictions and list the tickers expected to outperform.
pub fn run_predict<A: DashboardApi>(
    api: &A,
    display: &config::schema::DisplayConfig,
    format: OutputFormat,
) -> Result<()> {
    if format == OutputFormat::Table {
        println!("{}", "Generating predictions...".dimmed());
    }
    let set = settle("generating predictions", api.predict())?;
    if format == OutputFormat::Json {
        return print_json(&set);
    }

    if set.total_stocks == 0 {
        println!(
            "{}",
            format!(
                "No stocks predicted to outperform the market by more than {}% at this time.",
                display.outperformance_threshold_pct
            )
            .yellow()
        );
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "Found {} stocks predicted to outperform {}",
            set.total_stocks, display.benchmark_name
        )
        .bold()
        .cyan()
    );
    println!("{}", "=".repeat(50));
    println!(
        "  {:<6} {:<10} {:<12} {:>11}",
        "Rank", "Ticker", "Confidence", "Probability"
    );
    println!("  {}", "-".repeat(42));
    print_rows(&prediction_rows(&set));
    Ok(())
}

fn prediction_rows(set: &PredictionSet) -> Vec<String> {
    set.detailed_predictions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "  {:<6} {:<10} {:<12} {:>11}",
                format!("#{}", i + 1),
                p.ticker,
                Confidence::from_probability(p.probability).label(),
                ratio_pct(p.probability, 1),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// stockdash features
// ---------------------------------------------------------------------------

/// Show the feature importance ranking, in service order.
pub fn run_features<A: DashboardApi>(api: &A, format: OutputFormat) -> Result<()> {
    let report = settle("loading feature importance", api.feature_importance())?;
    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Table => {
            println!(
                "{}",
                format!("Top {} Most Important Features", report.features.len())
                    .bold()
                    .cyan()
            );
            println!("{}", "=".repeat(50));
            println!("  {:<6} {:<30} {:>10}", "Rank", "Feature", "Importance");
            println!("  {}", "-".repeat(48));
            print_rows(&feature_rows(&report));
            Ok(())
        }
    }
}

fn feature_rows(report: &FeatureImportanceReport) -> Vec<String> {
    report
        .features
        .iter()
        .enumerate()
        .map(|(i, f)| {
            format!(
                "  {:<6} {:<30} {:>10}",
                format!("#{}", i + 1),
                f.feature,
                ratio_pct(f.importance, 2)
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// stockdash health
// ---------------------------------------------------------------------------

/// Check config files and whether the prediction service answers.
pub fn run_health(cfg: &DashboardConfig) -> Result<()> {
    println!("{}", "stockdash Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.stockdash/config.toml found"
        } else {
            "not found (run `stockdash config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".stockdash.toml found"
        } else {
            "none (optional)"
        },
    );

    let client = ApiClient::from_config(&cfg.backend);
    let reachable = client.is_reachable();
    print_health_item(
        "Prediction service",
        reachable,
        &if reachable {
            format!("{} responding", client.base_url())
        } else {
            format!("{} not reachable", client.base_url())
        },
    );
    print_health_item("Dashboard address", true, &cfg.server.addr);

    if !reachable {
        println!();
        println!(
            "  {} Start the service or set backend.base_url / STOCKDASH_BACKEND_URL",
            "Hint:".dimmed()
        );
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// stockdash config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective stockdash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.stockdash/config.toml", global_exists);
    print_source(".stockdash.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "STOCKDASH_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(label: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), label.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{label} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.stockdash/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{DateRange, FeatureScore, Prediction};

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_str_opt(Some("csv")),
            OutputFormat::Table
        );
    }

    #[test]
    fn settle_passes_data_through() {
        let value = settle("running backtest", Ok(Reply::Data(7))).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn settle_reports_service_message() {
        let err = settle::<u32>("running backtest", Ok(Reply::Failed("model not trained".into())))
            .unwrap_err();
        assert_eq!(err.to_string(), "model not trained");
    }

    #[test]
    fn settle_prefixes_fetch_errors() {
        let err = settle::<u32>(
            "generating predictions",
            Err(FetchError::Network { status: 500 }),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error generating predictions: Network response was not ok"
        );
    }

    #[test]
    fn info_rows_group_thousands() {
        let info = DatasetInfo {
            training_samples: 12345,
            forward_samples: 999,
            features_count: 42,
            date_range: DateRange {
                start: "2015-01-01".into(),
                end: "2023-12-31".into(),
            },
            market: Some("US".into()),
            index_name: None,
            currency: None,
        };
        let rows = info_rows(&info);
        assert_eq!(rows[0].1, "12,345");
        assert_eq!(rows[1].1, "999");
        assert_eq!(rows[3].1, "2015-01-01 to 2023-12-31");
        assert_eq!(rows[4].1, "US Market | Unknown | Currency: Unknown");
    }

    #[test]
    fn prediction_rows_rank_and_confidence() {
        let set = PredictionSet {
            total_stocks: 2,
            predicted_stocks: vec!["NVDA".into(), "MSFT".into()],
            detailed_predictions: vec![
                Prediction {
                    ticker: "NVDA".into(),
                    probability: 0.7,
                },
                Prediction {
                    ticker: "MSFT".into(),
                    probability: 0.65,
                },
            ],
        };
        let rows = prediction_rows(&set);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("#1"));
        assert!(rows[0].contains("NVDA"));
        assert!(rows[0].contains("High"));
        assert!(rows[0].contains("70.0%"));
        assert!(rows[1].contains("Medium"));
    }

    #[test]
    fn feature_rows_use_two_decimals() {
        let report = FeatureImportanceReport {
            features: vec![FeatureScore {
                feature: "pe_ratio".into(),
                importance: 0.1234,
            }],
        };
        let rows = feature_rows(&report);
        assert!(rows[0].contains("pe_ratio"));
        assert!(rows[0].contains("12.34%"));
    }
}
