use anyhow::Result;
use clap::{Parser, Subcommand};

use stockdash::api::ApiClient;
use stockdash::{cli, config, logging, web};

#[derive(Debug, Parser)]
#[command(name = "stockdash")]
#[command(about = "Dashboard for a stock outperformance prediction service")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the web dashboard
    Serve {
        /// Listen address (overrides server.addr)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open a browser on start
        #[arg(long)]
        no_browser: bool,
    },
    /// Show dataset summary
    Info {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Run the model backtest
    Backtest {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List stocks predicted to outperform the benchmark
    Predict {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show feature importance ranking
    Features {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Check config files and prediction service reachability
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective (merged) configuration
    Show,
    /// Write a default config file to ~/.stockdash/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value, e.g. `stockdash config set backend.base_url http://10.0.0.5:5000`
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let mut cfg = config::load();
    logging::init(&cfg.logging.level);

    let client = ApiClient::from_config(&cfg.backend);
    let fmt = |format: &str| cli::OutputFormat::from_str_opt(Some(format));

    match app.command {
        Commands::Serve { addr, no_browser } => {
            if let Some(addr) = addr {
                cfg.server.addr = addr;
            }
            if no_browser {
                cfg.server.open_browser = false;
            }
            web::serve(&cfg)
        }
        Commands::Info { format } => cli::run_info(&client, fmt(&format)),
        Commands::Backtest { format } => cli::run_backtest(&client, fmt(&format)),
        Commands::Predict { format } => cli::run_predict(&client, &cfg.display, fmt(&format)),
        Commands::Features { format } => cli::run_features(&client, fmt(&format)),
        Commands::Health => cli::run_health(&cfg),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
