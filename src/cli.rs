//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::alphavantage_adapter::AlphaVantageAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::FrontierError;
use crate::domain::returns::compute_returns;
use crate::domain::selection::{select, PortfolioCandidate};
use crate::domain::simulation::{
    simulate, SimulationConfig, DEFAULT_TRIALS, TRADING_DAYS_PER_YEAR,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;

const DEFAULT_START_DATE: &str = "2020-01-01";

#[derive(Parser, Debug)]
#[command(name = "frontier", about = "Monte Carlo efficient-frontier estimator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the optimization pipeline and emit the two candidate portfolios
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated ticker symbols (overrides config)
        #[arg(long)]
        tickers: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        trials: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Write the JSON result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Start the web server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Optimize {
            config,
            tickers,
            start,
            end,
            trials,
            seed,
            output,
        } => run_optimize(
            &config,
            tickers.as_deref(),
            start.as_deref(),
            end.as_deref(),
            trials,
            seed,
            output.as_ref(),
        ),
        Command::Serve { config } => run_serve(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = FrontierError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Select the provider named under `[data] source`.
pub fn build_provider(
    config: &dyn ConfigPort,
) -> Result<Arc<dyn PricePort + Send + Sync>, FrontierError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string());

    match source.to_lowercase().as_str() {
        "csv" => {
            let path = config.get_string("data", "csv_path").ok_or_else(|| {
                FrontierError::ConfigMissing {
                    section: "data".into(),
                    key: "csv_path".into(),
                }
            })?;
            Ok(Arc::new(CsvAdapter::new(PathBuf::from(path))))
        }
        "alphavantage" => {
            let api_key = config.get_string("data", "api_key").ok_or_else(|| {
                FrontierError::ConfigMissing {
                    section: "data".into(),
                    key: "api_key".into(),
                }
            })?;
            Ok(Arc::new(AlphaVantageAdapter::new(api_key)))
        }
        other => Err(FrontierError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unsupported provider {other}"),
        }),
    }
}

pub fn resolve_tickers(
    ticker_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Vec<String> {
    let raw = match ticker_override {
        Some(t) => t.to_string(),
        None => config.get_string("data", "tickers").unwrap_or_default(),
    };
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Read an integer setting that must be strictly positive. INI values are
/// signed, so a negative entry has to be rejected here rather than cast.
fn positive_config_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, FrontierError> {
    let value = config.get_int(section, key, default);
    if value <= 0 {
        return Err(FrontierError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason: format!("must be positive, got {value}"),
        });
    }
    Ok(value)
}

fn parse_date_arg(raw: &str, name: &str) -> Result<NaiveDate, ExitCode> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        let err = FrontierError::ConfigInvalid {
            section: "data".into(),
            key: name.into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_optimize(
    config_path: &PathBuf,
    ticker_override: Option<&str>,
    start_override: Option<&str>,
    end_override: Option<&str>,
    trials_override: Option<usize>,
    seed_override: Option<u64>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let tickers = resolve_tickers(ticker_override, &config);
    if tickers.len() < 2 {
        let err = FrontierError::degenerate(format!(
            "need at least 2 tickers, got {}",
            tickers.len()
        ));
        eprintln!("error: {err}");
        return ExitCode::from(&err);
    }

    let start_raw = start_override
        .map(str::to_string)
        .or_else(|| config.get_string("data", "start_date"))
        .unwrap_or_else(|| DEFAULT_START_DATE.to_string());
    let start = match parse_date_arg(&start_raw, "start_date") {
        Ok(d) => d,
        Err(code) => return code,
    };
    let end = match end_override
        .map(str::to_string)
        .or_else(|| config.get_string("data", "end_date"))
    {
        Some(raw) => match parse_date_arg(&raw, "end_date") {
            Ok(d) => d,
            Err(code) => return code,
        },
        None => Local::now().date_naive(),
    };

    let trial_count = match trials_override {
        Some(t) => t,
        None => {
            match positive_config_int(
                &config,
                "simulation",
                "trials",
                DEFAULT_TRIALS as i64,
            ) {
                Ok(v) => v as usize,
                Err(e) => {
                    eprintln!("error: {e}");
                    return ExitCode::from(&e);
                }
            }
        }
    };
    let sim_config = SimulationConfig {
        trial_count,
        annualization_factor: config.get_double(
            "simulation",
            "annualization",
            TRADING_DAYS_PER_YEAR,
        ),
        seed: seed_override.unwrap_or_else(rand::random),
    };

    let provider = match build_provider(&config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    eprintln!(
        "Fetching prices: {} symbols, {} to {}",
        tickers.len(),
        start,
        end
    );
    let result = run_pipeline(provider.as_ref(), &tickers, start, end, &sim_config);
    let (max_sharpe, min_volatility) = match result {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    print_summary(&max_sharpe);
    print_summary(&min_volatility);

    let json = serde_json::json!({ "portfolios": [max_sharpe, min_volatility] });
    let rendered = match serde_json::to_string_pretty(&json) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: failed to serialize result: {e}");
            return ExitCode::from(1);
        }
    };

    match output_path {
        Some(path) => match fs::write(path, &rendered) {
            Ok(()) => {
                eprintln!("\nResult written to: {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: failed to write {}: {e}", path.display());
                ExitCode::from(1)
            }
        },
        None => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
    }
}

/// Fetch, compute statistics, simulate, select. Shared by CLI and tests.
pub fn run_pipeline(
    provider: &(dyn PricePort + Send + Sync),
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
    sim_config: &SimulationConfig,
) -> Result<(PortfolioCandidate, PortfolioCandidate), FrontierError> {
    let prices = provider.fetch_prices(tickers, start, end)?;
    eprintln!(
        "Computing returns: {} periods x {} assets",
        prices.n_periods(),
        prices.n_assets()
    );
    let (_, stats) = compute_returns(&prices)?;

    eprintln!(
        "Running simulation: {} trials, seed {}",
        sim_config.trial_count, sim_config.seed
    );
    let trials = simulate(&stats, sim_config)?;
    select(&trials, &prices.assets)
}

fn print_summary(candidate: &PortfolioCandidate) {
    eprintln!("\n=== {} ===", candidate.name);
    eprintln!("Expected Return:  {:.2}%", candidate.expected_return * 100.0);
    eprintln!("Risk:             {:.2}%", candidate.risk * 100.0);
    for (asset, weight) in &candidate.weights {
        eprintln!("  {}:  {:.1}%", asset, weight * 100.0);
    }
}

fn run_serve(config_path: &PathBuf) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{build_router, AppState};
        use std::net::SocketAddr;
        use std::time::Duration;

        eprintln!("Loading config from {}", config_path.display());
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(code) => return code,
        };

        let provider = match build_provider(&config) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(&e);
            }
        };

        let addr: SocketAddr = match config
            .get_string("web", "listen")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse()
        {
            Ok(a) => a,
            Err(e) => {
                let err = FrontierError::ConfigInvalid {
                    section: "web".into(),
                    key: "listen".into(),
                    reason: e.to_string(),
                };
                eprintln!("error: {err}");
                return ExitCode::from(&err);
            }
        };

        let trials = match positive_config_int(
            &config,
            "simulation",
            "trials",
            DEFAULT_TRIALS as i64,
        ) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(&e);
            }
        };
        let timeout_secs = match positive_config_int(&config, "web", "timeout_secs", 30)
        {
            Ok(v) => v,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(&e);
            }
        };

        let mut state = AppState::new(provider);
        state.default_trials = trials as usize;
        state.annualization_factor =
            config.get_double("simulation", "annualization", TRADING_DAYS_PER_YEAR);
        state.timeout = Duration::from_secs(timeout_secs as u64);

        eprintln!("Starting web server on {addr}");
        let router = build_router(state);

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                eprintln!("error: failed to start runtime: {e}");
                return ExitCode::from(1);
            }
        };
        let served = runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, router).await
        });

        match served {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: server failed: {e}");
                ExitCode::from(1)
            }
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}
