//! CLI definition and dispatch.

use clap::{ArgAction, Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{read_parsed, validate_strategy_config};
use crate::domain::error::MacdTraderError;
use crate::domain::indicator::MaMethod;
use crate::domain::pipeline::{PipelineResult, run_pipeline};
use crate::domain::profit::Verdict;
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "macdtrader", about = "MACD histogram crossover backtester")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the strategy over a price file
    Run {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: RunOverrides,
        /// Write the trade ledger to this CSV file
        #[arg(short, long)]
        trades: Option<PathBuf>,
        /// Write the price series with MACD values and trade annotations to this CSV file
        #[arg(long)]
        annotated: Option<PathBuf>,
        /// Replace existing export files instead of versioning them
        #[arg(long)]
        overwrite: bool,
    },
    /// Validate a strategy configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunOverrides {
    /// SMA or EMA
    #[arg(short, long)]
    pub method: Option<String>,
    #[arg(long)]
    pub fee: Option<f64>,
    #[arg(long = "short")]
    pub short_period: Option<usize>,
    #[arg(long = "long")]
    pub long_period: Option<usize>,
    #[arg(long = "signal")]
    pub signal_period: Option<usize>,
}

pub fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            input,
            config,
            overrides,
            trades,
            annotated,
            overwrite,
        } => run_strategy_command(
            &input,
            config.as_ref(),
            &overrides,
            trades.as_deref(),
            annotated.as_deref(),
            overwrite,
        ),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_strategy_command(
    input: &Path,
    config_path: Option<&PathBuf>,
    overrides: &RunOverrides,
    trades_path: Option<&Path>,
    annotated_path: Option<&Path>,
    overwrite: bool,
) -> ExitCode {
    // Stage 1: Load and validate config
    let adapter = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            let adapter = match load_config(path) {
                Ok(a) => a,
                Err(code) => return code,
            };
            if let Err(e) = validate_strategy_config(&adapter) {
                eprintln!("error: {e}");
                return (&e).into();
            }
            Some(adapter)
        }
        None => None,
    };
    let config_port = adapter.as_ref().map(|a| a as &dyn ConfigPort);

    // Stage 2: Resolve strategy parameters
    let base = match config_port {
        Some(port) => build_strategy_config(port),
        None => Ok(StrategyConfig::default()),
    };
    let strategy = match base.and_then(|c| apply_overrides(c, overrides)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Load prices
    let data_port = build_data_adapter(input, config_port);
    eprintln!("Loading prices from {}", input.display());

    // Stage 4: Run the pipeline and print the summary
    let result = match run_strategy(&data_port, &strategy) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("{}", format_summary(&strategy, &result));

    // Stage 5: Export
    let trades = trades_path
        .map(Path::to_path_buf)
        .or_else(|| export_setting(config_port, "trades_path"));
    let annotated = annotated_path
        .map(Path::to_path_buf)
        .or_else(|| export_setting(config_port, "annotated_path"));
    let overwrite =
        overwrite || config_port.is_some_and(|c| c.get_bool("export", "overwrite", false));

    let report = CsvReportAdapter::new(overwrite);
    match export_results(&report, &result, trades.as_deref(), annotated.as_deref()) {
        Ok(written) => {
            for path in written {
                eprintln!("Exported: {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn build_strategy_config(adapter: &dyn ConfigPort) -> Result<StrategyConfig, MacdTraderError> {
    let defaults = StrategyConfig::default();
    let method = match adapter.get_non_empty("strategy", "method") {
        Some(m) => m.parse::<MaMethod>()?,
        None => defaults.method,
    };

    Ok(StrategyConfig {
        method,
        short_period: read_period(adapter, "short_period", defaults.short_period)?,
        long_period: read_period(adapter, "long_period", defaults.long_period)?,
        signal_period: read_period(adapter, "signal_period", defaults.signal_period)?,
        fee: read_parsed::<f64>(adapter, "strategy", "fee")?.unwrap_or(defaults.fee),
    })
}

fn read_period(
    adapter: &dyn ConfigPort,
    key: &str,
    default: usize,
) -> Result<usize, MacdTraderError> {
    let Some(value) = read_parsed::<i64>(adapter, "strategy", key)? else {
        return Ok(default);
    };
    usize::try_from(value).map_err(|_| MacdTraderError::ConfigInvalid {
        section: "strategy".into(),
        key: key.into(),
        reason: format!("{} must be a positive integer", key),
    })
}

pub fn apply_overrides(
    mut config: StrategyConfig,
    overrides: &RunOverrides,
) -> Result<StrategyConfig, MacdTraderError> {
    if let Some(method) = &overrides.method {
        config.method = method.parse()?;
    }
    if let Some(fee) = overrides.fee {
        config.fee = fee;
    }
    if let Some(p) = overrides.short_period {
        config.short_period = p;
    }
    if let Some(p) = overrides.long_period {
        config.long_period = p;
    }
    if let Some(p) = overrides.signal_period {
        config.signal_period = p;
    }
    config.validate()?;
    Ok(config)
}

pub fn build_data_adapter(input: &Path, config: Option<&dyn ConfigPort>) -> CsvAdapter {
    let adapter = CsvAdapter::new(input.to_path_buf());
    match config {
        Some(c) => adapter
            .with_columns(
                c.get_non_empty("data", "date_column"),
                c.get_non_empty("data", "price_column"),
            )
            .with_fill_missing_dates(c.get_bool("data", "fill_missing_dates", true)),
        None => adapter,
    }
}

pub fn run_strategy(
    data_port: &dyn DataPort,
    strategy: &StrategyConfig,
) -> Result<PipelineResult, MacdTraderError> {
    let prices = data_port.fetch_prices()?;
    eprintln!(
        "Running {} strategy on {} days ({} to {})",
        strategy.method,
        prices.len(),
        prices.first().date,
        prices.last().date
    );
    run_pipeline(&prices, strategy)
}

pub fn export_results(
    report: &dyn ReportPort,
    result: &PipelineResult,
    trades_path: Option<&Path>,
    annotated_path: Option<&Path>,
) -> Result<Vec<PathBuf>, MacdTraderError> {
    let mut written = Vec::new();
    if let Some(path) = trades_path {
        written.push(report.write_ledger(&result.ledger, path)?);
    }
    if let Some(path) = annotated_path {
        written.push(report.write_annotated(result, path)?);
    }
    Ok(written)
}

fn export_setting(config: Option<&dyn ConfigPort>, key: &str) -> Option<PathBuf> {
    config
        .and_then(|c| c.get_non_empty("export", key))
        .map(PathBuf::from)
}

/// Trade table followed by the profit comparison.
pub fn format_summary(strategy: &StrategyConfig, result: &PipelineResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\n=== Trades ({}) ===", strategy.method);
    if result.ledger.is_empty() {
        let _ = writeln!(out, "  no trades executed");
    }
    for entry in &result.ledger {
        let _ = writeln!(
            out,
            "  {}  {:<4}  {:>10.2}  entry {:>10.2}  #{}{}",
            entry.date,
            entry.action,
            entry.price,
            entry.entry_price,
            entry.trade_id,
            if entry.forced { "  (closed at end of data)" } else { "" }
        );
    }

    let profit = &result.profit;
    let _ = writeln!(out, "\n=== Profit Summary ===");
    let _ = writeln!(out, "Buy-Sell strategy profit: {:.2}", profit.strategy_profit);
    let _ = writeln!(out, "Buy-Hold strategy profit: {:.2}", profit.buy_hold_profit);
    let verdict = match profit.verdict() {
        Verdict::StrategyOutperformed => "Buy-Sell strategy outperformed Buy-Hold.",
        Verdict::BuyHoldOutperformed => "Buy-Hold would have been better.",
        Verdict::Tie => "Both strategies performed equally.",
    };
    let _ = write!(out, "{verdict}");
    out
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let strategy = match validate_strategy_config(&adapter)
        .and_then(|()| build_strategy_config(&adapter))
    {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nStrategy:");
    eprintln!("  method:        {}", strategy.method);
    eprintln!("  short_period:  {}", strategy.short_period);
    eprintln!("  long_period:   {}", strategy.long_period);
    eprintln!("  signal_period: {}", strategy.signal_period);
    eprintln!("  fee:           {}", strategy.fee);

    eprintln!("\nConfig is valid");
    ExitCode::SUCCESS
}
