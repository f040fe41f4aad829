//! CLI definition and dispatch.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{info, warn};

use crate::adapters::cache::CachingDataPort;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestResult};
use crate::domain::combine::{combine_results, run_universe, CombinedResult, SymbolResult};
use crate::domain::config_validation::{load_settings, Overrides, RunSettings, DEFAULT_DATA_DIR};
use crate::domain::error::TradelabError;
use crate::domain::metrics::Metrics;
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tradelab", about = "Rule-based trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over one symbol or a universe
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated symbols, overriding the config file
        #[arg(short, long)]
        symbol: Option<String>,
        /// crossover, crossover_rsi or macd_volume
        #[arg(long)]
        strategy: Option<StrategyKind>,
        /// Directory for CSV reports
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check a config file without loading any data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            strategy,
            output,
        } => {
            let overrides = Overrides {
                symbols: symbol,
                strategy,
                output_dir: output,
            };
            report_errors(run_backtest_command(&config, &overrides))
        }
        Command::Validate { config } => report_errors(run_validate(&config)),
        Command::ListSymbols { config } => report_errors(run_list_symbols(&config)),
    }
}

fn report_errors(result: Result<(), TradelabError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TradelabError> {
    let adapter = FileConfigAdapter::from_file(path)?;
    info!("loaded config from {}", path.display());
    Ok(adapter)
}

fn load(path: &Path, overrides: &Overrides) -> Result<RunSettings, TradelabError> {
    let adapter = load_config(path)?;
    let (settings, warnings) = load_settings(&adapter, overrides)?;
    for w in &warnings {
        warn!("{}", w);
    }
    Ok(settings)
}

fn run_backtest_command(config_path: &Path, overrides: &Overrides) -> Result<(), TradelabError> {
    let settings = load(config_path, overrides)?;
    let data_port = CachingDataPort::new(
        CsvAdapter::new(settings.data_dir.clone()),
        settings.cache_ttl,
    );

    info!(
        "running {} on {} symbol(s), {} to {}",
        settings.strategy,
        settings.universe.count(),
        settings.start_date,
        settings.end_date,
    );

    if settings.universe.is_single() {
        let symbol = &settings.universe.symbols[0];
        let result = run_single(&data_port, symbol, &settings)?;
        print_summary(symbol, &result.metrics);
        if let Some(dir) = &settings.output_dir {
            let written = CsvReportAdapter::new().write(&result, symbol, dir)?;
            log_written(&written);
        }
        return Ok(());
    }

    let results = run_universe(
        &data_port,
        &settings.universe.symbols,
        settings.start_date,
        settings.end_date,
        &settings.strategy,
        &settings.backtest,
    )?;
    let combined = combine_results(&results)?;

    for r in &results {
        print_summary(&r.symbol, &r.result.metrics);
    }
    print_summary("COMBINED", &combined.metrics);

    if let Some(dir) = &settings.output_dir {
        write_universe_reports(&results, &combined, dir)?;
    }
    Ok(())
}

fn run_single(
    data_port: &dyn DataPort,
    symbol: &str,
    settings: &RunSettings,
) -> Result<BacktestResult, TradelabError> {
    let bars = data_port.fetch_ohlcv(symbol, settings.start_date, settings.end_date)?;
    if bars.is_empty() {
        return Err(TradelabError::Data {
            symbol: symbol.to_string(),
            reason: format!(
                "no bars between {} and {}",
                settings.start_date, settings.end_date
            ),
        });
    }
    run_backtest(&bars, &settings.strategy, &settings.backtest)
}

fn write_universe_reports(
    results: &[SymbolResult],
    combined: &CombinedResult,
    dir: &Path,
) -> Result<(), TradelabError> {
    let reporter = CsvReportAdapter::new();
    let mut written = Vec::new();
    for r in results {
        written.extend(reporter.write(&r.result, &r.symbol, dir)?);
    }
    written.extend(reporter.write_combined(combined, dir)?);
    log_written(&written);
    Ok(())
}

fn log_written(paths: &[PathBuf]) {
    for p in paths {
        info!("report written to {}", p.display());
    }
}

pub fn format_summary(label: &str, m: &Metrics) -> String {
    let pct = |v: f64| format!("{:.2}%", v * 100.0);
    [
        format!("=== {} ===", label),
        format!("Initial Capital:  {:.2}", m.initial_capital),
        format!("Final Value:      {:.2}", m.final_value),
        format!("Total Return:     {}", pct(m.total_return)),
        format!("Annual Return:    {}", pct(m.annual_return)),
        format!("Volatility:       {}", pct(m.volatility)),
        format!("Max Drawdown:     {}", pct(m.max_drawdown)),
        format!("Sharpe Ratio:     {:.2}", m.sharpe_ratio),
        format!("Trades:           {}", m.num_trades),
        format!("Buy & Hold:       {}", pct(m.buy_hold_return)),
        format!("Excess Return:    {}", pct(m.excess_return)),
    ]
    .join("\n")
}

fn print_summary(label: &str, m: &Metrics) {
    println!("{}\n", format_summary(label, m));
}

fn run_validate(config_path: &Path) -> Result<(), TradelabError> {
    let adapter = load_config(config_path)?;
    let (settings, warnings) = load_settings(&adapter, &Overrides::default())?;

    println!("Strategy:  {}", settings.strategy);
    println!("Symbols:   {}", settings.universe.symbols.join(", "));
    println!("Period:    {} to {}", settings.start_date, settings.end_date);
    println!("Capital:   {:.2}", settings.backtest.initial_capital);
    println!("Commission: {}", settings.backtest.commission_rate);
    for w in &warnings {
        println!("warning: {}", w);
    }
    println!("Configuration is valid.");
    Ok(())
}

fn run_list_symbols(config_path: &Path) -> Result<(), TradelabError> {
    let adapter = load_config(config_path)?;
    let data_dir = adapter
        .get_string("data", "dir")
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
    let symbols = CsvAdapter::new(PathBuf::from(data_dir)).list_symbols()?;
    if symbols.is_empty() {
        warn!("no symbols found");
    }
    for s in symbols {
        println!("{}", s);
    }
    Ok(())
}
