//! Configuration loading and validation.
//!
//! Reads every section a run needs through [`ConfigPort`], validates it, and
//! resolves it into typed settings before any data is touched. Problems with
//! configured values surface as `ConfigMissing` / `ConfigInvalid`; warnings
//! are returned alongside the settings.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

use crate::domain::backtest::{BacktestConfig, DEFAULT_COMMISSION_RATE, DEFAULT_INITIAL_CAPITAL};
use crate::domain::error::TradelabError;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::strategy::{
    CrossoverParams, CrossoverRsiParams, MacdVolumeParams, Strategy, StrategyKind,
    DEFAULT_LONG_WINDOW, DEFAULT_RSI_BUY_THRESHOLD, DEFAULT_RSI_OVERBOUGHT, DEFAULT_RSI_PERIOD,
    DEFAULT_SHORT_WINDOW, DEFAULT_VOLUME_MA_PERIOD, DEFAULT_VOLUME_THRESHOLD,
};
use crate::domain::universe::{parse_symbols, Universe};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CACHE_TTL_SECS: i64 = 3600;

/// Everything a run needs, resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub backtest: BacktestConfig,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub universe: Universe,
    pub strategy: Strategy,
    pub data_dir: PathBuf,
    pub cache_ttl: Duration,
    pub output_dir: Option<PathBuf>,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub symbols: Option<String>,
    pub strategy: Option<StrategyKind>,
    pub output_dir: Option<PathBuf>,
}

pub fn load_settings(
    config: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<(RunSettings, Vec<String>), TradelabError> {
    let backtest = load_backtest_config(config)?;
    let (start_date, end_date) = load_date_range(config)?;
    let universe = match &overrides.symbols {
        Some(s) => parse_symbols(s).map_err(|e| invalid("backtest", "symbols", e.to_string()))?,
        None => load_universe(config)?,
    };
    let (strategy, warnings) = load_strategy(config, overrides.strategy)?;

    let data_dir = PathBuf::from(
        config
            .get_string("data", "dir")
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
    );
    let ttl_secs = config.get_int("cache", "ttl_seconds", DEFAULT_CACHE_TTL_SECS)?;
    let ttl_secs = u64::try_from(ttl_secs)
        .map_err(|_| invalid("cache", "ttl_seconds", "must not be negative".to_string()))?;
    let output_dir = overrides
        .output_dir
        .clone()
        .or_else(|| config.get_string("report", "output_dir").map(PathBuf::from));

    Ok((
        RunSettings {
            backtest,
            start_date,
            end_date,
            universe,
            strategy,
            data_dir,
            cache_ttl: Duration::from_secs(ttl_secs),
            output_dir,
        },
        warnings,
    ))
}

/// Validate the whole file; returns warnings when it is usable.
pub fn validate_config(config: &dyn ConfigPort) -> Result<Vec<String>, TradelabError> {
    load_settings(config, &Overrides::default()).map(|(_, warnings)| warnings)
}

pub fn load_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, TradelabError> {
    let initial_capital =
        config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL)?;
    if !(initial_capital.is_finite() && initial_capital > 0.0) {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive".to_string(),
        ));
    }

    let commission_rate =
        config.get_double("backtest", "commission_rate", DEFAULT_COMMISSION_RATE)?;
    if !(0.0..1.0).contains(&commission_rate) {
        return Err(invalid(
            "backtest",
            "commission_rate",
            "commission_rate must be in [0, 1)".to_string(),
        ));
    }

    Ok(BacktestConfig {
        initial_capital,
        commission_rate,
    })
}

pub fn load_date_range(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), TradelabError> {
    let start_date = parse_date(config.get_string("backtest", "start_date"), "start_date")?;
    let end_date = parse_date(config.get_string("backtest", "end_date"), "end_date")?;

    if start_date >= end_date {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date".to_string(),
        ));
    }
    Ok((start_date, end_date))
}

fn parse_date(value: Option<String>, field: &str) -> Result<NaiveDate, TradelabError> {
    match value {
        None => Err(TradelabError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
            invalid(
                "backtest",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

/// `symbols` (comma-separated) wins over `symbol`.
pub fn load_universe(config: &dyn ConfigPort) -> Result<Universe, TradelabError> {
    let (key, raw) = match (
        config.get_string("backtest", "symbols"),
        config.get_string("backtest", "symbol"),
    ) {
        (Some(list), _) => ("symbols", list),
        (None, Some(one)) => ("symbol", one),
        (None, None) => {
            return Err(TradelabError::ConfigMissing {
                section: "backtest".to_string(),
                key: "symbols".to_string(),
            })
        }
    };
    parse_symbols(&raw).map_err(|e| invalid("backtest", key, e.to_string()))
}

/// Build the configured strategy. `kind_override` replaces `[strategy] kind`.
pub fn load_strategy(
    config: &dyn ConfigPort,
    kind_override: Option<StrategyKind>,
) -> Result<(Strategy, Vec<String>), TradelabError> {
    let kind = match kind_override {
        Some(kind) => kind,
        None => match config.get_string("strategy", "kind") {
            Some(raw) => raw
                .parse::<StrategyKind>()
                .map_err(|e| invalid("strategy", "kind", e.to_string()))?,
            None => StrategyKind::Crossover,
        },
    };

    let strategy = match kind {
        StrategyKind::Crossover => Strategy::CrossoverOnly(CrossoverParams {
            short_window: read_usize(config, "short_window", DEFAULT_SHORT_WINDOW)?,
            long_window: read_usize(config, "long_window", DEFAULT_LONG_WINDOW)?,
        }),
        StrategyKind::CrossoverRsi => Strategy::CrossoverRsi(CrossoverRsiParams {
            short_window: read_usize(config, "short_window", DEFAULT_SHORT_WINDOW)?,
            long_window: read_usize(config, "long_window", DEFAULT_LONG_WINDOW)?,
            rsi_period: read_usize(config, "rsi_period", DEFAULT_RSI_PERIOD)?,
            rsi_buy_threshold: config.get_double(
                "strategy",
                "rsi_buy_threshold",
                DEFAULT_RSI_BUY_THRESHOLD,
            )?,
            rsi_overbought_threshold: config.get_double(
                "strategy",
                "rsi_overbought",
                DEFAULT_RSI_OVERBOUGHT,
            )?,
        }),
        StrategyKind::MacdVolume => Strategy::MacdVolume(MacdVolumeParams {
            macd_fast: read_usize(config, "macd_fast", DEFAULT_FAST)?,
            macd_slow: read_usize(config, "macd_slow", DEFAULT_SLOW)?,
            macd_signal: read_usize(config, "macd_signal", DEFAULT_SIGNAL)?,
            volume_ma_period: read_usize(config, "volume_ma_period", DEFAULT_VOLUME_MA_PERIOD)?,
            volume_threshold: config.get_double(
                "strategy",
                "volume_threshold",
                DEFAULT_VOLUME_THRESHOLD,
            )?,
        }),
    };

    let warnings = strategy.validate().map_err(|e| match e {
        TradelabError::Parameter { name, reason } => invalid("strategy", &name, reason),
        other => other,
    })?;
    Ok((strategy, warnings))
}

fn read_usize(
    config: &dyn ConfigPort,
    key: &str,
    default: usize,
) -> Result<usize, TradelabError> {
    let value = config.get_int("strategy", key, default as i64)?;
    usize::try_from(value)
        .map_err(|_| invalid("strategy", key, format!("{} must not be negative", key)))
}

fn invalid(section: &str, key: &str, reason: String) -> TradelabError {
    TradelabError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}
