//! Single-asset backtest: indicators, signals, simulation, metrics.
//!
//! `BacktestConfig` holds the run-level parameters shared by every strategy.

use log::{debug, info, warn};

use super::error::TradelabError;
use super::execution::simulate;
use super::indicator::compute_indicators;
use super::metrics::Metrics;
use super::ohlcv::{validate_bars, OhlcvBar};
use super::portfolio::Portfolio;
use super::signal::Signal;
use super::strategy::Strategy;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;
pub const DEFAULT_COMMISSION_RATE: f64 = 0.001;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub commission_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            commission_rate: DEFAULT_COMMISSION_RATE,
        }
    }
}

impl BacktestConfig {
    /// Capital must be positive and finite; commission must lie in [0, 1).
    pub fn validate(&self) -> Result<(), TradelabError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(TradelabError::parameter(
                "initial_capital",
                format!("must be positive, got {}", self.initial_capital),
            ));
        }
        if !(0.0..1.0).contains(&self.commission_rate) {
            return Err(TradelabError::parameter(
                "commission_rate",
                format!("must be in [0, 1), got {}", self.commission_rate),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy_name: String,
    pub signals: Vec<Signal>,
    pub portfolio: Portfolio,
    pub metrics: Metrics,
    /// Non-fatal parameter warnings, also logged.
    pub warnings: Vec<String>,
}

/// Run one strategy over one bar sequence.
///
/// Bars and parameters are validated first; nothing is simulated on failure.
pub fn run_backtest(
    bars: &[OhlcvBar],
    strategy: &Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, TradelabError> {
    validate_bars(bars)?;
    config.validate()?;
    let warnings = strategy.validate()?;
    for w in &warnings {
        warn!("{}", w);
    }

    let indicators = compute_indicators(bars, &strategy.required_indicators());
    debug!(
        "computed {} indicator series over {} bars",
        indicators.len(),
        bars.len()
    );

    let signals = strategy.signals_from_indicators(bars, &indicators);
    let portfolio = simulate(
        bars,
        &signals,
        config.initial_capital,
        config.commission_rate,
    )?;
    let metrics = Metrics::compute(&portfolio, bars);

    info!(
        "{}: {} bars, {} trades, final value {:.2}",
        strategy.name(),
        bars.len(),
        metrics.num_trades,
        metrics.final_value
    );

    Ok(BacktestResult {
        strategy_name: strategy.name(),
        signals,
        portfolio,
        metrics,
        warnings,
    })
}
