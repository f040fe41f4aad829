//! Multi-asset runs and the combination of their results.
//!
//! Each symbol is backtested independently. Results are joined on the dates
//! every asset traded, summing portfolio values day by day.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use log::info;
use rayon::prelude::*;

use super::backtest::{run_backtest, BacktestConfig, BacktestResult};
use super::error::TradelabError;
use super::metrics::Metrics;
use super::strategy::Strategy;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolResult {
    pub symbol: String,
    pub result: BacktestResult,
}

/// One day of the combined portfolio.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedState {
    pub date: NaiveDate,
    pub value: f64,
    pub daily_return: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombinedResult {
    pub symbols: Vec<String>,
    pub states: Vec<CombinedState>,
    /// Equal-weighted mean of per-asset metrics; `num_trades` is the total.
    pub metrics: Metrics,
}

/// Load every symbol, then backtest them in parallel.
///
/// Data loading goes through the port one symbol at a time; the runs
/// themselves are independent and fan out over rayon. The first error
/// aborts the whole universe.
pub fn run_universe(
    data_port: &dyn DataPort,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
    strategy: &Strategy,
    config: &BacktestConfig,
) -> Result<Vec<SymbolResult>, TradelabError> {
    let loaded = symbols
        .iter()
        .map(|symbol| {
            let bars = data_port.fetch_ohlcv(symbol, start, end)?;
            info!("{}: loaded {} bars", symbol, bars.len());
            Ok((symbol.clone(), bars))
        })
        .collect::<Result<Vec<_>, TradelabError>>()?;

    loaded
        .par_iter()
        .map(|(symbol, bars)| {
            let result = run_backtest(bars, strategy, config)?;
            Ok(SymbolResult {
                symbol: symbol.clone(),
                result,
            })
        })
        .collect::<Result<Vec<_>, TradelabError>>()
}

/// Inner-join per-asset histories on their common dates.
pub fn combine_results(results: &[SymbolResult]) -> Result<CombinedResult, TradelabError> {
    if results.is_empty() {
        return Err(TradelabError::Combination {
            reason: "no results to combine".to_string(),
        });
    }

    let mut common: Option<BTreeSet<NaiveDate>> = None;
    for r in results {
        let dates: BTreeSet<NaiveDate> = r.result.portfolio.dates().into_iter().collect();
        common = Some(match common {
            None => dates,
            Some(acc) => acc.intersection(&dates).copied().collect(),
        });
    }
    let common = common.unwrap_or_default();

    if common.is_empty() {
        return Err(TradelabError::Combination {
            reason: format!(
                "{} assets share no trading dates",
                results.len()
            ),
        });
    }

    let mut totals: BTreeMap<NaiveDate, f64> = common.iter().map(|&d| (d, 0.0)).collect();
    for r in results {
        for state in &r.result.portfolio.states {
            if let Some(total) = totals.get_mut(&state.date) {
                *total += state.value;
            }
        }
    }

    let mut states = Vec::with_capacity(totals.len());
    let mut prev: Option<f64> = None;
    for (date, value) in totals {
        let daily_return = match prev {
            Some(p) if p != 0.0 => (value - p) / p,
            _ => 0.0,
        };
        prev = Some(value);
        states.push(CombinedState {
            date,
            value,
            daily_return,
        });
    }

    let metrics = aggregate_metrics(results.iter().map(|r| &r.result.metrics));
    info!(
        "combined {} assets over {} common dates",
        results.len(),
        states.len()
    );

    Ok(CombinedResult {
        symbols: results.iter().map(|r| r.symbol.clone()).collect(),
        states,
        metrics,
    })
}

/// Equal-weighted mean of every scalar metric except `num_trades`, which is
/// summed. Expects a non-empty input.
pub fn aggregate_metrics<'a>(metrics: impl Iterator<Item = &'a Metrics>) -> Metrics {
    let all: Vec<&Metrics> = metrics.collect();
    let n = all.len().max(1) as f64;
    let mean = |f: fn(&Metrics) -> f64| all.iter().map(|m| f(m)).sum::<f64>() / n;

    Metrics {
        initial_capital: mean(|m| m.initial_capital),
        final_value: mean(|m| m.final_value),
        total_return: mean(|m| m.total_return),
        annual_return: mean(|m| m.annual_return),
        volatility: mean(|m| m.volatility),
        max_drawdown: mean(|m| m.max_drawdown),
        sharpe_ratio: mean(|m| m.sharpe_ratio),
        num_trades: all.iter().map(|m| m.num_trades).sum(),
        buy_hold_return: mean(|m| m.buy_hold_return),
        excess_return: mean(|m| m.excess_return),
    }
}
