//! Performance metrics derived from a completed portfolio history.

use std::collections::BTreeMap;

use super::ohlcv::OhlcvBar;
use super::portfolio::Portfolio;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub annual_return: f64,
    pub volatility: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub num_trades: usize,
    pub buy_hold_return: f64,
    pub excess_return: f64,
}

impl Metrics {
    /// Metric names in report order.
    pub const NAMES: [&'static str; 10] = [
        "initial_capital",
        "final_value",
        "total_return",
        "annual_return",
        "volatility",
        "max_drawdown",
        "sharpe_ratio",
        "num_trades",
        "buy_hold_return",
        "excess_return",
    ];

    /// `bars` are the close prices the portfolio was simulated on; they feed
    /// the buy-and-hold benchmark.
    pub fn compute(portfolio: &Portfolio, bars: &[OhlcvBar]) -> Self {
        let initial_capital = portfolio.initial_capital;
        let final_value = portfolio.final_value();

        let total_return = if initial_capital > 0.0 {
            (final_value - initial_capital) / initial_capital
        } else {
            0.0
        };

        let years = match (portfolio.states.first(), portfolio.states.last()) {
            (Some(first), Some(last)) => (last.date - first.date).num_days() as f64 / DAYS_PER_YEAR,
            _ => 0.0,
        };
        let annual_return = annualize(total_return, years);

        let volatility = sample_stddev(&portfolio.daily_returns()) * TRADING_DAYS_PER_YEAR.sqrt();
        let max_drawdown = max_drawdown(&portfolio.values());
        let sharpe_ratio = if volatility > 0.0 {
            annual_return / volatility
        } else {
            0.0
        };

        let buy_hold_return = match (bars.first(), bars.last()) {
            (Some(first), Some(last)) if first.close != 0.0 => {
                (last.close - first.close) / first.close
            }
            _ => 0.0,
        };

        Metrics {
            initial_capital,
            final_value,
            total_return,
            annual_return,
            volatility,
            max_drawdown,
            sharpe_ratio,
            num_trades: portfolio.trades.len(),
            buy_hold_return,
            excess_return: total_return - buy_hold_return,
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        let value = match name {
            "initial_capital" => self.initial_capital,
            "final_value" => self.final_value,
            "total_return" => self.total_return,
            "annual_return" => self.annual_return,
            "volatility" => self.volatility,
            "max_drawdown" => self.max_drawdown,
            "sharpe_ratio" => self.sharpe_ratio,
            "num_trades" => self.num_trades as f64,
            "buy_hold_return" => self.buy_hold_return,
            "excess_return" => self.excess_return,
            _ => return None,
        };
        Some(value)
    }

    /// `(name, value)` pairs in report order.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        Self::NAMES
            .iter()
            .filter_map(|&name| self.get(name).map(|v| (name, v)))
            .collect()
    }

    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        self.entries().into_iter().collect()
    }
}

/// `(1 + total_return)^(1 / years) - 1`, or 0 for a zero-length period.
pub fn annualize(total_return: f64, years: f64) -> f64 {
    if years > 0.0 && total_return.is_finite() {
        (1.0 + total_return).powf(1.0 / years) - 1.0
    } else {
        0.0
    }
}

/// Sample (n - 1) standard deviation; 0 with fewer than two observations.
pub fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Most negative `(value - running_max) / running_max`; never positive.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &value in values {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = (value - peak) / peak;
            if dd < worst {
                worst = dd;
            }
        }
    }
    worst
}
