//! Day-by-day portfolio history and the trade log.

use chrono::NaiveDate;

use super::signal::Signal;

/// Snapshot after processing one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub date: NaiveDate,
    pub price: f64,
    pub signal: Signal,
    pub cash: f64,
    pub shares: f64,
    /// `cash + shares * price`
    pub value: f64,
    /// `(value - prev_value) / prev_value`, 0 on the first bar.
    pub daily_return: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeKind {
    Buy,
    Sell,
}

impl TradeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeKind::Buy => "BUY",
            TradeKind::Sell => "SELL",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub date: NaiveDate,
    pub kind: TradeKind,
    pub price: f64,
    pub shares: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub initial_capital: f64,
    pub states: Vec<PortfolioState>,
    pub trades: Vec<Trade>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            initial_capital,
            states: Vec::new(),
            trades: Vec::new(),
        }
    }

    pub fn record_state(&mut self, state: PortfolioState) {
        self.states.push(state);
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Value on the last bar, or the starting capital for an empty history.
    pub fn final_value(&self) -> f64 {
        self.states
            .last()
            .map(|s| s.value)
            .unwrap_or(self.initial_capital)
    }

    pub fn values(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.value).collect()
    }

    pub fn daily_returns(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.daily_return).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.states.iter().map(|s| s.date).collect()
    }
}
