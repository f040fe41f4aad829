//! Execution simulator.
//!
//! A left-to-right fold over (bar, signal) pairs through a two-state machine:
//!
//! - Flat + Buy  -> Long: `shares = cash * (1 - c) / price`, cash = 0
//! - Long + Sell -> Flat: `cash = shares * price * (1 - c)`, shares = 0
//! - anything else: no transition, the signal is ignored
//!
//! Trades fill at the bar's close. Shares are fractional; there is no
//! slippage, interest, leverage, or partial fill.

use super::error::TradelabError;
use super::ohlcv::OhlcvBar;
use super::portfolio::{Portfolio, PortfolioState, Trade, TradeKind};
use super::position::Position;
use super::signal::Signal;

/// One step of the state machine. Returns the next position and the trade
/// it produced, if any.
pub fn step(
    position: Position,
    signal: Signal,
    bar: &OhlcvBar,
    commission_rate: f64,
) -> (Position, Option<Trade>) {
    let transition = match signal {
        Signal::Buy => position.buy(bar.close, commission_rate).map(|next| {
            let trade = Trade {
                date: bar.date,
                kind: TradeKind::Buy,
                price: bar.close,
                shares: next.shares(),
            };
            (next, trade)
        }),
        Signal::Sell => position.sell(bar.close, commission_rate).map(|next| {
            let trade = Trade {
                date: bar.date,
                kind: TradeKind::Sell,
                price: bar.close,
                shares: position.shares(),
            };
            (next, trade)
        }),
        Signal::Hold => None,
    };

    match transition {
        Some((next, trade)) => (next, Some(trade)),
        None => (position, None),
    }
}

/// Run the simulator over a full bar sequence.
///
/// `bars` and `signals` must be aligned one to one.
pub fn simulate(
    bars: &[OhlcvBar],
    signals: &[Signal],
    initial_capital: f64,
    commission_rate: f64,
) -> Result<Portfolio, TradelabError> {
    if bars.len() != signals.len() {
        return Err(TradelabError::validation(format!(
            "signal count ({}) does not match bar count ({})",
            signals.len(),
            bars.len()
        )));
    }

    let mut portfolio = Portfolio::new(initial_capital);
    let mut position = Position::Flat {
        cash: initial_capital,
    };
    let mut prev_value: Option<f64> = None;

    for (bar, &signal) in bars.iter().zip(signals) {
        let (next, trade) = step(position, signal, bar, commission_rate);
        position = next;
        if let Some(trade) = trade {
            portfolio.record_trade(trade);
        }

        let value = position.market_value(bar.close);
        let daily_return = match prev_value {
            Some(prev) if prev != 0.0 => (value - prev) / prev,
            _ => 0.0,
        };
        prev_value = Some(value);

        portfolio.record_state(PortfolioState {
            date: bar.date,
            price: bar.close,
            signal,
            cash: position.cash(),
            shares: position.shares(),
            value,
            daily_return,
        });
    }

    Ok(portfolio)
}
