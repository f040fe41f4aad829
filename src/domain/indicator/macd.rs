//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Every EMA is seeded with its first input, so all three lines are valid
//! from the first bar.

use crate::domain::indicator::{
    ema_values, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::{closes, OhlcvBar};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[OhlcvBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };

    if fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: bars
                .iter()
                .map(|b| IndicatorPoint {
                    date: b.date,
                    valid: false,
                    value: IndicatorValue::Macd {
                        line: 0.0,
                        signal: 0.0,
                        histogram: 0.0,
                    },
                })
                .collect(),
        };
    }

    let prices = closes(bars);
    let ema_fast = ema_values(&prices, fast);
    let ema_slow = ema_values(&prices, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_values(&macd_line, signal_period);

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let line = macd_line[i];
            let signal = signal_line[i];
            IndicatorPoint {
                date: bar.date,
                valid: true,
                value: IndicatorValue::Macd {
                    line,
                    signal,
                    histogram: line - signal,
                },
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(bars: &[OhlcvBar]) -> IndicatorSeries {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
