//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded with the first value: EMA[0] = P[0],
//! EMA[i] = P[i]*k + EMA[i-1]*(1-k).
//! No warmup: every bar is valid. MACD depends on this exact seed.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn ema_values(series: &[f64], period: usize) -> Vec<f64> {
    let mut values = Vec::with_capacity(series.len());
    if period == 0 {
        return values;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut iter = series.iter();
    let Some(&first) = iter.next() else {
        return values;
    };

    let mut ema = first;
    values.push(ema);
    for &price in iter {
        ema = price * k + ema * (1.0 - k);
        values.push(ema);
    }
    values
}

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(period),
            values: bars
                .iter()
                .map(|b| IndicatorPoint {
                    date: b.date,
                    valid: false,
                    value: IndicatorValue::Simple(0.0),
                })
                .collect(),
        };
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = bars
        .iter()
        .zip(ema_values(&closes, period))
        .map(|(bar, ema)| IndicatorPoint {
            date: bar.date,
            valid: true,
            value: IndicatorValue::Simple(ema),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}
