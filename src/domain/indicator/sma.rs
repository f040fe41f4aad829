//! Simple Moving Average over closes or volume.
//!
//! SMA(n)[i] = mean(P[i-n+1..=i])
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::{closes, volumes, OhlcvBar};

/// Trailing-window mean. Each window is summed from scratch so equal inputs
/// produce bit-equal averages regardless of what came before.
pub fn sma_values(series: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; series.len()];
    }

    (0..series.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let sum: f64 = series[i + 1 - window..=i].iter().sum();
                Some(sum / window as f64)
            }
        })
        .collect()
}

pub fn calculate_sma(bars: &[OhlcvBar], window: usize) -> IndicatorSeries {
    let raw = sma_values(&closes(bars), window);
    IndicatorSeries::from_options(IndicatorType::Sma(window), bars, &raw)
}

pub fn calculate_volume_sma(bars: &[OhlcvBar], window: usize) -> IndicatorSeries {
    let raw = sma_values(&volumes(bars), window);
    IndicatorSeries::from_options(IndicatorType::VolumeSma(window), bars, &raw)
}
