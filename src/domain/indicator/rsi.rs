//! RSI (Relative Strength Index) indicator.
//!
//! Uses a plain rolling mean of gains and losses over the last n price
//! changes (no Wilder smoothing):
//! - gain[i] = max(P[i] - P[i-1], 0), loss[i] = max(P[i-1] - P[i], 0)
//! - avg_gain[i] = mean(gain[i-n+1..=i]), same for avg_loss
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100 (saturated).
//! A flat window (no gains, no losses) is undefined.
//!
//! Warmup: first n bars are invalid (need n price changes).

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::{closes, OhlcvBar};

pub fn rsi_values(series: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; series.len()];
    if period == 0 || series.len() <= period {
        return values;
    }

    let gains: Vec<f64> = series.windows(2).map(|w| (w[1] - w[0]).max(0.0)).collect();
    let losses: Vec<f64> = series.windows(2).map(|w| (w[0] - w[1]).max(0.0)).collect();

    // change index j describes the move from series[j] to series[j + 1]
    for i in period..series.len() {
        let window = (i - period)..i;
        let avg_gain = gains[window.clone()].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[window].iter().sum::<f64>() / period as f64;

        values[i] = match (avg_gain > 0.0, avg_loss > 0.0) {
            (false, false) => None,
            (true, false) => Some(100.0),
            _ => Some(100.0 - (100.0 / (1.0 + avg_gain / avg_loss))),
        };
    }

    values
}

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let raw = rsi_values(&closes(bars), period);
    IndicatorSeries::from_options(IndicatorType::Rsi(period), bars, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bar(date: &str, close: f64) -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn rsi_empty_bars() {
        let series = calculate_rsi(&[], 14);
        assert_eq!(series.values.len(), 0);
    }

    #[test]
    fn rsi_single_bar() {
        let bars = vec![make_bar("2024-01-01", 100.0)];
        let series = calculate_rsi(&bars, 14);
        assert_eq!(series.values.len(), 1);
        assert!(!series.values[0].valid);
    }

    #[test]
    fn rsi_warmup_period() {
        let bars: Vec<OhlcvBar> = (1..=15)
            .map(|i| {
                let date = format!("2024-01-{:02}", i);
                make_bar(&date, 100.0 + (i as f64 % 5.0) * 2.0)
            })
            .collect();

        let series = calculate_rsi(&bars, 14);

        assert_eq!(series.values.len(), 15);
        for i in 0..14 {
            assert!(!series.values[i].valid, "Bar {} should be invalid", i);
        }
        assert!(series.values[14].valid, "Bar 14 should be valid");
    }

    #[test]
    fn rsi_all_gains_saturates_at_100() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let raw = rsi_values(&prices, 14);
        assert_eq!(raw[14], Some(100.0));
    }

    #[test]
    fn rsi_flat_window_is_undefined() {
        let raw = rsi_values(&[100.0; 6], 3);
        assert!(raw.iter().all(Option::is_none));
    }

    #[test]
    fn rsi_recovers_after_flat_window() {
        // changes: 0, 0, 0, +1 ; window of 3 at index 4 sees 0, 0, +1
        let raw = rsi_values(&[100.0, 100.0, 100.0, 100.0, 101.0], 3);
        assert_eq!(raw[3], None);
        assert_eq!(raw[4], Some(100.0));
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let raw = rsi_values(&prices, 14);
        assert_eq!(raw[14], Some(0.0));
    }

    #[test]
    fn rsi_uses_simple_rolling_mean() {
        // changes: -2, -2, +1, +2 ; window of 3 at index 4 sees -2, +1, +2
        let raw = rsi_values(&[104.0, 102.0, 100.0, 101.0, 103.0], 3);
        let avg_gain = 3.0 / 3.0;
        let avg_loss = 2.0 / 3.0;
        let expected = 100.0 - 100.0 / (1.0 + avg_gain / avg_loss);
        assert_relative_eq!(raw[4].unwrap(), expected, epsilon = 1e-12);
        assert_relative_eq!(raw[4].unwrap(), 60.0, epsilon = 1e-9);
    }

    #[test]
    fn rsi_window_drops_old_changes() {
        // a large early loss leaves the window and RSI returns to 100
        let raw = rsi_values(&[110.0, 100.0, 101.0, 102.0, 103.0], 2);
        assert!(raw[2].unwrap() < 100.0);
        assert_eq!(raw[3], Some(100.0));
        assert_eq!(raw[4], Some(100.0));
    }

    #[test]
    fn rsi_in_range() {
        let prices: Vec<f64> = (1..=20)
            .map(|i| 100.0 + (i as f64 % 7.0 - 3.0) * 2.0)
            .collect();
        for rsi in rsi_values(&prices, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&rsi), "RSI {} out of range", rsi);
        }
    }

    #[test]
    fn rsi_indicator_type() {
        let bars = vec![make_bar("2024-01-01", 100.0)];
        let series = calculate_rsi(&bars, 14);
        assert_eq!(series.indicator_type, IndicatorType::Rsi(14));
    }

    #[test]
    fn rsi_zero_period() {
        let bars = vec![make_bar("2024-01-01", 100.0), make_bar("2024-01-02", 101.0)];
        let series = calculate_rsi(&bars, 0);
        assert_eq!(series.values.len(), 2);
        assert!(series.values.iter().all(|p| !p.valid));
    }
}
