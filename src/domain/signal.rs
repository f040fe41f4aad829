//! Signal generation for the three strategy variants.
//!
//! Every generator returns one [`Signal`] per bar. Index 0 is always `Hold`,
//! as is any bar where an indicator the variant reads is still warming up.
//!
//! Crossovers compare the pair at (i-1, i). When the previous pair is still
//! undefined (the first bar after warmup) the prior relation counts as
//! neutral, so the first strict ordering of the two lines registers as a
//! cross in that direction.

use crate::domain::indicator::{IndicatorMap, IndicatorType, MacdPoint};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::strategy::{CrossoverParams, CrossoverRsiParams, MacdVolumeParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Sell,
    Hold,
    Buy,
}

impl Signal {
    /// -1 / 0 / 1 encoding used in reports.
    pub fn value(self) -> i8 {
        match self {
            Signal::Sell => -1,
            Signal::Hold => 0,
            Signal::Buy => 1,
        }
    }

    /// Resolve a day's buy and sell conditions; a sell always wins.
    pub fn resolve(buy: bool, sell: bool) -> Self {
        if sell {
            Signal::Sell
        } else if buy {
            Signal::Buy
        } else {
            Signal::Hold
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cross {
    Above,
    Below,
    Neither,
}

/// Classify the move of `fast` relative to `slow` between two bars.
///
/// Each pair is `(fast, slow)`. A missing previous pair is treated as equal.
pub fn crossover(prev: Option<(f64, f64)>, curr: (f64, f64)) -> Cross {
    let (prev_fast, prev_slow) = prev.unwrap_or((0.0, 0.0));
    let (curr_fast, curr_slow) = curr;

    if prev_fast <= prev_slow && curr_fast > curr_slow {
        Cross::Above
    } else if prev_fast >= prev_slow && curr_fast < curr_slow {
        Cross::Below
    } else {
        Cross::Neither
    }
}

fn simple_pair(
    indicators: &IndicatorMap,
    fast: IndicatorType,
    slow: IndicatorType,
    index: usize,
) -> Option<(f64, f64)> {
    let fast = indicators.get(&fast)?.simple_at(index)?;
    let slow = indicators.get(&slow)?.simple_at(index)?;
    Some((fast, slow))
}

fn ma_cross(
    indicators: &IndicatorMap,
    short_window: usize,
    long_window: usize,
    i: usize,
) -> Option<Cross> {
    let short = IndicatorType::Sma(short_window);
    let long = IndicatorType::Sma(long_window);
    let curr = simple_pair(indicators, short, long, i)?;
    let prev = simple_pair(indicators, short, long, i - 1);
    Some(crossover(prev, curr))
}

/// Moving-average crossover: buy on a golden cross, sell on a death cross.
pub fn crossover_signals(
    bars: &[OhlcvBar],
    indicators: &IndicatorMap,
    params: &CrossoverParams,
) -> Vec<Signal> {
    let mut signals = vec![Signal::Hold; bars.len()];

    for (i, signal) in signals.iter_mut().enumerate().skip(1) {
        *signal = match ma_cross(indicators, params.short_window, params.long_window, i) {
            Some(Cross::Above) => Signal::Buy,
            Some(Cross::Below) => Signal::Sell,
            _ => Signal::Hold,
        };
    }

    signals
}

/// Crossover filtered by RSI: buy on a golden cross while RSI is below the
/// buy threshold; sell on a death cross or whenever RSI is overbought.
pub fn crossover_rsi_signals(
    bars: &[OhlcvBar],
    indicators: &IndicatorMap,
    params: &CrossoverRsiParams,
) -> Vec<Signal> {
    let mut signals = vec![Signal::Hold; bars.len()];
    let Some(rsi_series) = indicators.get(&IndicatorType::Rsi(params.rsi_period)) else {
        return signals;
    };

    for (i, signal) in signals.iter_mut().enumerate().skip(1) {
        let Some(cross) = ma_cross(indicators, params.short_window, params.long_window, i) else {
            continue;
        };
        let Some(rsi) = rsi_series.simple_at(i) else {
            continue;
        };

        let buy = cross == Cross::Above && rsi < params.rsi_buy_threshold;
        let sell = cross == Cross::Below || rsi > params.rsi_overbought_threshold;
        *signal = Signal::resolve(buy, sell);
    }

    signals
}

/// MACD with volume confirmation: buy when the MACD line crosses above its
/// signal line on above-average volume; sell on the opposite cross or any
/// negative histogram.
pub fn macd_volume_signals(
    bars: &[OhlcvBar],
    indicators: &IndicatorMap,
    params: &MacdVolumeParams,
) -> Vec<Signal> {
    let mut signals = vec![Signal::Hold; bars.len()];
    let (Some(macd_series), Some(volume_ma_series)) = (
        indicators.get(&params.macd_type()),
        indicators.get(&IndicatorType::VolumeSma(params.volume_ma_period)),
    ) else {
        return signals;
    };

    let pair = |p: MacdPoint| (p.line, p.signal);

    for (i, signal) in signals.iter_mut().enumerate().skip(1) {
        let (Some(curr), Some(volume_ma)) =
            (macd_series.macd_at(i), volume_ma_series.simple_at(i))
        else {
            continue;
        };
        let cross = crossover(macd_series.macd_at(i - 1).map(pair), pair(curr));

        let volume_confirmed = bars[i].volume > volume_ma * params.volume_threshold;
        let buy = cross == Cross::Above && volume_confirmed;
        let sell = cross == Cross::Below || curr.histogram < 0.0;
        *signal = Signal::resolve(buy, sell);
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::{compute_indicators, IndicatorSeries};
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    fn simple_series(
        indicator_type: IndicatorType,
        bars: &[OhlcvBar],
        raw: &[Option<f64>],
    ) -> IndicatorSeries {
        IndicatorSeries::from_options(indicator_type, bars, raw)
    }

    #[test]
    fn signal_values() {
        assert_eq!(Signal::Sell.value(), -1);
        assert_eq!(Signal::Hold.value(), 0);
        assert_eq!(Signal::Buy.value(), 1);
    }

    #[test]
    fn resolve_sell_wins() {
        assert_eq!(Signal::resolve(true, true), Signal::Sell);
        assert_eq!(Signal::resolve(true, false), Signal::Buy);
        assert_eq!(Signal::resolve(false, true), Signal::Sell);
        assert_eq!(Signal::resolve(false, false), Signal::Hold);
    }

    #[test]
    fn crossover_detects_golden_cross() {
        assert_eq!(crossover(Some((9.0, 10.0)), (11.0, 10.0)), Cross::Above);
        assert_eq!(crossover(Some((10.0, 10.0)), (11.0, 10.0)), Cross::Above);
    }

    #[test]
    fn crossover_detects_death_cross() {
        assert_eq!(crossover(Some((11.0, 10.0)), (9.0, 10.0)), Cross::Below);
        assert_eq!(crossover(Some((10.0, 10.0)), (9.0, 10.0)), Cross::Below);
    }

    #[test]
    fn crossover_no_cross_when_order_unchanged() {
        assert_eq!(crossover(Some((11.0, 10.0)), (12.0, 10.0)), Cross::Neither);
        assert_eq!(crossover(Some((9.0, 10.0)), (8.0, 10.0)), Cross::Neither);
        assert_eq!(crossover(Some((10.0, 10.0)), (10.0, 10.0)), Cross::Neither);
    }

    #[test]
    fn crossover_without_previous_pair_is_neutral() {
        assert_eq!(crossover(None, (11.0, 10.0)), Cross::Above);
        assert_eq!(crossover(None, (9.0, 10.0)), Cross::Below);
        assert_eq!(crossover(None, (10.0, 10.0)), Cross::Neither);
    }

    #[test]
    fn crossover_signals_on_price_series() {
        // SMA(2) vs SMA(3): both defined from index 2
        let bars = make_bars(&[10.0, 10.0, 10.0, 12.0, 14.0, 9.0, 6.0]);
        let params = CrossoverParams {
            short_window: 2,
            long_window: 3,
        };
        let indicators = compute_indicators(&bars, &[IndicatorType::Sma(2), IndicatorType::Sma(3)]);
        let signals = crossover_signals(&bars, &indicators, &params);

        assert_eq!(signals.len(), bars.len());
        assert_eq!(signals[0], Signal::Hold);
        assert_eq!(signals[1], Signal::Hold);
        assert_eq!(signals[2], Signal::Hold);
        assert_eq!(signals[3], Signal::Buy);
        assert_eq!(signals[4], Signal::Hold);
        assert_eq!(signals[5], Signal::Sell);
        assert_eq!(signals[6], Signal::Hold);
    }

    #[test]
    fn crossover_signals_missing_indicator_is_all_hold() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let params = CrossoverParams {
            short_window: 2,
            long_window: 3,
        };
        let signals = crossover_signals(&bars, &IndicatorMap::new(), &params);
        assert_eq!(signals, vec![Signal::Hold; 3]);
    }

    fn rsi_fixture(rsi: &[Option<f64>]) -> (Vec<OhlcvBar>, IndicatorMap) {
        let bars = make_bars(&[10.0, 10.0, 10.0, 10.0]);
        let mut map = IndicatorMap::new();
        map.insert(
            IndicatorType::Sma(2),
            simple_series(
                IndicatorType::Sma(2),
                &bars,
                &[None, Some(10.0), Some(11.0), Some(9.0)],
            ),
        );
        map.insert(
            IndicatorType::Sma(3),
            simple_series(
                IndicatorType::Sma(3),
                &bars,
                &[None, Some(10.0), Some(10.0), Some(10.0)],
            ),
        );
        map.insert(
            IndicatorType::Rsi(3),
            simple_series(IndicatorType::Rsi(3), &bars, rsi),
        );
        (bars, map)
    }

    fn rsi_params() -> CrossoverRsiParams {
        CrossoverRsiParams {
            short_window: 2,
            long_window: 3,
            rsi_period: 3,
            rsi_buy_threshold: 50.0,
            rsi_overbought_threshold: 70.0,
        }
    }

    #[test]
    fn rsi_filter_allows_buy_when_not_hot() {
        let (bars, map) = rsi_fixture(&[None, Some(40.0), Some(40.0), Some(40.0)]);
        let signals = crossover_rsi_signals(&bars, &map, &rsi_params());
        assert_eq!(signals, vec![Signal::Hold, Signal::Hold, Signal::Buy, Signal::Sell]);
    }

    #[test]
    fn rsi_filter_blocks_buy_when_rsi_high() {
        let (bars, map) = rsi_fixture(&[None, Some(60.0), Some(60.0), Some(60.0)]);
        let signals = crossover_rsi_signals(&bars, &map, &rsi_params());
        assert_eq!(signals[2], Signal::Hold);
        assert_eq!(signals[3], Signal::Sell);
    }

    #[test]
    fn rsi_overbought_sells_without_cross() {
        let (bars, map) = rsi_fixture(&[None, Some(75.0), Some(40.0), Some(40.0)]);
        let signals = crossover_rsi_signals(&bars, &map, &rsi_params());
        assert_eq!(signals[1], Signal::Sell);
    }

    #[test]
    fn rsi_sell_wins_over_buy() {
        // golden cross at index 2 with RSI below the buy threshold but above
        // a (deliberately low) overbought threshold
        let (bars, map) = rsi_fixture(&[None, Some(40.0), Some(45.0), Some(40.0)]);
        let params = CrossoverRsiParams {
            rsi_overbought_threshold: 42.0,
            ..rsi_params()
        };
        let signals = crossover_rsi_signals(&bars, &map, &params);
        assert_eq!(signals[2], Signal::Sell);
    }

    #[test]
    fn rsi_undefined_holds() {
        let (bars, map) = rsi_fixture(&[None, None, None, Some(40.0)]);
        let signals = crossover_rsi_signals(&bars, &map, &rsi_params());
        assert_eq!(signals[2], Signal::Hold);
        assert_eq!(signals[3], Signal::Sell);
    }

    fn macd_params() -> MacdVolumeParams {
        MacdVolumeParams {
            macd_fast: 2,
            macd_slow: 4,
            macd_signal: 2,
            volume_ma_period: 2,
            volume_threshold: 1.2,
        }
    }

    fn macd_fixture(
        points: &[(f64, f64)],
        volumes: &[f64],
        volume_ma: &[Option<f64>],
    ) -> (Vec<OhlcvBar>, IndicatorMap) {
        use crate::domain::indicator::{IndicatorPoint, IndicatorValue};

        let mut bars = make_bars(&vec![10.0; points.len()]);
        for (bar, v) in bars.iter_mut().zip(volumes) {
            bar.volume = *v;
        }
        let params = macd_params();
        let macd = IndicatorSeries {
            indicator_type: params.macd_type(),
            values: bars
                .iter()
                .zip(points)
                .map(|(b, &(line, signal))| IndicatorPoint {
                    date: b.date,
                    valid: true,
                    value: IndicatorValue::Macd {
                        line,
                        signal,
                        histogram: line - signal,
                    },
                })
                .collect(),
        };
        let mut map = IndicatorMap::new();
        map.insert(params.macd_type(), macd);
        map.insert(
            IndicatorType::VolumeSma(2),
            simple_series(IndicatorType::VolumeSma(2), &bars, volume_ma),
        );
        (bars, map)
    }

    #[test]
    fn macd_buy_requires_volume_confirmation() {
        let points = [(0.0, 0.0), (-1.0, 0.0), (1.0, 0.0)];
        let ma = [None, Some(1000.0), Some(1000.0)];

        let (bars, map) = macd_fixture(&points, &[1000.0, 1000.0, 1300.0], &ma);
        let signals = macd_volume_signals(&bars, &map, &macd_params());
        assert_eq!(signals[2], Signal::Buy);

        let (bars, map) = macd_fixture(&points, &[1000.0, 1000.0, 1100.0], &ma);
        let signals = macd_volume_signals(&bars, &map, &macd_params());
        assert_eq!(signals[2], Signal::Hold);
    }

    #[test]
    fn macd_negative_histogram_sells() {
        let points = [(0.0, 0.0), (1.0, 0.5), (1.0, 1.2), (0.9, 1.1), (2.0, 1.0)];
        let ma = [None, Some(1000.0), Some(1000.0), Some(1000.0), Some(1000.0)];
        let (bars, map) = macd_fixture(&points, &[1000.0; 5], &ma);
        let signals = macd_volume_signals(&bars, &map, &macd_params());

        assert_eq!(signals[0], Signal::Hold);
        // cross above without volume confirmation
        assert_eq!(signals[1], Signal::Hold);
        // cross below
        assert_eq!(signals[2], Signal::Sell);
        // no cross, histogram still negative
        assert_eq!(signals[3], Signal::Sell);
        assert_eq!(signals[4], Signal::Hold);
    }

    #[test]
    fn macd_volume_warmup_holds() {
        let points = [(0.0, 0.0), (-1.0, 0.0), (1.0, 0.0)];
        let (bars, map) = macd_fixture(&points, &[1000.0, 1000.0, 5000.0], &[None, None, None]);
        let signals = macd_volume_signals(&bars, &map, &macd_params());
        assert_eq!(signals, vec![Signal::Hold; 3]);
    }
}
