//! Strategy variants and their parameter sets.
//!
//! The three rule variants are a closed set, so `Strategy` is an enum and
//! dispatch is a `match`. Each variant declares the indicators it reads;
//! the backtest computes them once and hands the map to the generator.

use std::fmt;
use std::str::FromStr;

use super::error::TradelabError;
use super::indicator::{compute_indicators, IndicatorMap, IndicatorType};
use super::ohlcv::OhlcvBar;
use super::signal::{crossover_rsi_signals, crossover_signals, macd_volume_signals, Signal};

pub const DEFAULT_SHORT_WINDOW: usize = 5;
pub const DEFAULT_LONG_WINDOW: usize = 30;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_RSI_BUY_THRESHOLD: f64 = 50.0;
pub const DEFAULT_RSI_OVERBOUGHT: f64 = 70.0;
pub const DEFAULT_VOLUME_MA_PERIOD: usize = 20;
pub const DEFAULT_VOLUME_THRESHOLD: f64 = 1.2;

#[derive(Debug, Clone, PartialEq)]
pub struct CrossoverParams {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for CrossoverParams {
    fn default() -> Self {
        CrossoverParams {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrossoverRsiParams {
    pub short_window: usize,
    pub long_window: usize,
    pub rsi_period: usize,
    pub rsi_buy_threshold: f64,
    pub rsi_overbought_threshold: f64,
}

impl Default for CrossoverRsiParams {
    fn default() -> Self {
        CrossoverRsiParams {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            rsi_period: DEFAULT_RSI_PERIOD,
            rsi_buy_threshold: DEFAULT_RSI_BUY_THRESHOLD,
            rsi_overbought_threshold: DEFAULT_RSI_OVERBOUGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacdVolumeParams {
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub volume_ma_period: usize,
    pub volume_threshold: f64,
}

impl MacdVolumeParams {
    pub fn macd_type(&self) -> IndicatorType {
        IndicatorType::Macd {
            fast: self.macd_fast,
            slow: self.macd_slow,
            signal: self.macd_signal,
        }
    }
}

impl Default for MacdVolumeParams {
    fn default() -> Self {
        use super::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
        MacdVolumeParams {
            macd_fast: DEFAULT_FAST,
            macd_slow: DEFAULT_SLOW,
            macd_signal: DEFAULT_SIGNAL,
            volume_ma_period: DEFAULT_VOLUME_MA_PERIOD,
            volume_threshold: DEFAULT_VOLUME_THRESHOLD,
        }
    }
}

/// Which rule variant to run, without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Crossover,
    CrossoverRsi,
    MacdVolume,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Crossover => "crossover",
            StrategyKind::CrossoverRsi => "crossover_rsi",
            StrategyKind::MacdVolume => "macd_volume",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = TradelabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crossover" => Ok(StrategyKind::Crossover),
            "crossover_rsi" => Ok(StrategyKind::CrossoverRsi),
            "macd_volume" => Ok(StrategyKind::MacdVolume),
            other => Err(TradelabError::parameter(
                "kind",
                format!(
                    "unknown strategy '{}' (expected crossover, crossover_rsi or macd_volume)",
                    other
                ),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    CrossoverOnly(CrossoverParams),
    CrossoverRsi(CrossoverRsiParams),
    MacdVolume(MacdVolumeParams),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::CrossoverOnly(_) => StrategyKind::Crossover,
            Strategy::CrossoverRsi(_) => StrategyKind::CrossoverRsi,
            Strategy::MacdVolume(_) => StrategyKind::MacdVolume,
        }
    }

    /// Human-readable label including parameters, e.g. `SMA Crossover (5/30)`.
    pub fn name(&self) -> String {
        match self {
            Strategy::CrossoverOnly(p) => {
                format!("SMA Crossover ({}/{})", p.short_window, p.long_window)
            }
            Strategy::CrossoverRsi(p) => format!(
                "SMA Crossover ({}/{}) + RSI({}) {}/{}",
                p.short_window,
                p.long_window,
                p.rsi_period,
                p.rsi_buy_threshold,
                p.rsi_overbought_threshold
            ),
            Strategy::MacdVolume(p) => format!(
                "MACD({},{},{}) + Volume({}) x{}",
                p.macd_fast, p.macd_slow, p.macd_signal, p.volume_ma_period, p.volume_threshold
            ),
        }
    }

    pub fn required_indicators(&self) -> Vec<IndicatorType> {
        match self {
            Strategy::CrossoverOnly(p) => vec![
                IndicatorType::Sma(p.short_window),
                IndicatorType::Sma(p.long_window),
            ],
            Strategy::CrossoverRsi(p) => vec![
                IndicatorType::Sma(p.short_window),
                IndicatorType::Sma(p.long_window),
                IndicatorType::Rsi(p.rsi_period),
            ],
            Strategy::MacdVolume(p) => vec![
                p.macd_type(),
                IndicatorType::VolumeSma(p.volume_ma_period),
            ],
        }
    }

    /// Reject unusable parameters. Suspicious but runnable combinations come
    /// back as warnings.
    pub fn validate(&self) -> Result<Vec<String>, TradelabError> {
        let mut warnings = Vec::new();
        match self {
            Strategy::CrossoverOnly(p) => {
                check_windows(p.short_window, p.long_window, &mut warnings)?;
            }
            Strategy::CrossoverRsi(p) => {
                check_windows(p.short_window, p.long_window, &mut warnings)?;
                require_positive("rsi_period", p.rsi_period)?;
                require_finite("rsi_buy_threshold", p.rsi_buy_threshold)?;
                require_finite("rsi_overbought", p.rsi_overbought_threshold)?;
                if p.rsi_buy_threshold >= p.rsi_overbought_threshold {
                    warnings.push(format!(
                        "rsi_buy_threshold ({}) >= rsi_overbought ({}): \
                         every allowed buy is also an overbought sell",
                        p.rsi_buy_threshold, p.rsi_overbought_threshold
                    ));
                }
            }
            Strategy::MacdVolume(p) => {
                require_positive("macd_fast", p.macd_fast)?;
                require_positive("macd_slow", p.macd_slow)?;
                require_positive("macd_signal", p.macd_signal)?;
                require_positive("volume_ma_period", p.volume_ma_period)?;
                require_finite("volume_threshold", p.volume_threshold)?;
                if p.volume_threshold < 0.0 {
                    return Err(TradelabError::parameter(
                        "volume_threshold",
                        "must not be negative",
                    ));
                }
                if p.macd_fast >= p.macd_slow {
                    warnings.push(format!(
                        "macd_fast ({}) >= macd_slow ({})",
                        p.macd_fast, p.macd_slow
                    ));
                }
            }
        }
        Ok(warnings)
    }

    /// Signals from indicators computed elsewhere (see [`Self::required_indicators`]).
    pub fn signals_from_indicators(
        &self,
        bars: &[OhlcvBar],
        indicators: &IndicatorMap,
    ) -> Vec<Signal> {
        match self {
            Strategy::CrossoverOnly(p) => crossover_signals(bars, indicators, p),
            Strategy::CrossoverRsi(p) => crossover_rsi_signals(bars, indicators, p),
            Strategy::MacdVolume(p) => macd_volume_signals(bars, indicators, p),
        }
    }

    pub fn generate_signals(&self, bars: &[OhlcvBar]) -> Vec<Signal> {
        let indicators = compute_indicators(bars, &self.required_indicators());
        self.signals_from_indicators(bars, &indicators)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

fn require_positive(name: &str, value: usize) -> Result<(), TradelabError> {
    if value == 0 {
        return Err(TradelabError::parameter(name, "must be positive"));
    }
    Ok(())
}

fn require_finite(name: &str, value: f64) -> Result<(), TradelabError> {
    if !value.is_finite() {
        return Err(TradelabError::parameter(name, "must be a finite number"));
    }
    Ok(())
}

fn check_windows(
    short: usize,
    long: usize,
    warnings: &mut Vec<String>,
) -> Result<(), TradelabError> {
    require_positive("short_window", short)?;
    require_positive("long_window", long)?;
    if short >= long {
        warnings.push(format!(
            "short_window ({}) >= long_window ({}): crossover signals will be inverted or absent",
            short, long
        ));
    }
    Ok(())
}
