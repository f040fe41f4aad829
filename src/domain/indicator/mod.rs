//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values
//!
//! The raw numeric kernels (`sma_values`, `ema_values`, `rsi_values`) work on
//! plain `f64` slices so they can be chained (MACD's signal line is an EMA of
//! the MACD line). The `calculate_*` wrappers attach bar dates and validity.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use ema::{calculate_ema, ema_values};
pub use macd::calculate_macd;
pub use rsi::{calculate_rsi, rsi_values};
pub use sma::{calculate_sma, calculate_volume_sma, sma_values};

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    VolumeSma(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

/// Pre-computed indicators for one bar sequence, keyed by identity.
pub type IndicatorMap = HashMap<IndicatorType, IndicatorSeries>;

/// MACD components at a single bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

impl IndicatorSeries {
    /// Build a single-valued series from kernel output, `None` marking warmup.
    pub fn from_options(
        indicator_type: IndicatorType,
        bars: &[OhlcvBar],
        raw: &[Option<f64>],
    ) -> Self {
        let values = bars
            .iter()
            .zip(raw)
            .map(|(bar, v)| IndicatorPoint {
                date: bar.date,
                valid: v.is_some(),
                value: IndicatorValue::Simple(v.unwrap_or(0.0)),
            })
            .collect();
        IndicatorSeries {
            indicator_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, or `None` during warmup, out of range, or for a
    /// multi-valued indicator.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        match self.values.get(index) {
            Some(IndicatorPoint {
                valid: true,
                value: IndicatorValue::Simple(v),
                ..
            }) => Some(*v),
            _ => None,
        }
    }

    /// MACD triple at `index`, or `None` when undefined.
    pub fn macd_at(&self, index: usize) -> Option<MacdPoint> {
        match self.values.get(index) {
            Some(IndicatorPoint {
                valid: true,
                value:
                    IndicatorValue::Macd {
                        line,
                        signal,
                        histogram,
                    },
                ..
            }) => Some(MacdPoint {
                line: *line,
                signal: *signal,
                histogram: *histogram,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::VolumeSma(period) => write!(f, "VOLUME_SMA({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}

/// Compute one indicator over a bar sequence.
pub fn calculate(bars: &[OhlcvBar], indicator_type: IndicatorType) -> IndicatorSeries {
    match indicator_type {
        IndicatorType::Sma(period) => calculate_sma(bars, period),
        IndicatorType::Ema(period) => calculate_ema(bars, period),
        IndicatorType::Rsi(period) => calculate_rsi(bars, period),
        IndicatorType::VolumeSma(period) => calculate_volume_sma(bars, period),
        IndicatorType::Macd { fast, slow, signal } => calculate_macd(bars, fast, slow, signal),
    }
}

/// Compute every requested indicator once; duplicates collapse onto one key.
pub fn compute_indicators(bars: &[OhlcvBar], types: &[IndicatorType]) -> IndicatorMap {
    let mut map = IndicatorMap::with_capacity(types.len());
    for &indicator_type in types {
        map.entry(indicator_type)
            .or_insert_with(|| calculate(bars, indicator_type));
    }
    map
}
