//! OHLCV bar representation and input validation.

use chrono::NaiveDate;

use super::error::TradelabError;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Closing prices of a bar slice, in order.
pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Volumes of a bar slice, in order.
pub fn volumes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume).collect()
}

/// Check a bar sequence before it enters the core.
///
/// Rejects: an empty sequence, non-increasing or duplicate dates, non-finite
/// prices or volume, a non-positive close, and negative volume. Nothing is
/// repaired; the first offending bar is reported.
pub fn validate_bars(bars: &[OhlcvBar]) -> Result<(), TradelabError> {
    if bars.is_empty() {
        return Err(TradelabError::validation("bar sequence is empty"));
    }

    for (i, bar) in bars.iter().enumerate() {
        let fields = [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
            ("volume", bar.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(TradelabError::validation(format!(
                    "{} on {} is missing or not a number",
                    name, bar.date
                )));
            }
        }
        if bar.close <= 0.0 {
            return Err(TradelabError::validation(format!(
                "close on {} must be positive, got {}",
                bar.date, bar.close
            )));
        }
        if bar.volume < 0.0 {
            return Err(TradelabError::validation(format!(
                "volume on {} must be non-negative, got {}",
                bar.date, bar.volume
            )));
        }
        if i > 0 && bar.date <= bars[i - 1].date {
            return Err(TradelabError::validation(format!(
                "dates must be strictly increasing: {} follows {}",
                bar.date,
                bars[i - 1].date
            )));
        }
    }

    Ok(())
}
