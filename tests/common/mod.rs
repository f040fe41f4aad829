#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::Cell;
use std::collections::HashMap;
use tradelab::domain::error::TradelabError;
pub use tradelab::domain::ohlcv::OhlcvBar;
use tradelab::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub fetches: Cell<usize>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TradelabError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TradelabError::Data {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date < end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, TradelabError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: NaiveDate, close: f64, volume: f64) -> OhlcvBar {
    OhlcvBar {
        date,
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume,
    }
}

/// Consecutive calendar days starting at `start`, constant volume.
pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(start + chrono::Duration::days(i as i64), c, 1_000.0))
        .collect()
}

pub fn bars_with_volume(start: NaiveDate, closes: &[f64], volumes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&c, &v))| make_bar(start + chrono::Duration::days(i as i64), c, v))
        .collect()
}

pub fn rising(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}

/// CSV body in the data-directory format.
pub fn to_csv(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    out
}
