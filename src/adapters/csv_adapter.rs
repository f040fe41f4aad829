//! CSV file data adapter.
//!
//! One file per symbol, `<dir>/<SYMBOL>.csv`, with a
//! `date,open,high,low,close,volume` header. Capitalized headers as written
//! by common downloaders (`Date,Open,...`) are accepted too.

use crate::domain::error::TradelabError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "Open", deserialize_with = "csv::invalid_option")]
    open: Option<f64>,
    #[serde(alias = "High", deserialize_with = "csv::invalid_option")]
    high: Option<f64>,
    #[serde(alias = "Low", deserialize_with = "csv::invalid_option")]
    low: Option<f64>,
    #[serde(alias = "Close", deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
    #[serde(alias = "Volume", deserialize_with = "csv::invalid_option")]
    volume: Option<f64>,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

/// Accepts `YYYY-MM-DD`, ignoring any time-of-day suffix.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn row_to_bar(row: CsvRow, line: u64) -> Result<OhlcvBar, TradelabError> {
    let date = parse_date(&row.date).ok_or_else(|| {
        TradelabError::validation(format!("row {}: invalid date '{}'", line, row.date))
    })?;
    let field = |name: &str, value: Option<f64>| {
        value.ok_or_else(|| {
            TradelabError::validation(format!(
                "row {} ({}): missing or invalid {}",
                line, date, name
            ))
        })
    };
    Ok(OhlcvBar {
        date,
        open: field("open", row.open)?,
        high: field("high", row.high)?,
        low: field("low", row.low)?,
        close: field("close", row.close)?,
        volume: field("volume", row.volume)?,
    })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TradelabError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| TradelabError::Data {
            symbol: symbol.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (i, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = result?;
            // header is line 1
            let bar = row_to_bar(row, i as u64 + 2)?;
            if bar.date >= start_date && bar.date < end_date {
                bars.push(bar);
            }
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TradelabError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TradelabError::Data {
            symbol: "*".to_string(),
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
