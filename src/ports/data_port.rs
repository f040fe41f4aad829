//! Price data access port.

use crate::domain::error::TradelabError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `symbol` with `start <= date < end`, oldest first.
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TradelabError>;

    fn list_symbols(&self) -> Result<Vec<String>, TradelabError>;
}
