//! Report generation port trait.

use std::path::{Path, PathBuf};

use crate::domain::backtest::BacktestResult;
use crate::domain::combine::CombinedResult;
use crate::domain::error::TradelabError;

/// Port for writing backtest reports. Returns the paths written.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        symbol: &str,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, TradelabError>;

    fn write_combined(
        &self,
        result: &CombinedResult,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, TradelabError>;
}
