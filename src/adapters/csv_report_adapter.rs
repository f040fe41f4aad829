//! CSV report adapter.
//!
//! Per symbol: `<SYM>_portfolio.csv`, `<SYM>_trades.csv`, `<SYM>_metrics.csv`.
//! For a combined run: `COMBINED_portfolio.csv` and `COMBINED_metrics.csv`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;
use serde::Serialize;

use crate::domain::backtest::BacktestResult;
use crate::domain::combine::CombinedResult;
use crate::domain::error::TradelabError;
use crate::domain::metrics::Metrics;
use crate::ports::report_port::ReportPort;

pub const COMBINED_PREFIX: &str = "COMBINED";

#[derive(Debug, Serialize)]
struct PortfolioRow {
    date: NaiveDate,
    price: f64,
    signal: i8,
    cash: f64,
    shares: f64,
    value: f64,
    daily_return: f64,
}

#[derive(Debug, Serialize)]
struct TradeRow {
    date: NaiveDate,
    kind: &'static str,
    price: f64,
    shares: f64,
}

#[derive(Debug, Serialize)]
struct CombinedRow {
    date: NaiveDate,
    value: f64,
    daily_return: f64,
}

#[derive(Debug, Serialize)]
struct MetricRow {
    metric: &'static str,
    value: f64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn write_rows<T: Serialize>(
    path: &Path,
    rows: impl IntoIterator<Item = T>,
) -> Result<(), TradelabError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_metrics(path: &Path, metrics: &Metrics) -> Result<(), TradelabError> {
    write_rows(
        path,
        metrics
            .entries()
            .into_iter()
            .map(|(metric, value)| MetricRow { metric, value }),
    )
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        symbol: &str,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, TradelabError> {
        fs::create_dir_all(output_dir)?;

        let portfolio_path = output_dir.join(format!("{}_portfolio.csv", symbol));
        write_rows(
            &portfolio_path,
            result.portfolio.states.iter().map(|s| PortfolioRow {
                date: s.date,
                price: s.price,
                signal: s.signal.value(),
                cash: s.cash,
                shares: s.shares,
                value: s.value,
                daily_return: s.daily_return,
            }),
        )?;

        let trades_path = output_dir.join(format!("{}_trades.csv", symbol));
        write_rows(
            &trades_path,
            result.portfolio.trades.iter().map(|t| TradeRow {
                date: t.date,
                kind: t.kind.as_str(),
                price: t.price,
                shares: t.shares,
            }),
        )?;

        let metrics_path = output_dir.join(format!("{}_metrics.csv", symbol));
        write_metrics(&metrics_path, &result.metrics)?;

        info!("wrote reports for {} to {}", symbol, output_dir.display());
        Ok(vec![portfolio_path, trades_path, metrics_path])
    }

    fn write_combined(
        &self,
        result: &CombinedResult,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, TradelabError> {
        fs::create_dir_all(output_dir)?;

        let portfolio_path = output_dir.join(format!("{}_portfolio.csv", COMBINED_PREFIX));
        write_rows(
            &portfolio_path,
            result.states.iter().map(|s| CombinedRow {
                date: s.date,
                value: s.value,
                daily_return: s.daily_return,
            }),
        )?;

        let metrics_path = output_dir.join(format!("{}_metrics.csv", COMBINED_PREFIX));
        write_metrics(&metrics_path, &result.metrics)?;

        info!("wrote combined reports to {}", output_dir.display());
        Ok(vec![portfolio_path, metrics_path])
    }
}
