//! CSV file price adapter.
//!
//! One file per symbol, `<base>/<SYMBOL>.csv`, with a header row. The `date`
//! and `close` columns are found by name, so both plain `date,close` files and
//! full OHLCV downloads (`Date,Open,High,Low,Close,Adj Close,Volume`) load.

use crate::domain::error::VcpError;
use crate::domain::price_series::{PriceBar, PriceSeries};
use crate::domain::screen_config::DateRange;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use log::debug;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// `<base>/<symbol>.csv`, falling back to a file whose stem matches the
    /// symbol ignoring ASCII case, since symbols are upper-cased on input.
    fn csv_path(&self, symbol: &str) -> PathBuf {
        let exact = self.base_path.join(format!("{}.csv", symbol));
        if exact.is_file() {
            return exact;
        }

        let matched = fs::read_dir(&self.base_path).ok().and_then(|entries| {
            entries.filter_map(Result::ok).map(|e| e.path()).find(|path| {
                path.extension().is_some_and(|ext| ext == "csv")
                    && path
                        .file_stem()
                        .and_then(|stem| stem.to_str())
                        .is_some_and(|stem| stem.eq_ignore_ascii_case(symbol))
            })
        });
        matched.unwrap_or(exact)
    }
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize, VcpError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| VcpError::DataSource {
            reason: format!("missing {} column", name),
        })
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn parse_date(raw: &str) -> Result<NaiveDate, VcpError> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| VcpError::DataSource {
        reason: format!("invalid date '{}': {}", trimmed, e),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_prices(&self, symbol: &str, range: DateRange) -> Result<PriceSeries, VcpError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| VcpError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| VcpError::DataSource {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;
        let date_col = column(headers, "date")?;
        let close_col = column(headers, "close")?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| VcpError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date = parse_date(record.get(date_col).unwrap_or_default())?;
            if !range.contains(date) {
                continue;
            }

            let raw_close = record.get(close_col).unwrap_or_default().trim();
            if raw_close.is_empty() {
                debug!("{}: no close on {}, skipping row", symbol, date);
                continue;
            }
            let close: f64 = raw_close.parse().map_err(|e| VcpError::DataSource {
                reason: format!("invalid close value '{}': {}", raw_close, e),
            })?;

            bars.push(PriceBar { date, close });
        }

        bars.sort_by_key(|b| b.date);
        PriceSeries::new(symbol, bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, VcpError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| VcpError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| VcpError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            match name_str.strip_suffix(".csv") {
                Some(symbol) if !symbol.is_empty() => symbols.push(symbol.to_string()),
                _ => {}
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
