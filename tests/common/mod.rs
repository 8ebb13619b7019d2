#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use vcpscreen::domain::error::VcpError;
use vcpscreen::domain::price_series::{PriceBar, PriceSeries};
use vcpscreen::domain::screen_config::{DateRange, ScreenConfig};
use vcpscreen::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, symbol: &str, closes: &[f64]) -> Self {
        let bars = make_series(symbol, "2020-01-01", closes).bars().to_vec();
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(&self, symbol: &str, range: DateRange) -> Result<PriceSeries, VcpError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(VcpError::DataSource {
                reason: reason.clone(),
            });
        }
        let bars = self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .copied()
                    .filter(|b| range.contains(b.date))
                    .collect()
            })
            .unwrap_or_default();
        PriceSeries::new(symbol, bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, VcpError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_series(symbol: &str, start: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::from_closes(symbol, date(start), closes).unwrap()
}

/// Closes rising linearly from `from` to `to` over `len` bars.
pub fn linear(from: f64, to: f64, len: usize) -> Vec<f64> {
    let step = (to - from) / (len - 1) as f64;
    (0..len).map(|i| from + step * i as f64).collect()
}

/// Small windows so a short hand-built series can fulfil every criterion.
pub fn small_config() -> ScreenConfig {
    let mut config = ScreenConfig::default();
    config.ma_windows.short = 2;
    config.ma_windows.medium = 3;
    config.ma_windows.long = 4;
    config.ma_windows.longest = 5;
    config.slope_window = 3;
    config.year_window = 8;
    config.pivot_window = 3;
    config.contraction_window = 3;
    config.relative_strength_lag = 6;
    config.thresholds.contraction_max = 0.5;
    config
}

/// Fulfils every criterion of [`small_config`] on its last bar.
pub const BREAKOUT_CLOSES: [f64; 11] = [
    10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 18.0, 20.0, 24.0, 28.0,
];

pub const SMALL_SCREEN_INI: &str = "\
[screen]
ma_short = 2
ma_medium = 3
ma_long = 4
ma_longest = 5
slope_window = 3
year_window = 8
pivot_window = 3
contraction_window = 3
relative_strength_lag = 6
contraction_max = 0.5
";

pub fn write_price_csv(dir: &std::path::Path, symbol: &str, series: &PriceSeries) {
    let mut content = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for bar in series.bars() {
        content.push_str(&format!(
            "{},{c},{c},{c},{c},{c},1000\n",
            bar.date,
            c = bar.close
        ));
    }
    std::fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}
