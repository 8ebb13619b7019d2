//! Incremental per-symbol trend tracking.
//!
//! Each symbol keeps four streaming EMAs and a trailing price window. A symbol
//! is in uptrend when the fast averages sit above the slow ones; its ranking
//! scale is the annualised OLS slope of the window relative to its intercept.

use crate::domain::error::VcpError;
use crate::domain::price_series::{PriceSeries, build_unified_timeline};
use crate::domain::screen_config::TrackerConfig;
use chrono::NaiveDate;
use log::debug;
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Streaming EMA. k = 2/(n+1), seeded with the SMA of the first n values.
#[derive(Debug, Clone)]
pub struct IncrementalEma {
    period: usize,
    k: f64,
    sum: f64,
    count: usize,
    value: Option<f64>,
}

impl IncrementalEma {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            k: 2.0 / (period as f64 + 1.0),
            sum: 0.0,
            count: 0,
            value: None,
        }
    }

    pub fn update(&mut self, price: f64) {
        if self.period == 0 {
            return;
        }
        match self.value {
            Some(ema) => self.value = Some(price * self.k + ema * (1.0 - self.k)),
            None => {
                self.sum += price;
                self.count += 1;
                if self.count == self.period {
                    self.value = Some(self.sum / self.period as f64);
                }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// OLS fit of `prices` on their index, as slope / intercept * 252.
/// Zero when there are fewer than two points or the intercept is zero.
pub fn annualised_slope(prices: &[f64]) -> f64 {
    let n = prices.len();
    if n < 2 {
        return 0.0;
    }

    let nf = n as f64;
    let mean_x = (nf - 1.0) / 2.0;
    let mean_y = prices.iter().sum::<f64>() / nf;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, &y) in prices.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    if intercept == 0.0 {
        return 0.0;
    }
    let scaled = slope / intercept * TRADING_DAYS_PER_YEAR;
    if scaled.is_finite() { scaled } else { 0.0 }
}

#[derive(Debug, Clone)]
pub struct SymbolState {
    pub symbol: String,
    last_date: Option<NaiveDate>,
    fast: IncrementalEma,
    medium: IncrementalEma,
    slow: IncrementalEma,
    long: IncrementalEma,
    window: VecDeque<f64>,
    capacity: usize,
    slope: f64,
    scale: f64,
    is_uptrend: bool,
}

impl SymbolState {
    fn new(symbol: &str, config: &TrackerConfig) -> Self {
        let capacity = config.lookback + 1;
        Self {
            symbol: symbol.to_string(),
            last_date: None,
            fast: IncrementalEma::new(config.ema_fast),
            medium: IncrementalEma::new(config.ema_medium),
            slow: IncrementalEma::new(config.ema_slow),
            long: IncrementalEma::new(config.ema_long),
            window: VecDeque::with_capacity(capacity),
            capacity,
            slope: 0.0,
            scale: 0.0,
            is_uptrend: false,
        }
    }

    fn update(&mut self, date: NaiveDate, price: f64) -> Result<(), VcpError> {
        if !price.is_finite() {
            return Err(VcpError::InvalidInput {
                reason: format!("{}: non-finite price on {}", self.symbol, date),
            });
        }
        if let Some(last) = self.last_date.filter(|&last| date <= last) {
            return Err(VcpError::InvalidInput {
                reason: format!(
                    "{}: update for {} is not after {}",
                    self.symbol, date, last
                ),
            });
        }
        self.last_date = Some(date);

        for ema in [
            &mut self.fast,
            &mut self.medium,
            &mut self.slow,
            &mut self.long,
        ] {
            ema.update(price);
        }

        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(price);

        self.is_uptrend = match (
            self.fast.value(),
            self.medium.value(),
            self.slow.value(),
            self.long.value(),
        ) {
            (Some(fast), Some(medium), Some(slow), Some(long)) => {
                fast > slow && medium > long && slow > long
            }
            _ => false,
        };

        self.slope = if self.window.len() == self.capacity {
            annualised_slope(self.window.make_contiguous())
        } else {
            0.0
        };

        // a broken trend keeps the last ranking scale
        if self.is_uptrend {
            self.scale = self.slope;
        }
        Ok(())
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.last_date
    }

    pub fn is_ready(&self) -> bool {
        [&self.fast, &self.medium, &self.slow, &self.long]
            .iter()
            .all(|ema| ema.is_ready())
    }

    pub fn is_uptrend(&self) -> bool {
        self.is_uptrend
    }

    /// Annualised slope of the current window.
    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedSymbol {
    pub symbol: String,
    pub scale: f64,
}

#[derive(Debug, Clone, Default)]
pub struct UniverseTracker {
    config: TrackerConfig,
    states: HashMap<String, SymbolState>,
}

impl UniverseTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            states: HashMap::new(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Feeds one observation. Dates must be strictly increasing per symbol.
    pub fn update(&mut self, symbol: &str, date: NaiveDate, price: f64) -> Result<(), VcpError> {
        let config = &self.config;
        self.states
            .entry(symbol.to_string())
            .or_insert_with(|| SymbolState::new(symbol, config))
            .update(date, price)
    }

    pub fn state(&self, symbol: &str) -> Option<&SymbolState> {
        self.states.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Walks the merged timeline of `series`, feeding each symbol the bars it
    /// has on each date. Returns the number of observations fed.
    pub fn replay(&mut self, series: &[PriceSeries]) -> Result<usize, VcpError> {
        let timeline = build_unified_timeline(series);
        let mut fed = 0;
        for date in &timeline {
            for s in series {
                if let Some(bar) = s.get_bar(*date) {
                    self.update(s.symbol(), bar.date, bar.close)?;
                    fed += 1;
                }
            }
        }
        debug!(
            "replayed {} observations over {} dates for {} symbols",
            fed,
            timeline.len(),
            series.len()
        );
        Ok(fed)
    }

    /// Uptrending symbols by scale, highest first, ties broken by symbol.
    pub fn ranked(&self, limit: usize) -> Vec<RankedSymbol> {
        let mut ranked: Vec<RankedSymbol> = self
            .states
            .values()
            .filter(|s| s.is_uptrend)
            .map(|s| RankedSymbol {
                symbol: s.symbol.clone(),
                scale: s.scale,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.scale
                .partial_cmp(&a.scale)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        ranked.truncate(limit);
        ranked
    }
}
