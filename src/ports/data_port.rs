//! Price data access port.

use crate::domain::error::VcpError;
use crate::domain::price_series::PriceSeries;
use crate::domain::screen_config::DateRange;

pub trait DataPort {
    /// Daily closes for `symbol` within `range`, oldest first.
    fn fetch_prices(&self, symbol: &str, range: DateRange) -> Result<PriceSeries, VcpError>;

    fn list_symbols(&self) -> Result<Vec<String>, VcpError>;
}
