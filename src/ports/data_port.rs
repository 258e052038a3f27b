//! Price data access port trait.

use crate::domain::error::MacdTraderError;
use crate::domain::price_series::PriceSeries;

pub trait DataPort {
    /// Loads a validated, date-ordered price series.
    fn fetch_prices(&self) -> Result<PriceSeries, MacdTraderError>;
}
