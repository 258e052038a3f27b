//! Simple Moving Average indicator.
//!
//! SMA[i] = mean(P[i-n+1..=i]). Warmup: first (n-1) points are undefined.
//! A period longer than the series is not an error, it yields an all-undefined series.

use crate::domain::error::MacdTraderError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, validate_period};
use crate::domain::price_series::PriceSeries;

pub fn calculate_sma(
    prices: &PriceSeries,
    period: usize,
) -> Result<IndicatorSeries, MacdTraderError> {
    validate_period("sma period", period)?;

    let raw = prices.prices();
    let values = prices
        .points()
        .iter()
        .enumerate()
        .map(|(i, point)| IndicatorPoint {
            date: point.date,
            value: window_mean(&raw, i, period),
        })
        .collect();

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    })
}

/// Mean of the `period` values ending at `end`, if that many exist.
pub(crate) fn window_mean(values: &[f64], end: usize, period: usize) -> Option<f64> {
    if end + 1 < period {
        return None;
    }
    let window = &values[end + 1 - period..=end];
    Some(window.iter().sum::<f64>() / period as f64)
}
