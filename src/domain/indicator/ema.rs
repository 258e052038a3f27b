//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with the SMA of the first n values, then EMA[i] = P[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) points are undefined.

use crate::domain::error::MacdTraderError;
use crate::domain::indicator::sma::window_mean;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, validate_period};
use crate::domain::price_series::PriceSeries;

pub fn calculate_ema(
    prices: &PriceSeries,
    period: usize,
) -> Result<IndicatorSeries, MacdTraderError> {
    validate_period("ema period", period)?;

    let smoothed = seeded_ema(&prices.prices(), period);
    let values = prices
        .points()
        .iter()
        .zip(smoothed)
        .map(|(point, value)| IndicatorPoint {
            date: point.date,
            value,
        })
        .collect();

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    })
}

/// Seeded EMA over a contiguous run of values, aligned one-to-one with the input.
///
/// The seed at `period - 1` is computed exactly as the SMA computes it, so the
/// two series agree bit for bit at that index.
pub(crate) fn seeded_ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let Some(mut ema) = window_mean(values, period - 1, period) else {
        return out;
    };

    let k = smoothing_factor(period);
    out[period - 1] = Some(ema);
    for i in period..values.len() {
        ema = values[i] * k + ema * (1.0 - k);
        out[i] = Some(ema);
    }
    out
}

pub fn smoothing_factor(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}
