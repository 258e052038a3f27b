#![allow(dead_code)]

use chrono::NaiveDate;
use macdtrader::domain::error::MacdTraderError;
use macdtrader::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, MaMethod};
pub use macdtrader::domain::price_series::{PricePoint, PriceSeries};
use macdtrader::ports::data_port::DataPort;

pub const REFERENCE_PRICES: [f64; 12] = [
    100.0, 101.0, 102.0, 101.0, 99.0, 100.0, 102.0, 101.0, 99.0, 98.0, 100.0, 102.0,
];
pub const REFERENCE_HISTOGRAM: [f64; 12] = [
    -0.5, -0.2, 0.3, 0.5, 0.2, -0.1, -0.3, 0.2, 0.4, 0.1, -0.2, -0.4,
];

pub struct MockDataPort {
    pub prices: Option<PriceSeries>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn with_prices(prices: PriceSeries) -> Self {
        Self {
            prices: Some(prices),
            error: None,
        }
    }

    pub fn with_error(reason: &str) -> Self {
        Self {
            prices: None,
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(&self) -> Result<PriceSeries, MacdTraderError> {
        if let Some(reason) = &self.error {
            return Err(MacdTraderError::DataImport {
                reason: reason.clone(),
            });
        }
        self.prices
            .clone()
            .ok_or_else(|| MacdTraderError::DataImport {
                reason: "no prices".into(),
            })
    }
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

pub fn daily_series(prices: &[f64]) -> PriceSeries {
    PriceSeries::from_daily_prices(start_date(), prices).unwrap()
}

/// A deterministic trending sine wave, long enough for default MACD parameters.
pub fn wave_prices(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + (t * 0.25).sin() * 6.0 + (t * 0.07).cos() * 3.0 + t * 0.02
        })
        .collect()
}

/// Wraps raw values as a histogram series aligned with `prices`.
pub fn histogram_for(prices: &PriceSeries, values: &[Option<f64>]) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::Histogram {
            method: MaMethod::Ema,
            fast: 12,
            slow: 26,
            signal: 9,
        },
        values: prices
            .points()
            .iter()
            .zip(values)
            .map(|(p, &value)| IndicatorPoint {
                date: p.date,
                value,
            })
            .collect(),
    }
}

pub fn csv_content(prices: &[f64]) -> String {
    let mut out = String::from("Date,Close\n");
    for (date, price) in start_date().iter_days().zip(prices) {
        out.push_str(&format!("{},{}\n", date.format("%Y-%m-%d"), price));
    }
    out
}
