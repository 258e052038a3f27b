//! CSV price file adapter.
//!
//! Finds the date and price columns (explicitly named or guessed from common
//! headers), drops rows that do not coerce, orders by date and optionally
//! forward-fills calendar gaps.

use crate::domain::error::MacdTraderError;
use crate::domain::price_series::{PricePoint, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

const DATE_CANDIDATES: &[&str] = &["date", "datetime", "timestamp"];
const PRICE_CANDIDATES: &[&str] = &["price", "close", "closing price", "last"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%Y%m%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub struct CsvAdapter {
    path: PathBuf,
    date_column: Option<String>,
    price_column: Option<String>,
    fill_missing_dates: bool,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            date_column: None,
            price_column: None,
            fill_missing_dates: true,
        }
    }

    pub fn with_columns(mut self, date_column: Option<String>, price_column: Option<String>) -> Self {
        self.date_column = date_column;
        self.price_column = price_column;
        self
    }

    pub fn with_fill_missing_dates(mut self, fill: bool) -> Self {
        self.fill_missing_dates = fill;
        self
    }

    /// Parses CSV content already in memory.
    pub fn parse(&self, content: &str) -> Result<PriceSeries, MacdTraderError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| MacdTraderError::DataImport {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();

        let date_idx = find_column(&headers, self.date_column.as_deref(), DATE_CANDIDATES, "date")?;
        let price_idx =
            find_column(&headers, self.price_column.as_deref(), PRICE_CANDIDATES, "price")?;
        info!(
            date_column = &headers[date_idx],
            price_column = &headers[price_idx],
            "mapped price file columns"
        );

        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut dropped = 0usize;

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| MacdTraderError::DataImport {
                reason: format!("CSV parse error: {}", e),
            })?;

            let Some(date) = record.get(date_idx).and_then(parse_date) else {
                debug!(row, "dropping row with unparseable date");
                dropped += 1;
                continue;
            };
            let Some(price) = record.get(price_idx).and_then(parse_price) else {
                debug!(row, %date, "dropping row with unusable price");
                dropped += 1;
                continue;
            };

            if by_date.insert(date, price).is_some() {
                warn!(%date, "duplicate date, keeping the later row");
            }
        }

        if dropped > 0 {
            warn!(dropped, "dropped rows that could not be coerced");
        }
        if by_date.is_empty() {
            return Err(MacdTraderError::DataImport {
                reason: "no usable price rows".into(),
            });
        }

        let points = by_date
            .into_iter()
            .map(|(date, price)| PricePoint { date, price })
            .collect();
        let series = PriceSeries::new(points)?;

        if !self.fill_missing_dates {
            return Ok(series);
        }
        let filled = series.fill_missing_dates();
        if filled.len() > series.len() {
            warn!(
                filled = filled.len() - series.len(),
                "forward-filled missing calendar days"
            );
        }
        Ok(filled)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_prices(&self) -> Result<PriceSeries, MacdTraderError> {
        let content = fs::read_to_string(&self.path).map_err(|e| MacdTraderError::DataImport {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        self.parse(&content)
    }
}

fn find_column(
    headers: &csv::StringRecord,
    explicit: Option<&str>,
    candidates: &[&str],
    kind: &str,
) -> Result<usize, MacdTraderError> {
    let matches = |header: &str, name: &str| header.trim().eq_ignore_ascii_case(name.trim());

    let found = match explicit {
        Some(name) => headers.iter().position(|h| matches(h, name)),
        None => headers
            .iter()
            .position(|h| candidates.iter().any(|c| matches(h, c))),
    };

    found.ok_or_else(|| MacdTraderError::DataImport {
        reason: match explicit {
            Some(name) => format!("{} column '{}' not found", kind, name),
            None => format!(
                "could not find a {} column (looked for {})",
                kind,
                candidates.join(", ")
            ),
        },
    })
}

/// Accepts plain dates in a few common layouts, or a timestamp truncated to its date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn parse_price(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}
