//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values aligned with the price series
//! - `MaMethod`: Which moving average feeds the MACD

pub mod ema;
pub mod macd;
pub mod sma;
pub mod store;

pub use ema::calculate_ema;
pub use macd::{MacdBundle, histogram, macd_line, signal_line};
pub use sma::calculate_sma;
pub use store::IndicatorStore;

use crate::domain::error::MacdTraderError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// One entry of an indicator series. `None` means not enough history yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaMethod {
    Sma,
    Ema,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    MacdLine {
        method: MaMethod,
        fast: usize,
        slow: usize,
    },
    SignalLine {
        method: MaMethod,
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Histogram {
        method: MaMethod,
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(|p| p.value)
    }

    pub fn first_defined_index(&self) -> Option<usize> {
        self.values.iter().position(|p| p.value.is_some())
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|p| p.value.is_some()).count()
    }

    pub(crate) fn is_aligned_with(&self, other: &IndicatorSeries) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.date == b.date)
    }
}

impl MaMethod {
    pub fn indicator(self, period: usize) -> IndicatorType {
        match self {
            MaMethod::Sma => IndicatorType::Sma(period),
            MaMethod::Ema => IndicatorType::Ema(period),
        }
    }
}

impl IndicatorType {
    /// The averaging method of a moving-average series, `None` for MACD-derived series.
    pub fn ma_method(&self) -> Option<MaMethod> {
        match self {
            IndicatorType::Sma(_) => Some(MaMethod::Sma),
            IndicatorType::Ema(_) => Some(MaMethod::Ema),
            _ => None,
        }
    }

    pub fn period(&self) -> Option<usize> {
        match self {
            IndicatorType::Sma(p) | IndicatorType::Ema(p) => Some(*p),
            _ => None,
        }
    }
}

impl FromStr for MaMethod {
    type Err = MacdTraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SMA" => Ok(MaMethod::Sma),
            "EMA" => Ok(MaMethod::Ema),
            other => Err(MacdTraderError::invalid_parameter(
                "method",
                format!("expected SMA or EMA, got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for MaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaMethod::Sma => write!(f, "SMA"),
            MaMethod::Ema => write!(f, "EMA"),
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::MacdLine { method, fast, slow } => {
                write!(f, "MACD_{}({},{})", method, fast, slow)
            }
            IndicatorType::SignalLine {
                method,
                fast,
                slow,
                signal,
            } => write!(f, "SIGNAL_{}({},{},{})", method, fast, slow, signal),
            IndicatorType::Histogram {
                method,
                fast,
                slow,
                signal,
            } => write!(f, "HISTOGRAM_{}({},{},{})", method, fast, slow, signal),
        }
    }
}

/// Rejects a non-positive period before any computation starts.
pub fn validate_period(name: &str, period: usize) -> Result<(), MacdTraderError> {
    if period == 0 {
        return Err(MacdTraderError::invalid_parameter(name, "period must be at least 1"));
    }
    Ok(())
}
