//! Configuration validation.
//!
//! Validates the strategy section before a run starts. A key that is present
//! but does not parse is an error, never a silent fall back to its default.

use crate::domain::error::MacdTraderError;
use crate::domain::indicator::MaMethod;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SLOW};
use crate::domain::strategy::DEFAULT_FEE;
use crate::ports::config_port::ConfigPort;
use std::str::FromStr;

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), MacdTraderError> {
    validate_method(config)?;
    validate_periods(config)?;
    validate_fee(config)?;
    Ok(())
}

/// Reads and parses `[section] key`. `None` when the key is absent or blank.
pub fn read_parsed<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, MacdTraderError> {
    let Some(raw) = config.get_non_empty(section, key) else {
        return Ok(None);
    };
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| MacdTraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("'{}' is not a valid {}", raw, key),
        })
}

fn validate_method(config: &dyn ConfigPort) -> Result<(), MacdTraderError> {
    match config.get_string("strategy", "method") {
        None => Ok(()),
        Some(s) => s
            .parse::<MaMethod>()
            .map(|_| ())
            .map_err(|_| MacdTraderError::ConfigInvalid {
                section: "strategy".to_string(),
                key: "method".to_string(),
                reason: format!("method must be SMA or EMA, got '{}'", s.trim()),
            }),
    }
}

fn validate_periods(config: &dyn ConfigPort) -> Result<(), MacdTraderError> {
    for key in ["short_period", "long_period", "signal_period"] {
        if let Some(value) = read_parsed::<i64>(config, "strategy", key)? {
            if value < 1 {
                return Err(MacdTraderError::ConfigInvalid {
                    section: "strategy".to_string(),
                    key: key.to_string(),
                    reason: format!("{} must be at least 1", key),
                });
            }
        }
    }

    let short = read_parsed::<i64>(config, "strategy", "short_period")?
        .unwrap_or(DEFAULT_FAST as i64);
    let long =
        read_parsed::<i64>(config, "strategy", "long_period")?.unwrap_or(DEFAULT_SLOW as i64);
    if short >= long {
        return Err(MacdTraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "short_period".to_string(),
            reason: "short_period must be less than long_period".to_string(),
        });
    }
    Ok(())
}

fn validate_fee(config: &dyn ConfigPort) -> Result<(), MacdTraderError> {
    let value = read_parsed::<f64>(config, "strategy", "fee")?.unwrap_or(DEFAULT_FEE);
    if !(0.0..1.0).contains(&value) {
        return Err(MacdTraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "fee".to_string(),
            reason: "fee must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}
