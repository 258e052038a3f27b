//! Strategy parameters for a MACD crossover run.

use crate::domain::error::MacdTraderError;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::{MaMethod, validate_period};

pub const DEFAULT_FEE: f64 = 0.00125;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub method: MaMethod,
    pub short_period: usize,
    pub long_period: usize,
    pub signal_period: usize,
    /// Fraction of the sale price paid on exit.
    pub fee: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            method: MaMethod::Ema,
            short_period: DEFAULT_FAST,
            long_period: DEFAULT_SLOW,
            signal_period: DEFAULT_SIGNAL,
            fee: DEFAULT_FEE,
        }
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<(), MacdTraderError> {
        validate_period("short_period", self.short_period)?;
        validate_period("long_period", self.long_period)?;
        validate_period("signal_period", self.signal_period)?;
        if self.short_period >= self.long_period {
            return Err(MacdTraderError::invalid_parameter(
                "short_period",
                format!(
                    "short_period ({}) must be less than long_period ({})",
                    self.short_period, self.long_period
                ),
            ));
        }
        validate_fee(self.fee)
    }
}

pub fn validate_fee(fee: f64) -> Result<(), MacdTraderError> {
    if !(0.0..1.0).contains(&fee) {
        return Err(MacdTraderError::invalid_parameter(
            "fee",
            format!("fee must be in [0, 1), got {fee}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = StrategyConfig::default();
        assert_eq!(c.method, MaMethod::Ema);
        assert_eq!(c.short_period, 12);
        assert_eq!(c.long_period, 26);
        assert_eq!(c.signal_period, 9);
        assert!((c.fee - 0.00125).abs() < f64::EPSILON);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_period_is_invalid() {
        let c = StrategyConfig {
            signal_period: 0,
            ..StrategyConfig::default()
        };
        match c.validate() {
            Err(MacdTraderError::InvalidParameter { name, .. }) => {
                assert_eq!(name, "signal_period")
            }
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn short_must_be_below_long() {
        for (short, long) in [(26, 12), (12, 12)] {
            let c = StrategyConfig {
                short_period: short,
                long_period: long,
                ..StrategyConfig::default()
            };
            assert!(matches!(
                c.validate(),
                Err(MacdTraderError::InvalidParameter { ref name, .. }) if name == "short_period"
            ));
        }
    }

    #[test]
    fn fee_bounds() {
        assert!(validate_fee(0.0).is_ok());
        assert!(validate_fee(0.999).is_ok());
        assert!(validate_fee(1.0).is_err());
        assert!(validate_fee(-0.01).is_err());
        assert!(validate_fee(f64::NAN).is_err());
    }
}
