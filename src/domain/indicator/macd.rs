//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = MA(fast) - MA(slow), MA being SMA or EMA
//! Signal Line = seeded EMA(signal) of the defined MACD values
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9

use crate::domain::error::MacdTraderError;
use crate::domain::indicator::ema::seeded_ema;
use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorStore, IndicatorType, MaMethod, validate_period,
};
use tracing::debug;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

/// MACD line, signal line and histogram on one date axis.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdBundle {
    pub method: MaMethod,
    pub macd: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

/// Elementwise `fast - slow`, defined only where both inputs are.
pub fn macd_line(
    fast: &IndicatorSeries,
    slow: &IndicatorSeries,
) -> Result<IndicatorSeries, MacdTraderError> {
    let (Some(fast_method), Some(slow_method)) =
        (fast.indicator_type.ma_method(), slow.indicator_type.ma_method())
    else {
        return Err(MacdTraderError::invalid_parameter(
            "macd inputs",
            format!(
                "expected two moving averages, got {} and {}",
                fast.indicator_type, slow.indicator_type
            ),
        ));
    };
    if fast_method != slow_method {
        return Err(MacdTraderError::invalid_parameter(
            "macd inputs",
            format!(
                "moving averages must share a method, got {} and {}",
                fast.indicator_type, slow.indicator_type
            ),
        ));
    }
    ensure_aligned("macd inputs", fast, slow)?;

    let values = combine(fast, slow, |f, s| f - s);
    Ok(IndicatorSeries {
        indicator_type: IndicatorType::MacdLine {
            method: fast_method,
            fast: fast.indicator_type.period().unwrap_or_default(),
            slow: slow.indicator_type.period().unwrap_or_default(),
        },
        values,
    })
}

/// Seeded EMA of the MACD line's defined values.
///
/// The seed sits at the `period`-th defined MACD index, not the `period`-th
/// absolute index, and everything before it stays undefined.
pub fn signal_line(
    macd: &IndicatorSeries,
    period: usize,
) -> Result<IndicatorSeries, MacdTraderError> {
    validate_period("signal period", period)?;
    let IndicatorType::MacdLine { method, fast, slow } = macd.indicator_type else {
        return Err(MacdTraderError::invalid_parameter(
            "signal input",
            format!("expected a MACD line, got {}", macd.indicator_type),
        ));
    };

    let (indices, defined): (Vec<usize>, Vec<f64>) = macd
        .values
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.value.map(|v| (i, v)))
        .unzip();

    let mut values: Vec<IndicatorPoint> = macd
        .values
        .iter()
        .map(|p| IndicatorPoint {
            date: p.date,
            value: None,
        })
        .collect();
    for (index, smoothed) in indices.into_iter().zip(seeded_ema(&defined, period)) {
        values[index].value = smoothed;
    }

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::SignalLine {
            method,
            fast,
            slow,
            signal: period,
        },
        values,
    })
}

/// Elementwise `macd - signal`, undefined wherever either input is.
pub fn histogram(
    macd: &IndicatorSeries,
    signal: &IndicatorSeries,
) -> Result<IndicatorSeries, MacdTraderError> {
    let IndicatorType::SignalLine {
        method,
        fast,
        slow,
        signal: signal_period,
    } = signal.indicator_type
    else {
        return Err(MacdTraderError::invalid_parameter(
            "histogram input",
            format!("expected a signal line, got {}", signal.indicator_type),
        ));
    };
    ensure_aligned("histogram inputs", macd, signal)?;

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Histogram {
            method,
            fast,
            slow,
            signal: signal_period,
        },
        values: combine(macd, signal, |m, s| m - s),
    })
}

/// Builds the full bundle from moving averages already present in `store`.
///
/// Fails with `MissingInput` when either moving average was never computed.
/// The intermediate lines are recorded in the store as well.
pub fn calculate_macd(
    store: &mut IndicatorStore,
    method: MaMethod,
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<MacdBundle, MacdTraderError> {
    let line = {
        let fast_ma = store.require(&method.indicator(fast), "macd line")?;
        let slow_ma = store.require(&method.indicator(slow), "macd line")?;
        macd_line(fast_ma, slow_ma)?
    };
    store.insert(line.clone());

    let signal = signal_line(
        store.require(&line.indicator_type, "signal line")?,
        signal_period,
    )?;
    store.insert(signal.clone());

    let hist = histogram(
        store.require(&line.indicator_type, "histogram")?,
        store.require(&signal.indicator_type, "histogram")?,
    )?;
    store.insert(hist.clone());

    debug!(
        histogram = %hist.indicator_type,
        defined = hist.defined_count(),
        "computed macd bundle"
    );

    Ok(MacdBundle {
        method,
        macd: line,
        signal,
        histogram: hist,
    })
}

fn ensure_aligned(
    name: &str,
    a: &IndicatorSeries,
    b: &IndicatorSeries,
) -> Result<(), MacdTraderError> {
    if a.is_aligned_with(b) {
        Ok(())
    } else {
        Err(MacdTraderError::invalid_parameter(
            name,
            format!(
                "{} and {} do not share a date axis",
                a.indicator_type, b.indicator_type
            ),
        ))
    }
}

fn combine(
    a: &IndicatorSeries,
    b: &IndicatorSeries,
    op: impl Fn(f64, f64) -> f64,
) -> Vec<IndicatorPoint> {
    a.values
        .iter()
        .zip(&b.values)
        .map(|(x, y)| IndicatorPoint {
            date: x.date,
            value: x.value.zip(y.value).map(|(x, y)| op(x, y)),
        })
        .collect()
}
