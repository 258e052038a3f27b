//! MACD histogram crossover detector.
//!
//! A single forward pass over the histogram with two states. A BUY fires when
//! the histogram crosses from negative to positive while flat; a SELL fires on
//! the opposite crossing while long, but only if the sale clears the entry
//! price net of the fee. A position still open at the end of the series is
//! closed on the final bar regardless of profit.

use crate::domain::error::MacdTraderError;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;
use crate::domain::strategy::validate_fee;
use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => f.pad("BUY"),
            TradeAction::Sell => f.pad("SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeAnnotation {
    pub action: TradeAction,
    pub trade_price: f64,
    pub entry_price: f64,
    /// Number of positions closed before this one.
    pub trade_id: usize,
    /// Set on the end-of-series closing SELL.
    pub forced: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub annotation: Option<TradeAnnotation>,
}

/// Price series with at most one trade annotation per date.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSeries {
    pub points: Vec<AnnotatedPoint>,
}

impl AnnotatedSeries {
    pub fn annotations(&self) -> impl Iterator<Item = (usize, &TradeAnnotation)> {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.annotation.as_ref().map(|a| (i, a)))
    }

    pub fn annotated_indices(&self) -> Vec<usize> {
        self.annotations().map(|(i, _)| i).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PositionState {
    AwaitingBuy,
    AwaitingSell { last_buy_price: f64 },
}

pub fn detect_trades(
    prices: &PriceSeries,
    histogram: &IndicatorSeries,
    fee: f64,
) -> Result<AnnotatedSeries, MacdTraderError> {
    validate_fee(fee)?;
    if !matches!(histogram.indicator_type, IndicatorType::Histogram { .. }) {
        return Err(MacdTraderError::invalid_parameter(
            "histogram",
            format!("expected a MACD histogram, got {}", histogram.indicator_type),
        ));
    }
    if histogram.len() != prices.len()
        || prices
            .points()
            .iter()
            .zip(&histogram.values)
            .any(|(p, h)| p.date != h.date)
    {
        return Err(MacdTraderError::invalid_parameter(
            "histogram",
            format!(
                "{} is not aligned with the price series ({} vs {} points)",
                histogram.indicator_type,
                histogram.len(),
                prices.len()
            ),
        ));
    }

    let mut points: Vec<AnnotatedPoint> = prices
        .points()
        .iter()
        .map(|p| AnnotatedPoint {
            date: p.date,
            price: p.price,
            annotation: None,
        })
        .collect();
    let last = points.len() - 1;

    let mut state = PositionState::AwaitingBuy;
    let mut trade_id = 0usize;

    for i in 1..points.len() {
        let (Some(prev), Some(curr)) = (histogram.value(i - 1), histogram.value(i)) else {
            continue;
        };
        let price = points[i].price;

        match state {
            PositionState::AwaitingBuy if prev < 0.0 && curr > 0.0 => {
                if i == last {
                    debug!(date = %points[i].date, "ignoring buy crossover on the final bar");
                    continue;
                }
                points[i].annotation = Some(TradeAnnotation {
                    action: TradeAction::Buy,
                    trade_price: price,
                    entry_price: price,
                    trade_id,
                    forced: false,
                });
                debug!(date = %points[i].date, price, trade_id, "buy");
                state = PositionState::AwaitingSell {
                    last_buy_price: price,
                };
            }
            PositionState::AwaitingSell { last_buy_price } if prev > 0.0 && curr < 0.0 => {
                if price * (1.0 - fee) > last_buy_price {
                    points[i].annotation = Some(TradeAnnotation {
                        action: TradeAction::Sell,
                        trade_price: price,
                        entry_price: last_buy_price,
                        trade_id,
                        forced: false,
                    });
                    debug!(date = %points[i].date, price, entry = last_buy_price, trade_id, "sell");
                    trade_id += 1;
                    state = PositionState::AwaitingBuy;
                } else {
                    debug!(
                        date = %points[i].date,
                        price,
                        entry = last_buy_price,
                        "holding through unprofitable sell crossover"
                    );
                }
            }
            _ => {}
        }
    }

    if let PositionState::AwaitingSell { last_buy_price } = state {
        let final_point = &mut points[last];
        warn!(
            date = %final_point.date,
            price = final_point.price,
            entry = last_buy_price,
            "closing open position at end of series"
        );
        final_point.annotation = Some(TradeAnnotation {
            action: TradeAction::Sell,
            trade_price: final_point.price,
            entry_price: last_buy_price,
            trade_id,
            forced: true,
        });
    }

    Ok(AnnotatedSeries { points })
}
