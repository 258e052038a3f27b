//! Strategy profit against a buy-and-hold benchmark.
//!
//! Both figures charge the fee on the exit side only. Every ledger step is
//! rounded to cents as it is accumulated, which can differ from rounding the
//! final total once. Exact half-cents round to the even cent.

use crate::domain::error::MacdTraderError;
use crate::domain::ledger::LedgerEntry;
use crate::domain::price_series::PriceSeries;
use crate::domain::signal::TradeAction;
use crate::domain::strategy::validate_fee;
use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitSummary {
    pub strategy_profit: f64,
    pub buy_hold_profit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    StrategyOutperformed,
    BuyHoldOutperformed,
    Tie,
}

impl ProfitSummary {
    pub fn verdict(&self) -> Verdict {
        match self.strategy_profit.partial_cmp(&self.buy_hold_profit) {
            Some(Ordering::Greater) => Verdict::StrategyOutperformed,
            Some(Ordering::Less) => Verdict::BuyHoldOutperformed,
            _ => Verdict::Tie,
        }
    }
}

/// Rounds the exact binary value to two decimals, ties to even.
///
/// Scaling by 100 in `f64` first would turn values such as 2.675 (stored just
/// below the tie) into an exact tie, so the rounding happens in decimal.
pub fn round_cents(value: f64) -> f64 {
    let Some(exact) = Decimal::from_f64_retain(value) else {
        return value;
    };
    let mut cents = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    cents.rescale(2);
    cents.mantissa() as f64 / 100.0
}

pub fn calculate_profit(
    ledger: &[LedgerEntry],
    prices: &PriceSeries,
    fee: f64,
) -> Result<ProfitSummary, MacdTraderError> {
    validate_fee(fee)?;

    let mut profit = 0.0;
    let mut open_buy_price: Option<f64> = None;

    for (index, entry) in ledger.iter().enumerate() {
        match entry.action {
            TradeAction::Buy => {
                open_buy_price = Some(entry.price);
                profit = round_cents(profit - round_cents(entry.price));
            }
            TradeAction::Sell => {
                if open_buy_price.take().is_none() {
                    return Err(MacdTraderError::InconsistentLedger {
                        index,
                        reason: format!("SELL on {} without an open BUY", entry.date),
                    });
                }
                profit = round_cents(profit + round_cents(entry.price * (1.0 - fee)));
            }
        }
    }

    Ok(ProfitSummary {
        strategy_profit: profit,
        buy_hold_profit: buy_hold_profit(prices, fee),
    })
}

/// Buying the first price and selling the last, net of the exit fee.
pub fn buy_hold_profit(prices: &PriceSeries, fee: f64) -> f64 {
    round_cents(prices.last().price * (1.0 - fee) - prices.first().price)
}
