//! Projection of trade annotations into an ordered trade list.

use crate::domain::error::MacdTraderError;
use crate::domain::signal::{AnnotatedSeries, TradeAction};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub action: TradeAction,
    pub price: f64,
    pub entry_price: f64,
    pub trade_id: usize,
    pub forced: bool,
}

/// Every annotated date in ascending order. Empty when no trades fired.
pub fn extract_ledger(annotated: &AnnotatedSeries) -> Vec<LedgerEntry> {
    annotated
        .points
        .iter()
        .filter_map(|point| {
            point.annotation.map(|a| LedgerEntry {
                date: point.date,
                action: a.action,
                price: a.trade_price,
                entry_price: a.entry_price,
                trade_id: a.trade_id,
                forced: a.forced,
            })
        })
        .collect()
}

/// Like [`extract_ledger`], for callers that cannot proceed without a trade.
pub fn extract_non_empty_ledger(
    annotated: &AnnotatedSeries,
) -> Result<Vec<LedgerEntry>, MacdTraderError> {
    let ledger = extract_ledger(annotated);
    if ledger.is_empty() {
        return Err(MacdTraderError::EmptyLedger);
    }
    Ok(ledger)
}
