//! Core domain types and logic.

pub mod price_series;
pub mod indicator;
pub mod signal;
pub mod ledger;
pub mod profit;
pub mod strategy;
pub mod pipeline;
pub mod config_validation;
pub mod error;
