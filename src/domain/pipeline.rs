//! End-to-end run: prices -> moving averages -> MACD -> trades -> profit.

use crate::domain::error::MacdTraderError;
use crate::domain::indicator::macd::calculate_macd;
use crate::domain::indicator::{IndicatorStore, MacdBundle};
use crate::domain::ledger::{LedgerEntry, extract_ledger};
use crate::domain::price_series::PriceSeries;
use crate::domain::profit::{ProfitSummary, calculate_profit};
use crate::domain::signal::{AnnotatedSeries, detect_trades};
use crate::domain::strategy::StrategyConfig;
use tracing::info;

#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub bundle: MacdBundle,
    pub annotated: AnnotatedSeries,
    pub ledger: Vec<LedgerEntry>,
    pub profit: ProfitSummary,
}

pub fn run_pipeline(
    prices: &PriceSeries,
    config: &StrategyConfig,
) -> Result<PipelineResult, MacdTraderError> {
    config.validate()?;
    info!(
        method = %config.method,
        short = config.short_period,
        long = config.long_period,
        signal = config.signal_period,
        fee = config.fee,
        points = prices.len(),
        "running macd strategy"
    );

    let mut store = IndicatorStore::new();
    store.compute_moving_average(prices, config.method, config.short_period)?;
    store.compute_moving_average(prices, config.method, config.long_period)?;

    let bundle = calculate_macd(
        &mut store,
        config.method,
        config.short_period,
        config.long_period,
        config.signal_period,
    )?;

    let annotated = detect_trades(prices, &bundle.histogram, config.fee)?;
    let ledger = extract_ledger(&annotated);
    let profit = calculate_profit(&ledger, prices, config.fee)?;

    info!(
        trades = ledger.len(),
        strategy_profit = profit.strategy_profit,
        buy_hold_profit = profit.buy_hold_profit,
        "strategy run complete"
    );

    Ok(PipelineResult {
        bundle,
        annotated,
        ledger,
        profit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::MaMethod;
    use crate::domain::signal::TradeAction;
    use chrono::NaiveDate;

    fn oscillating(n: usize) -> PriceSeries {
        let prices: Vec<f64> = (0..n)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0 + i as f64 * 0.05)
            .collect();
        PriceSeries::from_daily_prices(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), &prices)
            .unwrap()
    }

    #[test]
    fn pipeline_produces_aligned_outputs() {
        let prices = oscillating(120);
        let result = run_pipeline(&prices, &StrategyConfig::default()).unwrap();

        assert_eq!(result.bundle.macd.len(), 120);
        assert_eq!(result.bundle.signal.len(), 120);
        assert_eq!(result.bundle.histogram.len(), 120);
        assert_eq!(result.annotated.points.len(), 120);
        assert_eq!(result.bundle.method, MaMethod::Ema);
    }

    #[test]
    fn pipeline_trades_alternate_and_close() {
        let prices = oscillating(200);
        for method in [MaMethod::Sma, MaMethod::Ema] {
            let config = StrategyConfig {
                method,
                ..StrategyConfig::default()
            };
            let result = run_pipeline(&prices, &config).unwrap();

            assert!(!result.ledger.is_empty());
            for (i, entry) in result.ledger.iter().enumerate() {
                let expected = if i % 2 == 0 {
                    TradeAction::Buy
                } else {
                    TradeAction::Sell
                };
                assert_eq!(entry.action, expected);
            }
            assert_eq!(result.ledger.len() % 2, 0);
        }
    }

    #[test]
    fn pipeline_rejects_invalid_config() {
        let prices = oscillating(50);
        let config = StrategyConfig {
            fee: 1.5,
            ..StrategyConfig::default()
        };
        assert!(matches!(
            run_pipeline(&prices, &config),
            Err(MacdTraderError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn short_series_runs_without_trades() {
        let prices = oscillating(20);
        let result = run_pipeline(&prices, &StrategyConfig::default()).unwrap();
        assert!(result.ledger.is_empty());
        assert_eq!(result.profit.strategy_profit, 0.0);
    }
}
