//! Computed indicator series keyed by `IndicatorType`.

use crate::domain::error::MacdTraderError;
use crate::domain::indicator::{
    IndicatorSeries, IndicatorType, MaMethod, calculate_ema, calculate_sma,
};
use crate::domain::price_series::PriceSeries;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct IndicatorStore {
    series: HashMap<IndicatorType, IndicatorSeries>,
}

impl IndicatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compute_moving_average(
        &mut self,
        prices: &PriceSeries,
        method: MaMethod,
        period: usize,
    ) -> Result<&IndicatorSeries, MacdTraderError> {
        let series = match method {
            MaMethod::Sma => calculate_sma(prices, period)?,
            MaMethod::Ema => calculate_ema(prices, period)?,
        };
        debug!(
            indicator = %series.indicator_type,
            defined = series.defined_count(),
            "computed moving average"
        );
        let key = series.indicator_type.clone();
        self.series.insert(key.clone(), series);
        Ok(&self.series[&key])
    }

    pub fn insert(&mut self, series: IndicatorSeries) {
        self.series.insert(series.indicator_type.clone(), series);
    }

    pub fn get(&self, key: &IndicatorType) -> Option<&IndicatorSeries> {
        self.series.get(key)
    }

    /// Looks up a series a later stage depends on.
    pub fn require(
        &self,
        key: &IndicatorType,
        stage: &str,
    ) -> Result<&IndicatorSeries, MacdTraderError> {
        self.series
            .get(key)
            .ok_or_else(|| MacdTraderError::MissingInput {
                stage: stage.to_string(),
                input: key.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
