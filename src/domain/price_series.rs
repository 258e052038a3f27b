//! Daily price series, the immutable input to every pipeline stage.

use crate::domain::error::MacdTraderError;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Ordered (date, price) pairs with strictly increasing dates and finite,
/// non-negative prices.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, MacdTraderError> {
        if points.is_empty() {
            return Err(MacdTraderError::InvalidPriceSeries {
                reason: "series is empty".into(),
            });
        }

        for (i, point) in points.iter().enumerate() {
            if !point.price.is_finite() || point.price < 0.0 {
                return Err(MacdTraderError::InvalidPriceSeries {
                    reason: format!(
                        "price {} on {} is not a finite non-negative number",
                        point.price, point.date
                    ),
                });
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(MacdTraderError::InvalidPriceSeries {
                    reason: format!(
                        "dates must be strictly increasing ({} follows {})",
                        point.date,
                        points[i - 1].date
                    ),
                });
            }
        }

        Ok(Self { points })
    }

    /// Builds a series of consecutive days starting at `start`.
    pub fn from_daily_prices(start: NaiveDate, prices: &[f64]) -> Result<Self, MacdTraderError> {
        let points = start
            .iter_days()
            .zip(prices)
            .map(|(date, &price)| PricePoint { date, price })
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn first(&self) -> &PricePoint {
        &self.points[0]
    }

    pub fn last(&self) -> &PricePoint {
        &self.points[self.points.len() - 1]
    }

    /// Inserts every missing calendar day, carrying the previous price forward.
    pub fn fill_missing_dates(&self) -> PriceSeries {
        let mut points: Vec<PricePoint> = Vec::with_capacity(self.points.len());
        for point in &self.points {
            if let Some(prev) = points.last().copied() {
                let PricePoint { date, price } = prev;
                for gap in date.iter_days().skip(1).take_while(|d| *d < point.date) {
                    points.push(PricePoint { date: gap, price });
                }
            }
            points.push(*point);
        }
        PriceSeries { points }
    }
}
