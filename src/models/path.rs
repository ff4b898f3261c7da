//! Price points and the derived views drawn on charts

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::market::{HistoricalPrice, Prediction};

/// Calendar dates map to 00:00 UTC
pub fn date_to_instant(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

impl From<&HistoricalPrice> for PricePoint {
    fn from(historical: &HistoricalPrice) -> Self {
        Self::new(date_to_instant(historical.date), historical.price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Historical,
    Projected,
}

/// Point on a projected path, tagged for styling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub kind: PointKind,
}

impl PathPoint {
    pub fn historical(point: PricePoint) -> Self {
        Self {
            timestamp: point.timestamp,
            price: point.price,
            kind: PointKind::Historical,
        }
    }

    pub fn projected(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            timestamp,
            price,
            kind: PointKind::Projected,
        }
    }

    pub fn is_projected(&self) -> bool {
        self.kind == PointKind::Projected
    }
}

/// High / low / average shown above a chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub high: f64,
    pub low: f64,
    pub average: f64,
    pub count: usize,
}

impl PriceSummary {
    /// `None` for an empty series, which callers render as "no data"
    pub fn from_prices<I>(prices: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut high = f64::NEG_INFINITY;
        let mut low = f64::INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;
        for price in prices {
            high = high.max(price);
            low = low.min(price);
            sum += price;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        Some(Self {
            high,
            low,
            average: sum / count as f64,
            count,
        })
    }
}

/// Predicted move relative to the current price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub amount: f64,
    pub percent: f64,
    pub is_positive: bool,
}

impl From<&Prediction> for PriceChange {
    fn from(prediction: &Prediction) -> Self {
        let amount = prediction.predicted_price - prediction.current_price;
        let percent = if prediction.current_price != 0.0 {
            amount / prediction.current_price * 100.0
        } else {
            0.0
        };
        Self {
            amount,
            percent,
            is_positive: amount > 0.0,
        }
    }
}
