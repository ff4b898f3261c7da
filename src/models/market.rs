//! Wire and domain models for the catalog, price history and predictions

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::MarketDataError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub ticker: String,
    pub name: String,
}

impl Company {
    pub fn new(ticker: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            name: name.into(),
        }
    }
}

/// One historical close as exchanged on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPrice {
    pub date: NaiveDate,
    #[serde(alias = "close", alias = "close_price")]
    pub price: f64,
}

impl HistoricalPrice {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

fn default_one() -> u32 {
    1
}

/// Calendar date a prediction is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub year: i32,
    #[serde(default = "default_one")]
    pub month: u32,
    #[serde(default = "default_one")]
    pub day: u32,
}

impl PredictionRequest {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month(), date.day())
    }

    pub fn target_date(&self) -> Result<NaiveDate, MarketDataError> {
        if !(1..=12).contains(&self.month) {
            return Err(MarketDataError::InvalidInput(
                "Month must be between 1 and 12".to_string(),
            ));
        }
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            MarketDataError::InvalidInput(format!(
                "Day {} is not valid for {}-{:02}",
                self.day, self.year, self.month
            ))
        })
    }

    /// Target date, rejecting dates before `today`
    pub fn validate(&self, today: NaiveDate) -> Result<NaiveDate, MarketDataError> {
        let target = self.target_date()?;
        if target < today {
            return Err(MarketDataError::InvalidInput(
                "Cannot predict for past dates".to_string(),
            ));
        }
        Ok(target)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub ticker: String,
    pub year: i32,
    #[serde(default = "default_one")]
    pub month: u32,
    #[serde(default = "default_one")]
    pub day: u32,
    pub predicted_price: f64,
    pub current_price: f64,
    pub confidence: u8,
    #[serde(deserialize_with = "deserialize_created_at")]
    pub created_at: DateTime<Utc>,
}

/// Accepts RFC 3339 or an offset-less ISO timestamp (read as UTC)
fn deserialize_created_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(serde::de::Error::custom)
}

impl Prediction {
    pub fn request(&self) -> PredictionRequest {
        PredictionRequest::new(self.year, self.month, self.day)
    }

    pub fn anchor(&self) -> Result<PredictionAnchor, MarketDataError> {
        PredictionAnchor::try_from(self)
    }
}

/// Immutable future point a projected path must pass through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionAnchor {
    pub ticker: String,
    pub target_date: NaiveDate,
    pub predicted_price: f64,
    pub current_price: f64,
    pub confidence: u8,
}

impl PredictionAnchor {
    pub fn new(
        ticker: impl Into<String>,
        target_date: NaiveDate,
        predicted_price: f64,
        current_price: f64,
        confidence: u8,
    ) -> Result<Self, MarketDataError> {
        if !(predicted_price.is_finite() && predicted_price > 0.0) {
            return Err(MarketDataError::InvalidInput(format!(
                "Predicted price must be positive, got {}",
                predicted_price
            )));
        }
        if !(current_price.is_finite() && current_price > 0.0) {
            return Err(MarketDataError::InvalidInput(format!(
                "Current price must be positive, got {}",
                current_price
            )));
        }
        Ok(Self {
            ticker: ticker.into(),
            target_date,
            predicted_price,
            current_price,
            confidence: confidence.min(100),
        })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        super::path::date_to_instant(self.target_date)
    }
}

impl TryFrom<&Prediction> for PredictionAnchor {
    type Error = MarketDataError;

    fn try_from(prediction: &Prediction) -> Result<Self, Self::Error> {
        let target_date = prediction.request().target_date()?;
        PredictionAnchor::new(
            prediction.ticker.clone(),
            target_date,
            prediction.predicted_price,
            prediction.current_price,
            prediction.confidence,
        )
    }
}
