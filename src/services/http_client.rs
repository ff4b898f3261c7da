//! Remote market data provider over HTTP
//!
//! Talks to a backend exposing `/api/companies`, `/api/historical` and
//! `/api/predict`. Non-2xx responses become typed errors; the backend's
//! `detail` or `error` field is used as the message when present.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::MarketDataError;
use crate::models::{Company, HistoricalPrice, Prediction, PredictionRequest};

use super::market_data::MarketDataProvider;

pub struct HttpMarketDataProvider {
    base_url: String,
    client: Client,
}

impl HttpMarketDataProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MarketDataError::Fetch(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: Client) -> Result<Self, MarketDataError> {
        let parsed = Url::parse(base_url).map_err(|e| {
            MarketDataError::InvalidInput(format!("Invalid API base URL '{}': {}", base_url, e))
        })?;
        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketDataError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Fetching market data");

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            warn!(url = %url, status = status.as_u16(), message = %message, "Market data API error");
            return Err(match status {
                StatusCode::NOT_FOUND => MarketDataError::NotFound(message),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    MarketDataError::InvalidInput(message)
                }
                _ => MarketDataError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| MarketDataError::Decode(e.to_string()))
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["detail", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string())
}

#[async_trait]
impl MarketDataProvider for HttpMarketDataProvider {
    async fn fetch_companies(&self) -> Result<Vec<Company>, MarketDataError> {
        self.get_json("/api/companies", &[]).await
    }

    async fn fetch_historical(&self, ticker: &str) -> Result<Vec<HistoricalPrice>, MarketDataError> {
        let mut history: Vec<HistoricalPrice> = self
            .get_json("/api/historical", &[("ticker", ticker.to_string())])
            .await?;
        history.sort_by_key(|h| h.date);
        Ok(history)
    }

    async fn fetch_prediction(
        &self,
        ticker: &str,
        request: PredictionRequest,
    ) -> Result<Prediction, MarketDataError> {
        self.get_json(
            "/api/predict",
            &[
                ("ticker", ticker.to_string()),
                ("year", request.year.to_string()),
                ("month", request.month.to_string()),
                ("day", request.day.to_string()),
            ],
        )
        .await
    }
}
