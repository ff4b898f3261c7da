//! Caller-side cache keyed by endpoint and parameters
//!
//! Identical requests are served from memory after the first success.
//! Failures are never cached, so a later identical request retries.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::MarketDataError;
use crate::models::{Company, HistoricalPrice, Prediction, PredictionRequest};

use super::market_data::MarketDataProvider;

pub struct CachedMarketDataProvider {
    inner: Arc<dyn MarketDataProvider>,
    companies: RwLock<Option<Vec<Company>>>,
    historical: RwLock<HashMap<String, Vec<HistoricalPrice>>>,
    predictions: RwLock<HashMap<(String, PredictionRequest), Prediction>>,
}

impl CachedMarketDataProvider {
    pub fn new(inner: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            inner,
            companies: RwLock::new(None),
            historical: RwLock::new(HashMap::new()),
            predictions: RwLock::new(HashMap::new()),
        }
    }

    /// Drop every cached response
    pub async fn clear(&self) {
        *self.companies.write().await = None;
        self.historical.write().await.clear();
        self.predictions.write().await.clear();
    }
}

#[async_trait]
impl MarketDataProvider for CachedMarketDataProvider {
    async fn fetch_companies(&self) -> Result<Vec<Company>, MarketDataError> {
        if let Some(companies) = self.companies.read().await.as_ref() {
            return Ok(companies.clone());
        }
        let companies = self.inner.fetch_companies().await?;
        *self.companies.write().await = Some(companies.clone());
        Ok(companies)
    }

    async fn fetch_historical(&self, ticker: &str) -> Result<Vec<HistoricalPrice>, MarketDataError> {
        if let Some(history) = self.historical.read().await.get(ticker) {
            debug!(ticker = %ticker, "Historical cache hit");
            return Ok(history.clone());
        }
        let history = self.inner.fetch_historical(ticker).await?;
        self.historical
            .write()
            .await
            .insert(ticker.to_string(), history.clone());
        Ok(history)
    }

    async fn fetch_prediction(
        &self,
        ticker: &str,
        request: PredictionRequest,
    ) -> Result<Prediction, MarketDataError> {
        let key = (ticker.to_string(), request);
        if let Some(prediction) = self.predictions.read().await.get(&key) {
            debug!(ticker = %ticker, "Prediction cache hit");
            return Ok(prediction.clone());
        }
        let prediction = self.inner.fetch_prediction(ticker, request).await?;
        self.predictions.write().await.insert(key, prediction.clone());
        Ok(prediction)
    }
}
