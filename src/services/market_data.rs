//! Market data provider interface and provider selection

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config;
use crate::error::MarketDataError;
use crate::models::{Company, HistoricalPrice, Prediction, PredictionRequest};

use super::http_client::HttpMarketDataProvider;
use super::mock::MockMarketDataProvider;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Catalog of tickers that can be browsed
    async fn fetch_companies(&self) -> Result<Vec<Company>, MarketDataError>;

    /// Historical closes for a ticker, ascending by date
    async fn fetch_historical(&self, ticker: &str) -> Result<Vec<HistoricalPrice>, MarketDataError>;

    /// Predicted price for a ticker on a calendar date
    async fn fetch_prediction(
        &self,
        ticker: &str,
        request: PredictionRequest,
    ) -> Result<Prediction, MarketDataError>;
}

#[async_trait]
impl<P: MarketDataProvider + ?Sized> MarketDataProvider for Arc<P> {
    async fn fetch_companies(&self) -> Result<Vec<Company>, MarketDataError> {
        (**self).fetch_companies().await
    }

    async fn fetch_historical(&self, ticker: &str) -> Result<Vec<HistoricalPrice>, MarketDataError> {
        (**self).fetch_historical(ticker).await
    }

    async fn fetch_prediction(
        &self,
        ticker: &str,
        request: PredictionRequest,
    ) -> Result<Prediction, MarketDataError> {
        (**self).fetch_prediction(ticker, request).await
    }
}

/// Remote provider when `API_BASE_URL` is set, mock generator otherwise
pub fn provider_from_env() -> Result<Arc<dyn MarketDataProvider>, MarketDataError> {
    match config::get_api_base_url() {
        Some(base_url) => {
            info!(base_url = %base_url, "Using remote market data API");
            let provider = HttpMarketDataProvider::new(&base_url, config::get_http_timeout())?;
            Ok(Arc::new(provider))
        }
        None => {
            info!("API_BASE_URL not set, using mock market data");
            let provider = MockMarketDataProvider::new().with_latency(config::get_mock_latency());
            Ok(Arc::new(provider))
        }
    }
}
