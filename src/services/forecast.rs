//! Forecast orchestration: fetches the inputs a chart needs, concurrently,
//! and turns them into projected paths and recommendations.

use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::MarketDataError;
use crate::models::{
    Company, Prediction, PredictionAnchor, PredictionRequest, PriceChange, PricePoint, PriceSummary,
    Recommendation,
};
use crate::projection::{recommend, ProjectedPath, ProjectionInterpolator};

use super::market_data::MarketDataProvider;
use super::query::FetchState;

pub const DEFAULT_INVESTED_AMOUNT: f64 = 10_000.0;
pub const DEFAULT_SELL_HORIZON_DAYS: u32 = 90;
/// How many catalog entries a ranking requests predictions for
pub const RANK_CANDIDATES: usize = 60;
/// Longest extension past the anchor a caller may ask for
pub const MAX_HORIZON_DAYS: u32 = 3650;

/// Everything a projection chart renders for one ticker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionView {
    pub ticker: String,
    pub prediction: Prediction,
    pub change: PriceChange,
    /// `None` when the ticker has no history ("no data")
    pub summary: Option<PriceSummary>,
    pub horizon_days: u32,
    pub points: ProjectedPath,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationView {
    pub amount: f64,
    pub sell_horizon_days: u32,
    pub recommendation: Option<Recommendation>,
    pub projection: ProjectionView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonEntry {
    pub ticker: String,
    pub state: FetchState<ProjectionView>,
}

/// One row of the predicted-price leaderboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPrediction {
    pub rank: usize,
    pub company: Company,
    pub prediction: Prediction,
    pub change: PriceChange,
}

pub struct ForecastService {
    provider: Arc<dyn MarketDataProvider>,
    interpolator: ProjectionInterpolator,
}

impl ForecastService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, interpolator: ProjectionInterpolator) -> Self {
        Self {
            provider,
            interpolator,
        }
    }

    pub fn provider(&self) -> &Arc<dyn MarketDataProvider> {
        &self.provider
    }

    /// History and prediction are fetched concurrently; either failing
    /// fails the projection.
    pub async fn projection(
        &self,
        ticker: &str,
        request: PredictionRequest,
        horizon_days: u32,
    ) -> Result<ProjectionView, MarketDataError> {
        let ticker = normalize_ticker(ticker)?;
        request.target_date()?;
        check_horizon(horizon_days)?;

        let (historical, prediction) = tokio::try_join!(
            self.provider.fetch_historical(&ticker),
            self.provider.fetch_prediction(&ticker, request),
        )?;

        let anchor = prediction
            .anchor()
            .map_err(|e| MarketDataError::Decode(format!("Invalid prediction for {}: {}", ticker, e)))?;
        let points: Vec<PricePoint> = historical.iter().map(PricePoint::from).collect();

        Ok(self.build_view(ticker, prediction, &anchor, &points, horizon_days))
    }

    fn build_view(
        &self,
        ticker: String,
        prediction: Prediction,
        anchor: &PredictionAnchor,
        historical: &[PricePoint],
        horizon_days: u32,
    ) -> ProjectionView {
        let mut rng = rand::thread_rng();
        let path = self
            .interpolator
            .project(historical, Some(anchor), horizon_days, &mut rng);

        ProjectionView {
            ticker,
            change: PriceChange::from(&prediction),
            summary: PriceSummary::from_prices(historical.iter().map(|p| p.price)),
            prediction,
            horizon_days,
            points: path,
        }
    }

    /// Projection extended by the sell horizon, then the buy/sell heuristic
    pub async fn recommendation(
        &self,
        ticker: &str,
        request: PredictionRequest,
        amount: f64,
        sell_horizon_days: u32,
    ) -> Result<RecommendationView, MarketDataError> {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(MarketDataError::InvalidInput(
                "Investment amount must be positive".to_string(),
            ));
        }
        let sell_horizon_days = sell_horizon_days.max(1);
        check_horizon(sell_horizon_days)?;

        let projection = self.projection(ticker, request, sell_horizon_days).await?;
        let anchor = projection
            .prediction
            .anchor()
            .map_err(|e| MarketDataError::Decode(e.to_string()))?;
        let recommendation = recommend(
            projection.points.points(),
            &anchor,
            amount,
            sell_horizon_days,
        );

        Ok(RecommendationView {
            amount,
            sell_horizon_days,
            recommendation,
            projection,
        })
    }

    /// Projections for several tickers to the same date. Each ticker keeps
    /// its own ready/failed state; one failure does not sink the others.
    pub async fn compare(
        &self,
        tickers: &[String],
        request: PredictionRequest,
    ) -> Result<Vec<ComparisonEntry>, MarketDataError> {
        if tickers.is_empty() {
            return Err(MarketDataError::InvalidInput(
                "At least one ticker is required".to_string(),
            ));
        }
        request.target_date()?;

        let entries = join_all(tickers.iter().map(|ticker| async move {
            let state = self.projection(ticker, request, 0).await.into();
            ComparisonEntry {
                ticker: ticker.clone(),
                state,
            }
        }))
        .await;

        info!(
            tickers = tickers.len(),
            ready = entries.iter().filter(|e| e.state.ready().is_some()).count(),
            "Comparison built"
        );
        Ok(entries)
    }

    /// Predictions for the first [`RANK_CANDIDATES`] catalog entries, highest
    /// predicted price first. Tickers whose prediction fails are left out.
    pub async fn rank(
        &self,
        request: PredictionRequest,
    ) -> Result<Vec<RankedPrediction>, MarketDataError> {
        request.target_date()?;
        let companies = self.provider.fetch_companies().await?;

        let candidates = companies.into_iter().take(RANK_CANDIDATES);
        let results = join_all(candidates.map(|company| async move {
            let result = self.provider.fetch_prediction(&company.ticker, request).await;
            (company, result)
        }))
        .await;

        let mut ranked: Vec<(Company, Prediction)> = results
            .into_iter()
            .filter_map(|(company, result)| match result {
                Ok(prediction) => Some((company, prediction)),
                Err(e) => {
                    debug!(ticker = %company.ticker, error = %e, "Dropping ticker from ranking");
                    None
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.1.predicted_price.total_cmp(&a.1.predicted_price));

        info!(ranked = ranked.len(), "Ranking built");
        Ok(ranked
            .into_iter()
            .enumerate()
            .map(|(idx, (company, prediction))| RankedPrediction {
                rank: idx + 1,
                change: PriceChange::from(&prediction),
                company,
                prediction,
            })
            .collect())
    }
}

fn check_horizon(days: u32) -> Result<(), MarketDataError> {
    if days > MAX_HORIZON_DAYS {
        return Err(MarketDataError::InvalidInput(format!(
            "Horizon must be at most {} days, got {}",
            MAX_HORIZON_DAYS, days
        )));
    }
    Ok(())
}

fn normalize_ticker(ticker: &str) -> Result<String, MarketDataError> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(MarketDataError::InvalidInput("A ticker is required".to_string()));
    }
    Ok(ticker.to_string())
}
