//! Unit tests for forecast orchestration

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use stockcast::models::{
    date_to_instant, Company, HistoricalPrice, PointKind, Prediction, PredictionRequest,
};
use stockcast::projection::ProjectionInterpolator;
use stockcast::services::forecast::{MAX_HORIZON_DAYS, RANK_CANDIDATES};
use stockcast::services::{FetchState, ForecastService, MarketDataProvider, MockMarketDataProvider};
use stockcast::MarketDataError;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn mock_service() -> ForecastService {
    let provider = MockMarketDataProvider::with_seed(42).with_reference_date(today());
    ForecastService::new(Arc::new(provider), ProjectionInterpolator::default())
}

/// Backend with no history and a fixed prediction
struct NoHistoryProvider;

#[async_trait]
impl MarketDataProvider for NoHistoryProvider {
    async fn fetch_companies(&self) -> Result<Vec<Company>, MarketDataError> {
        Ok(vec![Company::new("NEWCO", "Newly Listed Limited")])
    }

    async fn fetch_historical(&self, _ticker: &str) -> Result<Vec<HistoricalPrice>, MarketDataError> {
        Ok(Vec::new())
    }

    async fn fetch_prediction(
        &self,
        ticker: &str,
        request: PredictionRequest,
    ) -> Result<Prediction, MarketDataError> {
        Ok(Prediction {
            ticker: ticker.to_string(),
            year: request.year,
            month: request.month,
            day: request.day,
            predicted_price: 250.0,
            current_price: 200.0,
            confidence: 75,
            created_at: Utc::now(),
        })
    }
}

/// Catalog of `size` tickers; `FAIL*` tickers error, the rest predict a fixed price
struct LeaderboardProvider {
    size: usize,
}

impl LeaderboardProvider {
    fn price_for(ticker: &str) -> f64 {
        match ticker {
            "ALPHA" => 120.0,
            "BETA" => 480.0,
            "GAMMA" => 300.0,
            _ => 50.0,
        }
    }
}

#[async_trait]
impl MarketDataProvider for LeaderboardProvider {
    async fn fetch_companies(&self) -> Result<Vec<Company>, MarketDataError> {
        let named = ["ALPHA", "FAIL1", "BETA", "GAMMA", "FAIL2"];
        let mut companies: Vec<Company> = named
            .iter()
            .map(|t| Company::new(*t, format!("{} Limited", t)))
            .collect();
        companies.extend((named.len()..self.size).map(|i| Company::new(format!("T{}", i), "Filler")));
        companies.truncate(self.size);
        Ok(companies)
    }

    async fn fetch_historical(&self, _ticker: &str) -> Result<Vec<HistoricalPrice>, MarketDataError> {
        Ok(Vec::new())
    }

    async fn fetch_prediction(
        &self,
        ticker: &str,
        request: PredictionRequest,
    ) -> Result<Prediction, MarketDataError> {
        if ticker.starts_with("FAIL") {
            return Err(MarketDataError::Fetch("timed out".to_string()));
        }
        Ok(Prediction {
            ticker: ticker.to_string(),
            year: request.year,
            month: request.month,
            day: request.day,
            predicted_price: Self::price_for(ticker),
            current_price: 100.0,
            confidence: 80,
            created_at: Utc::now(),
        })
    }
}

#[tokio::test]
async fn test_projection_ends_at_predicted_price() {
    let service = mock_service();
    let request = PredictionRequest::new(2027, 4, 1);

    let view = service.projection("RELIANCE", request, 0).await.unwrap();

    let anchor_ts = date_to_instant(NaiveDate::from_ymd_opt(2027, 4, 1).unwrap());
    let last = view.points.points().last().unwrap();
    assert_eq!(last.timestamp, anchor_ts);
    assert_eq!(last.price, view.prediction.predicted_price);
    assert_eq!(last.kind, PointKind::Projected);

    let summary = view.summary.unwrap();
    assert_eq!(summary.count, 261);
    assert!(summary.low <= summary.average && summary.average <= summary.high);
    assert_eq!(
        view.change.amount,
        view.prediction.predicted_price - view.prediction.current_price
    );
}

#[tokio::test]
async fn test_projection_trims_ticker() {
    let view = mock_service()
        .projection("  TCS ", PredictionRequest::new(2027, 1, 1), 0)
        .await
        .unwrap();
    assert_eq!(view.ticker, "TCS");
}

#[tokio::test]
async fn test_projection_without_history_is_single_anchor_point() {
    let service = ForecastService::new(Arc::new(NoHistoryProvider), ProjectionInterpolator::default());

    let view = service
        .projection("NEWCO", PredictionRequest::new(2027, 2, 1), 30)
        .await
        .unwrap();

    assert!(view.summary.is_none());
    assert_eq!(view.points.len(), 1);
    assert_eq!(view.points.points()[0].price, 250.0);
    assert!(view.change.is_positive);
    assert_eq!(view.change.percent, 25.0);
}

#[tokio::test]
async fn test_invalid_calendar_date_is_rejected() {
    let err = mock_service()
        .projection("TCS", PredictionRequest::new(2027, 2, 30), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::InvalidInput(_)));
}

#[tokio::test]
async fn test_past_date_is_rejected_by_provider() {
    let err = mock_service()
        .projection("TCS", PredictionRequest::new(2020, 1, 1), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::InvalidInput(_)));
}

#[tokio::test]
async fn test_unknown_ticker_fails_projection() {
    let err = mock_service()
        .projection("NOPE", PredictionRequest::new(2027, 1, 1), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::NotFound(_)));
}

#[tokio::test]
async fn test_recommendation_uses_sell_horizon() {
    let view = mock_service()
        .recommendation("HDFCBANK", PredictionRequest::new(2027, 3, 1), 10_000.0, 45)
        .await
        .unwrap();

    assert_eq!(view.sell_horizon_days, 45);
    assert_eq!(view.projection.horizon_days, 45);
    let rec = view.recommendation.unwrap();
    let anchor_ts = date_to_instant(NaiveDate::from_ymd_opt(2027, 3, 1).unwrap());
    assert!(rec.buy.timestamp <= anchor_ts);
    assert!(rec.sell.timestamp >= anchor_ts);
    assert_eq!(rec.quantity, (10_000.0 / rec.buy.price).floor() as u64);
}

#[tokio::test]
async fn test_recommendation_clamps_zero_horizon() {
    let view = mock_service()
        .recommendation("ITC", PredictionRequest::new(2027, 3, 1), 5_000.0, 0)
        .await
        .unwrap();
    assert_eq!(view.sell_horizon_days, 1);
}

#[tokio::test]
async fn test_recommendation_rejects_non_positive_amount() {
    let service = mock_service();
    for amount in [0.0, -100.0, f64::NAN] {
        let err = service
            .recommendation("TCS", PredictionRequest::new(2027, 3, 1), amount, 30)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidInput(_)));
    }
}

#[tokio::test]
async fn test_compare_keeps_per_ticker_state() {
    let tickers = vec!["TCS".to_string(), "NOPE".to_string(), "INFY".to_string()];
    let entries = mock_service()
        .compare(&tickers, PredictionRequest::new(2027, 1, 1))
        .await
        .unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].ticker, "TCS");
    assert!(entries[0].state.ready().is_some());
    assert!(matches!(entries[1].state, FetchState::Failed(_)));
    assert!(entries[2].state.ready().is_some());
}

#[tokio::test]
async fn test_compare_requires_tickers() {
    let err = mock_service()
        .compare(&[], PredictionRequest::new(2027, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::InvalidInput(_)));
}

#[tokio::test]
async fn test_projection_rejects_horizon_beyond_limit() {
    let err = mock_service()
        .projection("TCS", PredictionRequest::new(2027, 1, 1), 4_000_000_000)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::InvalidInput(_)));

    let view = mock_service()
        .projection("TCS", PredictionRequest::new(2027, 1, 1), MAX_HORIZON_DAYS)
        .await
        .unwrap();
    assert_eq!(view.horizon_days, MAX_HORIZON_DAYS);
}

#[tokio::test]
async fn test_recommendation_rejects_sell_horizon_beyond_limit() {
    let err = mock_service()
        .recommendation("TCS", PredictionRequest::new(2027, 1, 1), 1_000.0, u32::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::InvalidInput(_)));
}

#[tokio::test]
async fn test_rank_orders_by_predicted_price_and_skips_failures() {
    let service = ForecastService::new(
        Arc::new(LeaderboardProvider { size: 5 }),
        ProjectionInterpolator::default(),
    );

    let ranked = service.rank(PredictionRequest::new(2027, 5, 1)).await.unwrap();

    let tickers: Vec<&str> = ranked.iter().map(|r| r.company.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["BETA", "GAMMA", "ALPHA"]);
    let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
    assert_eq!(ranked[0].company.name, "BETA Limited");
    assert!((ranked[0].change.percent - 380.0).abs() < 1e-9);
    assert!(ranked[2].change.is_positive);
}

#[tokio::test]
async fn test_rank_limits_candidates() {
    let service = ForecastService::new(
        Arc::new(LeaderboardProvider { size: RANK_CANDIDATES + 15 }),
        ProjectionInterpolator::default(),
    );

    let ranked = service.rank(PredictionRequest::new(2027, 5, 1)).await.unwrap();
    // two of the candidates fail
    assert_eq!(ranked.len(), RANK_CANDIDATES - 2);
}

#[tokio::test]
async fn test_rank_with_mock_catalog() {
    let ranked = mock_service()
        .rank(PredictionRequest::new(2027, 1, 1))
        .await
        .unwrap();
    assert_eq!(ranked.len(), 40);
    for pair in ranked.windows(2) {
        assert!(pair[0].prediction.predicted_price >= pair[1].prediction.predicted_price);
    }
}

#[tokio::test]
async fn test_rank_rejects_invalid_date() {
    let err = mock_service()
        .rank(PredictionRequest::new(2027, 13, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::InvalidInput(_)));
}
