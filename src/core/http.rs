//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::config::{self, ProjectionConfig};
use crate::error::{MarketDataError, StoreError};
use crate::metrics::Metrics;
use crate::models::{Company, HistoricalPrice, Prediction, PredictionRequest};
use crate::projection::ProjectionInterpolator;
use crate::services::forecast::{DEFAULT_INVESTED_AMOUNT, DEFAULT_SELL_HORIZON_DAYS};
use crate::services::{
    provider_from_env, CachedMarketDataProvider, ComparisonEntry, ForecastService, ProjectionView,
    RankedPrediction, RecommendationView,
};
use crate::storage::{FavoritesStore, JsonFileStore};

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub forecast: Arc<ForecastService>,
    pub favorites: Arc<FavoritesStore>,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Error body returned by every API route: `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<MarketDataError> for ApiError {
    fn from(err: MarketDataError) -> Self {
        let status = match &err {
            MarketDataError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            MarketDataError::NotFound(_) => StatusCode::NOT_FOUND,
            MarketDataError::Fetch(_) | MarketDataError::Api { .. } | MarketDataError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "Request failed");
        } else {
            warn!(status = %self.status, error = %self.message, "Request rejected");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "stockcast-api"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Deserialize)]
struct TickerQuery {
    ticker: String,
}

#[derive(Debug, Deserialize)]
struct PredictQuery {
    ticker: String,
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProjectionQuery {
    ticker: String,
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
    horizon_days: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RecommendationQuery {
    ticker: String,
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
    amount: Option<f64>,
    sell_horizon_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct DateQuery {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CompareQuery {
    tickers: String,
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
}

/// Month and day default to 1 when omitted
fn date_request(year: i32, month: Option<u32>, day: Option<u32>) -> PredictionRequest {
    PredictionRequest::new(year, month.unwrap_or(1), day.unwrap_or(1))
}

fn required_ticker(ticker: &str) -> Result<&str, ApiError> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(ApiError::bad_request("Query parameter 'ticker' is required"));
    }
    Ok(ticker)
}

async fn list_companies(State(state): State<AppState>) -> ApiResult<Vec<Company>> {
    let companies = state.forecast.provider().fetch_companies().await?;
    Ok(Json(companies))
}

async fn get_historical(
    State(state): State<AppState>,
    Query(params): Query<TickerQuery>,
) -> ApiResult<Vec<HistoricalPrice>> {
    let ticker = required_ticker(&params.ticker)?;
    let history = state.forecast.provider().fetch_historical(ticker).await?;
    Ok(Json(history))
}

async fn get_prediction(
    State(state): State<AppState>,
    Query(params): Query<PredictQuery>,
) -> ApiResult<Prediction> {
    let ticker = required_ticker(&params.ticker)?;
    let request = date_request(params.year, params.month, params.day);
    request.target_date()?;
    let prediction = state
        .forecast
        .provider()
        .fetch_prediction(ticker, request)
        .await?;
    Ok(Json(prediction))
}

async fn get_projection(
    State(state): State<AppState>,
    Query(params): Query<ProjectionQuery>,
) -> ApiResult<ProjectionView> {
    let ticker = required_ticker(&params.ticker)?;
    let request = date_request(params.year, params.month, params.day);
    let view = state
        .forecast
        .projection(ticker, request, params.horizon_days.unwrap_or(0))
        .await?;
    state.metrics.projections_generated_total.inc();
    Ok(Json(view))
}

async fn get_recommendation(
    State(state): State<AppState>,
    Query(params): Query<RecommendationQuery>,
) -> ApiResult<RecommendationView> {
    let ticker = required_ticker(&params.ticker)?;
    let sell_horizon_days = params
        .sell_horizon_days
        .map(|days| u32::try_from(days.max(1)).unwrap_or(u32::MAX))
        .unwrap_or(DEFAULT_SELL_HORIZON_DAYS);
    let view = state
        .forecast
        .recommendation(
            ticker,
            date_request(params.year, params.month, params.day),
            params.amount.unwrap_or(DEFAULT_INVESTED_AMOUNT),
            sell_horizon_days,
        )
        .await?;
    state.metrics.projections_generated_total.inc();
    Ok(Json(view))
}

async fn compare_tickers(
    State(state): State<AppState>,
    Query(params): Query<CompareQuery>,
) -> ApiResult<Vec<ComparisonEntry>> {
    let tickers: Vec<String> = params
        .tickers
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    let request = date_request(params.year, params.month, params.day);
    let entries = state.forecast.compare(&tickers, request).await?;
    let ready = entries.iter().filter(|e| e.state.ready().is_some()).count();
    state.metrics.projections_generated_total.inc_by(ready as u64);
    Ok(Json(entries))
}

async fn rank_predictions(
    State(state): State<AppState>,
    Query(params): Query<DateQuery>,
) -> ApiResult<Vec<RankedPrediction>> {
    let request = date_request(params.year, params.month, params.day);
    let ranked = state.forecast.rank(request).await?;
    Ok(Json(ranked))
}

/// Favorite tickers plus their catalog entries, in catalog order
async fn list_favorites(State(state): State<AppState>) -> ApiResult<Value> {
    let favorites = state.favorites.list()?;
    let companies: Vec<Company> = state
        .forecast
        .provider()
        .fetch_companies()
        .await?
        .into_iter()
        .filter(|company| favorites.contains(&company.ticker))
        .collect();
    Ok(Json(json!({ "favorites": favorites, "companies": companies })))
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> ApiResult<Value> {
    let ticker = required_ticker(&ticker)?;
    let favorite = state.favorites.toggle(ticker)?;
    let favorites = state.favorites.list()?;
    Ok(Json(json!({
        "ticker": ticker,
        "favorite": favorite,
        "favorites": favorites
    })))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/companies", get(list_companies))
        .route("/api/historical", get(get_historical))
        .route("/api/predict", get(get_prediction))
        .route("/api/projection", get(get_projection))
        .route("/api/recommendation", get(get_recommendation))
        .route("/api/compare", get(compare_tickers))
        .route("/api/rank", get(rank_predictions))
        .route("/api/favorites", get(list_favorites))
        .route("/api/favorites/{ticker}", post(toggle_favorite))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Build state from the environment and serve until `shutdown` resolves
pub async fn start_server<F>(port: u16, shutdown: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics = Arc::new(Metrics::new()?);
    let start_time = Arc::new(Instant::now());

    let provider = Arc::new(CachedMarketDataProvider::new(provider_from_env()?));
    let forecast = Arc::new(ForecastService::new(
        provider,
        ProjectionInterpolator::new(ProjectionConfig::from_env()),
    ));

    let favorites_path = config::get_favorites_path();
    info!(path = %favorites_path.display(), "Favorites store");
    let favorites = Arc::new(FavoritesStore::new(Arc::new(JsonFileStore::new(
        favorites_path,
    ))));

    let state = AppState {
        health: Arc::new(RwLock::new(HealthStatus::default())),
        metrics,
        start_time,
        forecast,
        favorites,
    };
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("HTTP server drained");

    Ok(())
}
