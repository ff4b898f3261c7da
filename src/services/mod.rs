//! Market data collaborators and the orchestration built on them.

pub mod cache;
pub mod forecast;
pub mod http_client;
pub mod market_data;
pub mod mock;
pub mod query;

pub use cache::CachedMarketDataProvider;
pub use forecast::{
    ComparisonEntry, ForecastService, ProjectionView, RankedPrediction, RecommendationView,
};
pub use http_client::HttpMarketDataProvider;
pub use market_data::{provider_from_env, MarketDataProvider};
pub use mock::MockMarketDataProvider;
pub use query::{FetchState, QuerySlot, QueryTicket};
