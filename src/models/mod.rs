//! Shared data models spanning the service layers.

pub mod market;
pub mod path;
pub mod recommendation;

pub use market::{Company, HistoricalPrice, Prediction, PredictionAnchor, PredictionRequest};
pub use path::{date_to_instant, PathPoint, PointKind, PriceChange, PricePoint, PriceSummary};
pub use recommendation::{Recommendation, DISCLAIMER};
