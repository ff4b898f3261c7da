//! Projected price paths and the buy/sell heuristic built on them

pub mod interpolator;
pub mod recommendation;

pub use interpolator::{ProjectedPath, ProjectionInterpolator};
pub use recommendation::recommend;
