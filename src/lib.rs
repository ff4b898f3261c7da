//! Stockcast: ticker catalog, historical prices, simulated predictions and
//! projected price paths served over HTTP.

pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod projection;
pub mod services;
pub mod storage;

pub use error::{MarketDataError, StoreError};
