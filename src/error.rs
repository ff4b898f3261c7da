//! Error types shared across the crate

use thiserror::Error;

/// Failure of a market data or prediction fetch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Network failure or timeout before a response arrived
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for MarketDataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MarketDataError::Decode(err.to_string())
        } else {
            MarketDataError::Fetch(err.to_string())
        }
    }
}

/// Failure reading or writing the key-value store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
