//! Environment-driven configuration
//!
//! Every setting has a default so the server starts with an empty
//! environment; `.env` is loaded by the binary before anything here runs.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_FAVORITES_PATH: &str = "favorites.json";

/// Current deployment environment (`sandbox` unless `ENVIRONMENT` is set)
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn get_port() -> u16 {
    parse_var("PORT").unwrap_or(DEFAULT_PORT)
}

/// Base URL of the remote market data API. `None` selects the mock generator.
pub fn get_api_base_url() -> Option<String> {
    env::var("API_BASE_URL")
        .ok()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

pub fn get_http_timeout() -> Duration {
    Duration::from_secs(parse_var("HTTP_TIMEOUT_SECONDS").unwrap_or(DEFAULT_HTTP_TIMEOUT_SECONDS))
}

pub fn get_mock_latency() -> Duration {
    Duration::from_millis(parse_var("MOCK_LATENCY_MS").unwrap_or(0))
}

pub fn get_favorites_path() -> PathBuf {
    env::var("FAVORITES_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_FAVORITES_PATH))
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.trim().parse().ok())
}

/// Tuning for the projection interpolator
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    /// Lower bound on synthesized steps
    pub min_steps: usize,
    /// Upper bound on synthesized steps
    pub max_steps: usize,
    /// Scales per-step log-return volatility into noise
    pub noise_multiplier: f64,
    /// No synthesized price goes below this value
    pub price_floor: f64,
    /// Relative drift applied across the beyond-anchor extension
    pub drift: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            min_steps: 8,
            max_steps: 60,
            noise_multiplier: 2.0,
            price_floor: 1.0,
            drift: 0.002,
        }
    }
}

impl ProjectionConfig {
    /// Defaults overridden by `PROJECTION_*` variables. Unparseable or
    /// non-positive floors are ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            noise_multiplier: parse_var("PROJECTION_NOISE_MULTIPLIER")
                .filter(|v: &f64| v.is_finite() && *v >= 0.0)
                .unwrap_or(defaults.noise_multiplier),
            price_floor: parse_var("PROJECTION_PRICE_FLOOR")
                .filter(|v: &f64| v.is_finite() && *v > 0.0)
                .unwrap_or(defaults.price_floor),
            drift: parse_var("PROJECTION_DRIFT")
                .filter(|v: &f64| v.is_finite())
                .unwrap_or(defaults.drift),
            ..defaults
        }
    }

    pub fn without_noise(mut self) -> Self {
        self.noise_multiplier = 0.0;
        self
    }
}
