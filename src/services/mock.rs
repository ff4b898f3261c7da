//! Synthetic market data
//!
//! Stands in for the remote API during development: a fixed catalog,
//! five years of weekly closes from a bounded random walk, and a
//! compounding-growth-plus-shock prediction.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Months, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::math::round_cents;
use crate::error::MarketDataError;
use crate::models::{date_to_instant, Company, HistoricalPrice, Prediction, PredictionRequest};

use super::market_data::MarketDataProvider;

const LOOKBACK_DAYS: u64 = 1825;
const SAMPLE_EVERY_DAYS: usize = 7;
const MIN_SIMULATED_PRICE: f64 = 10.0;
const FALLBACK_LAST_PRICE: f64 = 1000.0;
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

const CATALOG: &[(&str, &str)] = &[
    ("RELIANCE", "Reliance Industries Limited"),
    ("TCS", "Tata Consultancy Services Limited"),
    ("HDFCBANK", "HDFC Bank Limited"),
    ("INFY", "Infosys Limited"),
    ("HINDUNILVR", "Hindustan Unilever Limited"),
    ("ICICIBANK", "ICICI Bank Limited"),
    ("KOTAKBANK", "Kotak Mahindra Bank Limited"),
    ("LT", "Larsen & Toubro Limited"),
    ("SBIN", "State Bank of India"),
    ("BHARTIARTL", "Bharti Airtel Limited"),
    ("ASIANPAINT", "Asian Paints Limited"),
    ("MARUTI", "Maruti Suzuki India Limited"),
    ("BAJFINANCE", "Bajaj Finance Limited"),
    ("HCLTECH", "HCL Technologies Limited"),
    ("AXISBANK", "Axis Bank Limited"),
    ("ITC", "ITC Limited"),
    ("WIPRO", "Wipro Limited"),
    ("ULTRACEMCO", "UltraTech Cement Limited"),
    ("NESTLEIND", "Nestlé India Limited"),
    ("TITAN", "Titan Company Limited"),
    ("ADANIPORTS", "Adani Ports and Special Economic Zone Limited"),
    ("POWERGRID", "Power Grid Corporation of India Limited"),
    ("NTPC", "NTPC Limited"),
    ("BAJAJFINSV", "Bajaj Finserv Limited"),
    ("DRREDDY", "Dr. Reddys Laboratories Limited"),
    ("SUNPHARMA", "Sun Pharmaceutical Industries Limited"),
    ("TECHM", "Tech Mahindra Limited"),
    ("ONGC", "Oil and Natural Gas Corporation Limited"),
    ("TATASTEEL", "Tata Steel Limited"),
    ("JSWSTEEL", "JSW Steel Limited"),
    ("HINDALCO", "Hindalco Industries Limited"),
    ("INDUSINDBK", "IndusInd Bank Limited"),
    ("CIPLA", "Cipla Limited"),
    ("GRASIM", "Grasim Industries Limited"),
    ("BRITANNIA", "Britannia Industries Limited"),
    ("COALINDIA", "Coal India Limited"),
    ("EICHERMOT", "Eicher Motors Limited"),
    ("BPCL", "Bharat Petroleum Corporation Limited"),
    ("HEROMOTOCO", "Hero MotoCorp Limited"),
    ("DIVISLAB", "Divis Laboratories Limited"),
];

/// Extra daily growth factor for tickers that trend upward in the mock data
fn ticker_drift(ticker: &str) -> f64 {
    match ticker {
        "TCS" | "INFY" => 1.0002,
        "RELIANCE" => 1.0001,
        _ => 1.0,
    }
}

pub struct MockMarketDataProvider {
    rng: Mutex<StdRng>,
    reference_time: Option<DateTime<Utc>>,
    latency: Duration,
}

impl MockMarketDataProvider {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            reference_time: None,
            latency: Duration::ZERO,
        }
    }

    /// Reproducible generator
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..Self::new()
        }
    }

    /// Pin "now" to midnight UTC of `date`
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_time = Some(date_to_instant(date));
        self
    }

    /// Artificial delay before each response
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn companies() -> Vec<Company> {
        CATALOG
            .iter()
            .map(|(ticker, name)| Company::new(*ticker, *name))
            .collect()
    }

    fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }

    fn ensure_known(ticker: &str) -> Result<(), MarketDataError> {
        if CATALOG.iter().any(|(known, _)| *known == ticker) {
            Ok(())
        } else {
            Err(MarketDataError::NotFound(format!("Unknown ticker '{}'", ticker)))
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }

    /// Daily random walk over the lookback window, sampled weekly
    pub fn generate_historical(&self, ticker: &str) -> Vec<HistoricalPrice> {
        let today = self.now().date_naive();
        let start = today
            .checked_sub_months(Months::new(60))
            .unwrap_or(today);
        let drift = ticker_drift(ticker);

        self.with_rng(|rng| {
            let mut price: f64 = rng.gen_range(500.0..2500.0);
            start
                .iter_days()
                .take(LOOKBACK_DAYS as usize)
                .enumerate()
                .filter_map(|(idx, date)| {
                    let shock: f64 = rng.gen_range(-0.05..0.05);
                    price = (price * (1.0 + shock)).max(MIN_SIMULATED_PRICE) * drift;
                    (idx % SAMPLE_EVERY_DAYS == 0)
                        .then(|| HistoricalPrice::new(date, round_cents(price)))
                })
                .collect()
        })
    }

    /// Compounded growth to the target date plus a one-off shock
    pub fn generate_prediction(
        &self,
        ticker: &str,
        request: PredictionRequest,
        historical: &[HistoricalPrice],
    ) -> Result<Prediction, MarketDataError> {
        let now = self.now();
        let target = request.validate(now.date_naive())?;

        let last_price = historical
            .last()
            .map(|h| h.price)
            .filter(|p| *p > 0.0)
            .unwrap_or(FALLBACK_LAST_PRICE);

        let seconds_ahead = (date_to_instant(target) - now).num_seconds() as f64;
        let days_ahead = (seconds_ahead / 86_400.0).ceil();
        let trading_days = (days_ahead * TRADING_DAYS_PER_YEAR / 365.0).floor().max(0.0);

        let (growth, shock, confidence) = self.with_rng(|rng| {
            let growth: f64 = rng.gen_range(0.05..0.20);
            let shock: f64 = rng.gen_range(-0.15..0.15);
            let confidence: u8 = rng.gen_range(70..100);
            (growth, shock, confidence)
        });

        let predicted = last_price
            * (1.0 + growth).powf(trading_days / TRADING_DAYS_PER_YEAR)
            * (1.0 + shock);
        if !predicted.is_finite() {
            return Err(MarketDataError::InvalidInput(format!(
                "Target date {} is too far in the future to predict",
                target
            )));
        }

        Ok(Prediction {
            ticker: ticker.to_string(),
            year: request.year,
            month: request.month,
            day: request.day,
            predicted_price: round_cents(predicted).max(0.01),
            current_price: last_price,
            confidence,
            created_at: Utc::now(),
        })
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for MockMarketDataProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketDataProvider {
    async fn fetch_companies(&self) -> Result<Vec<Company>, MarketDataError> {
        self.simulate_latency().await;
        Ok(Self::companies())
    }

    async fn fetch_historical(&self, ticker: &str) -> Result<Vec<HistoricalPrice>, MarketDataError> {
        self.simulate_latency().await;
        Self::ensure_known(ticker)?;
        Ok(self.generate_historical(ticker))
    }

    async fn fetch_prediction(
        &self,
        ticker: &str,
        request: PredictionRequest,
    ) -> Result<Prediction, MarketDataError> {
        self.simulate_latency().await;
        Self::ensure_known(ticker)?;
        let historical = self.generate_historical(ticker);
        self.generate_prediction(ticker, request, &historical)
    }
}
