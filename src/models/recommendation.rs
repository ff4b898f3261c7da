use serde::Serialize;

use super::path::{PathPoint, PricePoint};

pub const DISCLAIMER: &str = "This is a heuristic suggestion based on historical volatility and a \
single predicted price. It is illustrative only, does not constitute financial advice and is not \
a guarantee of any return. Consider fees, taxes, and risks.";

/// Hypothetical buy and sell points over a projected path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub buy: PathPoint,
    pub anchor: PricePoint,
    pub sell: PathPoint,
    pub quantity: u64,
    pub profit_per_unit: f64,
    pub expected_profit: f64,
    pub disclaimer: &'static str,
}
