//! Statistics and sampling helpers used by the projection code

use rand::Rng;
use std::f64::consts::PI;

/// Natural log of each consecutive price ratio.
///
/// Pairs where either price is not strictly positive are skipped.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|pair| pair[0] > 0.0 && pair[1] > 0.0)
        .map(|pair| (pair[1] / pair[0]).ln())
        .collect()
}

/// Population standard deviation. Returns 0 for an empty slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    variance.sqrt()
}

/// Per-period log-return volatility of a price series.
///
/// 0 when fewer than two usable returns exist.
pub fn log_return_volatility(prices: &[f64]) -> f64 {
    let returns = log_returns(prices);
    if returns.len() < 2 {
        return 0.0;
    }
    population_std_dev(&returns)
}

/// Uniform draw in the open interval (0, 1)
fn open_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let u: f64 = rng.gen();
        if u > 0.0 {
            return u;
        }
    }
}

/// Standard normal sample via the Box–Muller transform
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u = open_unit(rng);
    let v = open_unit(rng);
    (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos()
}

/// Round to two decimal places (currency precision)
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
