//! Buy/sell heuristic over a projected path
//!
//! Illustrative only: picks the cheapest point up to the anchor and the
//! dearest point inside the sell window after it.

use chrono::{DateTime, Duration, Utc};

use crate::models::{PathPoint, PredictionAnchor, PricePoint, Recommendation, DISCLAIMER};

/// Recommend a hypothetical buy and sell point.
///
/// Returns `None` when no path point lies at or before the anchor.
/// `invested_amount` is expected to be positive; callers validate it.
pub fn recommend(
    path: &[PathPoint],
    anchor: &PredictionAnchor,
    invested_amount: f64,
    sell_horizon_days: u32,
) -> Option<Recommendation> {
    let anchor_ts = anchor.timestamp();
    let anchor_point = PricePoint::new(anchor_ts, anchor.predicted_price);

    // ties go to the earliest timestamp
    let buy = path
        .iter()
        .filter(|p| p.timestamp <= anchor_ts)
        .fold(None::<&PathPoint>, |best, p| match best {
            Some(b) if p.price > b.price || (p.price == b.price && p.timestamp >= b.timestamp) => {
                Some(b)
            }
            _ => Some(p),
        })
        .copied()?;

    let quantity = if buy.price > 0.0 && invested_amount.is_finite() {
        (invested_amount / buy.price).floor().max(0.0) as u64
    } else {
        0
    };

    let sell_window_end = anchor_ts
        .checked_add_signed(Duration::days(i64::from(sell_horizon_days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let sell = path
        .iter()
        .filter(|p| p.timestamp >= anchor_ts && p.timestamp <= sell_window_end)
        .fold(None::<&PathPoint>, |best, p| match best {
            Some(b) if p.price < b.price || (p.price == b.price && p.timestamp >= b.timestamp) => {
                Some(b)
            }
            _ => Some(p),
        })
        .copied();

    let Some(sell) = sell else {
        return Some(Recommendation {
            buy,
            anchor: anchor_point,
            sell: PathPoint::projected(anchor_ts, anchor.predicted_price),
            quantity,
            profit_per_unit: 0.0,
            expected_profit: 0.0,
            disclaimer: DISCLAIMER,
        });
    };

    let profit_per_unit = sell.price - buy.price;
    Some(Recommendation {
        buy,
        anchor: anchor_point,
        sell,
        quantity,
        profit_per_unit,
        expected_profit: quantity as f64 * profit_per_unit,
        disclaimer: DISCLAIMER,
    })
}
