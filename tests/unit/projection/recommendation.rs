//! Unit tests for the buy/sell heuristic

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use stockcast::models::{date_to_instant, PathPoint, PredictionAnchor, PricePoint};
use stockcast::projection::{recommend, ProjectionInterpolator};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn historical(date: NaiveDate, price: f64) -> PathPoint {
    PathPoint::historical(PricePoint::new(date_to_instant(date), price))
}

#[test]
fn test_buy_low_sell_high_example() {
    let anchor = PredictionAnchor::new("WIPRO", date(2027, 3, 1), 150.0, 100.0, 90).unwrap();
    let path = vec![
        historical(date(2027, 1, 1), 100.0),
        historical(date(2027, 2, 1), 90.0),
        PathPoint::projected(anchor.timestamp(), 150.0),
        PathPoint::projected(date_to_instant(date(2027, 3, 15)), 170.0),
    ];

    let rec = recommend(&path, &anchor, 1000.0, 90).unwrap();

    assert_eq!(rec.buy.price, 90.0);
    assert_eq!(rec.buy.timestamp, date_to_instant(date(2027, 2, 1)));
    assert_eq!(rec.sell.price, 170.0);
    assert_eq!(rec.quantity, 11);
    assert_eq!(rec.profit_per_unit, 80.0);
    assert_eq!(rec.expected_profit, 880.0);
    assert_eq!(rec.anchor.price, 150.0);
}

#[test]
fn test_amount_below_buy_price_buys_nothing() {
    let anchor = PredictionAnchor::new("WIPRO", date(2027, 3, 1), 150.0, 100.0, 90).unwrap();
    let path = vec![
        historical(date(2027, 1, 1), 100.0),
        PathPoint::projected(anchor.timestamp(), 150.0),
    ];

    let rec = recommend(&path, &anchor, 50.0, 30).unwrap();
    assert_eq!(rec.quantity, 0);
    assert_eq!(rec.profit_per_unit, 50.0);
    assert_eq!(rec.expected_profit, 0.0);
}

#[test]
fn test_recommendation_over_projected_path() {
    let anchor = PredictionAnchor::new("ITC", date(2027, 6, 1), 400.0, 300.0, 80).unwrap();
    let history: Vec<PricePoint> = (0..20)
        .map(|i| {
            let day = date(2026, 10, 5) + Duration::days(7 * i);
            PricePoint::new(date_to_instant(day), 300.0 + (i % 5) as f64 * 10.0)
        })
        .collect();
    let mut rng = StdRng::seed_from_u64(42);
    let path = ProjectionInterpolator::default().project(&history, Some(&anchor), 60, &mut rng);

    let rec = recommend(path.points(), &anchor, 10_000.0, 60).unwrap();

    assert!(rec.buy.timestamp <= anchor.timestamp());
    assert!(rec.sell.timestamp >= anchor.timestamp());
    assert!(rec.sell.timestamp <= anchor.timestamp() + Duration::days(60));
    // the anchor is a sell candidate, so the chosen sell is never below it
    assert!(rec.sell.price >= 400.0);
    assert_eq!(rec.quantity, (10_000.0 / rec.buy.price).floor() as u64);
    assert_eq!(rec.expected_profit, rec.quantity as f64 * rec.profit_per_unit);
}
