//! Projection interpolator
//!
//! Builds a plottable path from the last observed close to a predicted
//! price: a straight line toward the anchor, perturbed by multiplicative
//! noise scaled to the series' own log-return volatility, optionally
//! extended past the anchor with a gentle drift. The anchor itself is
//! always exact.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;

use crate::common::math;
use crate::config::ProjectionConfig;
use crate::models::{PathPoint, PredictionAnchor, PricePoint};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Merged, sorted, tagged output of [`ProjectionInterpolator::project`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProjectedPath {
    points: Vec<PathPoint>,
}

impl ProjectedPath {
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<PathPoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point_at(&self, timestamp: DateTime<Utc>) -> Option<&PathPoint> {
        self.points
            .binary_search_by_key(&timestamp, |p| p.timestamp)
            .ok()
            .map(|idx| &self.points[idx])
    }

    pub fn projected(&self) -> impl Iterator<Item = &PathPoint> {
        self.points.iter().filter(|p| p.is_projected())
    }
}

impl From<BTreeMap<DateTime<Utc>, PathPoint>> for ProjectedPath {
    fn from(map: BTreeMap<DateTime<Utc>, PathPoint>) -> Self {
        Self {
            points: map.into_values().collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectionInterpolator {
    config: ProjectionConfig,
}

impl ProjectionInterpolator {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Number of synthesized steps for a span: whole weeks, clamped to the
    /// configured bounds.
    pub fn step_count(&self, span: Duration) -> usize {
        let days = ((span.num_milliseconds() as f64) / MILLIS_PER_DAY).round().max(1.0);
        let weeks = (days / 7.0).round().max(1.0) as usize;
        weeks.clamp(self.config.min_steps, self.config.max_steps.max(self.config.min_steps))
    }

    /// Project `historical` toward `anchor`.
    ///
    /// Without an anchor the series is returned sorted and deduplicated
    /// (last write wins). `horizon_days` extends the path past the anchor.
    pub fn project<R: Rng + ?Sized>(
        &self,
        historical: &[PricePoint],
        anchor: Option<&PredictionAnchor>,
        horizon_days: u32,
        rng: &mut R,
    ) -> ProjectedPath {
        let mut merged: BTreeMap<DateTime<Utc>, PathPoint> = historical
            .iter()
            .map(|point| (point.timestamp, PathPoint::historical(*point)))
            .collect();

        let Some(anchor) = anchor else {
            return merged.into();
        };

        let t1 = anchor.timestamp();
        let p1 = anchor.predicted_price;

        let Some((&t0, last)) = merged.last_key_value() else {
            return ProjectedPath {
                points: vec![PathPoint::projected(t1, p1)],
            };
        };
        let p0 = last.price;

        if t1 <= t0 {
            merged.insert(t1, PathPoint::projected(t1, p1));
            return merged.into();
        }

        let prices: Vec<f64> = merged.values().map(|p| p.price).collect();
        let sigma = math::log_return_volatility(&prices);
        let noise_scale = sigma * self.config.noise_multiplier;

        // an extension past the representable range is dropped
        let end = t1
            .checked_add_signed(Duration::days(i64::from(horizon_days)))
            .unwrap_or(t1);
        let span_ms = (end - t0).num_milliseconds() as f64;
        let tail_span_ms = ((end - t1).num_milliseconds() as f64).max(1.0);
        let steps = self.step_count(end - t0);

        let mut synthesized = Vec::with_capacity(steps + 1);
        for i in 1..=steps {
            let fraction = i as f64 / steps as f64;
            let t = t0 + Duration::milliseconds((span_ms * fraction).round() as i64);
            if t <= t0 {
                continue;
            }

            let base = if t <= t1 {
                p0 + (p1 - p0) * fraction
            } else {
                let frac = (t - t1).num_milliseconds() as f64 / tail_span_ms;
                p1 * (1.0 + self.config.drift * frac)
            };

            let noisy = if noise_scale > 0.0 {
                base * (math::standard_normal(rng) * noise_scale).exp()
            } else {
                base
            };
            synthesized.push(PathPoint::projected(t, noisy.max(self.config.price_floor)));
        }

        let synthesized_count = synthesized.len();
        for point in synthesized {
            merged.insert(point.timestamp, point);
        }
        merged.insert(t1, PathPoint::projected(t1, p1));

        tracing::debug!(
            ticker = %anchor.ticker,
            steps = synthesized_count,
            sigma,
            horizon_days,
            "Projected price path"
        );

        merged.into()
    }
}
