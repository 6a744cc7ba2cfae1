//! Chart pointer interaction: domain bounds, clamping, nearest-point lookup.

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::ChartPoint;

/// Point closest in time to `query`. On a tie the earlier point wins.
///
/// `points` must be ascending by timestamp, as every cached series is.
pub fn nearest(points: &[ChartPoint], query: DateTime<Utc>) -> Option<&ChartPoint> {
    let mut best: Option<(&ChartPoint, TimeDelta)> = None;
    for point in points {
        let distance = (point.timestamp - query).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((point, distance)),
        }
    }
    best.map(|(point, _)| point)
}

/// Visible bounds of one series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartDomain {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub min_price: f64,
    pub max_price: f64,
}

impl ChartDomain {
    /// Padding added above and below the price span, as a fraction of it.
    pub const PRICE_PADDING: f64 = 0.1;

    pub fn of(points: &[ChartPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut domain = ChartDomain {
            start: first.timestamp,
            end: first.timestamp,
            min_price: first.open,
            max_price: first.open,
        };
        for p in &points[1..] {
            domain.start = domain.start.min(p.timestamp);
            domain.end = domain.end.max(p.timestamp);
            domain.min_price = domain.min_price.min(p.open);
            domain.max_price = domain.max_price.max(p.open);
        }
        Some(domain)
    }

    pub fn clamp(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        t.clamp(self.start, self.end)
    }

    /// Price axis bounds with padding on both sides.
    pub fn price_bounds(&self) -> (f64, f64) {
        let offset = (self.max_price - self.min_price) * Self::PRICE_PADDING;
        (self.min_price - offset, self.max_price + offset)
    }

    /// Map a horizontal fraction of the plot area to a timestamp.
    ///
    /// Fractions outside `[0, 1]` land outside the domain; callers clamp.
    pub fn time_at(&self, fraction: f64) -> DateTime<Utc> {
        let span_ms = (self.end - self.start).num_milliseconds() as f64;
        self.start + chrono::Duration::milliseconds((span_ms * fraction).round() as i64)
    }

    /// Inverse of [`ChartDomain::time_at`].
    pub fn fraction_of(&self, t: DateTime<Utc>) -> f64 {
        let span_ms = (self.end - self.start).num_milliseconds();
        if span_ms == 0 {
            return 0.0;
        }
        (t - self.start).num_milliseconds() as f64 / span_ms as f64
    }
}

/// Pointer selection over the current series.
///
/// While a selection exists the tooltip is shown and the range picker is
/// hidden.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSelection {
    position: Option<DateTime<Utc>>,
}

impl ChartSelection {
    /// Move the pointer to `query`, clamped into the series' time domain.
    ///
    /// Returns the point the tooltip should show. On an empty series the
    /// selection is cleared.
    pub fn point_at<'a>(&mut self, points: &'a [ChartPoint], query: DateTime<Utc>) -> Option<&'a ChartPoint> {
        let Some(domain) = ChartDomain::of(points) else {
            self.position = None;
            return None;
        };
        let clamped = domain.clamp(query);
        self.position = Some(clamped);
        nearest(points, clamped)
    }

    /// Point under the current pointer, if any.
    pub fn resolve<'a>(&self, points: &'a [ChartPoint]) -> Option<&'a ChartPoint> {
        nearest(points, self.position?)
    }

    pub fn position(&self) -> Option<DateTime<Utc>> {
        self.position
    }

    pub fn is_active(&self) -> bool {
        self.position.is_some()
    }

    pub fn clear(&mut self) {
        self.position = None;
    }
}
