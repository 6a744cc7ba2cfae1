//! Price points and the range-keyed dataset cache.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TimeRange;

/// Opening price of one candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
}

impl ChartPoint {
    pub fn new(timestamp: DateTime<Utc>, open: f64) -> Self {
        Self { timestamp, open }
    }
}

/// Fetched price series, one per time range.
///
/// An entry is never merged into once stored; the only way to refresh a range
/// is [`ChartDataset::clear`], which drops every range.
#[derive(Debug, Clone, Default)]
pub struct ChartDataset {
    series: BTreeMap<TimeRange, Vec<ChartPoint>>,
}

impl ChartDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, range: TimeRange) -> bool {
        self.series.contains_key(&range)
    }

    pub fn get(&self, range: TimeRange) -> Option<&[ChartPoint]> {
        self.series.get(&range).map(Vec::as_slice)
    }

    /// Points for `range`, or an empty slice when nothing is cached.
    pub fn points(&self, range: TimeRange) -> &[ChartPoint] {
        self.get(range).unwrap_or(&[])
    }

    /// Store the series for `range`, ordering it by timestamp.
    pub fn insert(&mut self, range: TimeRange, mut points: Vec<ChartPoint>) {
        points.sort_by_key(|p| p.timestamp);
        self.series.insert(range, points);
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }

    pub fn cached_ranges(&self) -> impl Iterator<Item = TimeRange> + '_ {
        self.series.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
