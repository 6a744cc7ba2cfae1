//! Domain types: pages, time ranges, price points, indicators.

pub mod chart;
pub mod indicator;
pub mod page;
pub mod time_range;

pub use chart::{ChartDataset, ChartPoint};
pub use indicator::{Indicator, IndicatorsPayload, ProsCons, Verdict};
pub use page::Page;
pub use time_range::TimeRange;
