//! Chart window granularity, also the dataset cache key.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Selectable chart window, ordered from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    Hour,
    Day,
    Week,
    Month,
    Year,
    AllTime,
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::Month
    }
}

impl TimeRange {
    pub const ALL: [TimeRange; 6] = [
        TimeRange::Hour,
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
        TimeRange::Year,
        TimeRange::AllTime,
    ];

    /// Short label shown in the range picker.
    pub fn label(self) -> &'static str {
        match self {
            TimeRange::Hour => "H",
            TimeRange::Day => "D",
            TimeRange::Week => "W",
            TimeRange::Month => "M",
            TimeRange::Year => "Y",
            TimeRange::AllTime => "All",
        }
    }

    pub fn index(self) -> usize {
        match self {
            TimeRange::Hour => 0,
            TimeRange::Day => 1,
            TimeRange::Week => 2,
            TimeRange::Month => 3,
            TimeRange::Year => 4,
            TimeRange::AllTime => 5,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    /// Next coarser range, saturating at `AllTime`.
    pub fn coarser(self) -> TimeRange {
        Self::from_index(self.index() + 1).unwrap_or(TimeRange::AllTime)
    }

    /// Next finer range, saturating at `Hour`.
    pub fn finer(self) -> TimeRange {
        Self::from_index(self.index().saturating_sub(1)).unwrap_or(TimeRange::Hour)
    }

    /// Wall-clock span covered by the window.
    pub fn span(self) -> Duration {
        match self {
            TimeRange::Hour => Duration::hours(1),
            TimeRange::Day => Duration::days(1),
            TimeRange::Week => Duration::weeks(1),
            TimeRange::Month => Duration::days(30),
            TimeRange::Year => Duration::days(365),
            TimeRange::AllTime => Duration::days(365 * 10),
        }
    }

    /// Spacing between consecutive candles in the window.
    pub fn step(self) -> Duration {
        match self {
            TimeRange::Hour => Duration::minutes(1),
            TimeRange::Day => Duration::minutes(10),
            TimeRange::Week => Duration::hours(1),
            TimeRange::Month => Duration::days(1),
            TimeRange::Year => Duration::weeks(1),
            TimeRange::AllTime => Duration::days(31),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeRange::Hour => "hour",
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
            TimeRange::AllTime => "all_time",
        };
        f.write_str(name)
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "h" | "hour" => Ok(TimeRange::Hour),
            "d" | "day" => Ok(TimeRange::Day),
            "w" | "week" => Ok(TimeRange::Week),
            "m" | "month" => Ok(TimeRange::Month),
            "y" | "year" => Ok(TimeRange::Year),
            "all" | "all_time" | "alltime" => Ok(TimeRange::AllTime),
            other => Err(format!("unknown time range '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_by_granularity() {
        assert!(TimeRange::Hour < TimeRange::Day);
        assert!(TimeRange::Year < TimeRange::AllTime);
        let mut shuffled = vec![TimeRange::Year, TimeRange::Hour, TimeRange::Month];
        shuffled.sort();
        assert_eq!(shuffled, vec![TimeRange::Hour, TimeRange::Month, TimeRange::Year]);
    }

    #[test]
    fn index_roundtrip() {
        for range in TimeRange::ALL {
            assert_eq!(TimeRange::from_index(range.index()), Some(range));
        }
        assert!(TimeRange::from_index(6).is_none());
    }

    #[test]
    fn coarser_and_finer_saturate() {
        assert_eq!(TimeRange::AllTime.coarser(), TimeRange::AllTime);
        assert_eq!(TimeRange::Hour.finer(), TimeRange::Hour);
        assert_eq!(TimeRange::Week.coarser(), TimeRange::Month);
        assert_eq!(TimeRange::Week.finer(), TimeRange::Day);
    }

    #[test]
    fn parses_labels_and_names() {
        assert_eq!("W".parse::<TimeRange>().unwrap(), TimeRange::Week);
        assert_eq!("all_time".parse::<TimeRange>().unwrap(), TimeRange::AllTime);
        assert_eq!(TimeRange::AllTime.to_string().parse::<TimeRange>().unwrap(), TimeRange::AllTime);
        assert!("fortnight".parse::<TimeRange>().is_err());
    }

    #[test]
    fn default_is_month() {
        assert_eq!(TimeRange::default(), TimeRange::Month);
    }
}
