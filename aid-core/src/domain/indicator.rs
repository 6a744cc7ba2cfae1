//! Financial indicators and their favourability verdicts.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// One computed indicator for a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    /// Indicator name, e.g. "P/E". Sort key for the view list.
    pub kind: String,
    /// `None` means not applicable for this ticker.
    pub value: Option<f64>,
    /// Signed favourability; `None` and `0` are neutral.
    pub verdict: Option<i32>,
}

/// Favourability classification derived from a raw verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Favorable,
    Unfavorable,
    Neutral,
}

impl Verdict {
    pub fn from_raw(raw: Option<i32>) -> Self {
        match raw.map(|v| v.cmp(&0)) {
            Some(Ordering::Greater) => Verdict::Favorable,
            Some(Ordering::Less) => Verdict::Unfavorable,
            _ => Verdict::Neutral,
        }
    }

    /// Glyph drawn next to the indicator row. Neutral rows get none.
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            Verdict::Favorable => Some("▲"),
            Verdict::Unfavorable => Some("▼"),
            Verdict::Neutral => None,
        }
    }
}

impl Indicator {
    pub fn new(kind: impl Into<String>, value: Option<f64>, verdict: Option<i32>) -> Self {
        Self {
            kind: kind.into(),
            value,
            verdict,
        }
    }

    pub fn verdict_kind(&self) -> Verdict {
        Verdict::from_raw(self.verdict)
    }

    /// Value rendered with two decimals, or a dash when absent.
    pub fn formatted_value(&self) -> String {
        match self.value {
            Some(v) => format!("{v:.2}"),
            None => "-".to_string(),
        }
    }
}

/// Indicator fetch result: display names plus the indicator list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorsPayload {
    pub short_name: String,
    pub full_name: String,
    pub indicators: Vec<Indicator>,
}

/// Count of favourable and unfavourable verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProsCons {
    pub pros: usize,
    pub cons: usize,
}

impl ProsCons {
    /// Tally verdicts over every indicator, including ones hidden from the view list.
    pub fn tally<'a>(indicators: impl IntoIterator<Item = &'a Indicator>) -> Self {
        let mut tally = ProsCons::default();
        for indicator in indicators {
            let Some(verdict) = indicator.verdict else {
                continue;
            };
            if verdict < 0 {
                tally.cons += 1;
            } else if verdict > 0 {
                tally.pros += 1;
            }
        }
        tally
    }

    pub fn sum(&self) -> usize {
        self.pros + self.cons
    }

    /// Share of favourable verdicts in `[0, 1]`, `None` when nothing was counted.
    pub fn pros_ratio(&self) -> Option<f64> {
        match self.sum() {
            0 => None,
            n => Some(self.pros as f64 / n as f64),
        }
    }
}
