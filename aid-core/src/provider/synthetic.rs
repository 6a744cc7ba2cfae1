//! Deterministic synthetic market provider.
//!
//! Every series is derived from a BLAKE3 hash of `(seed, ticker, stream)`, so
//! the same ticker and range always produce the same prices regardless of the
//! order in which fetches happen. Failure injection draws from a separate
//! stream keyed by an attempt counter, which lets a reload succeed after a
//! failed fetch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, DurationRound, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{MarketProvider, ProviderError};
use crate::config::ProviderConfig;
use crate::domain::{ChartPoint, Indicator, IndicatorsPayload, Page, TimeRange};

/// (ticker, short name, full name, sector)
const COMPANIES: &[(&str, &str, &str, &str)] = &[
    ("SBER", "Sberbank", "Sberbank of Russia PJSC", "Financials"),
    ("GAZP", "Gazprom", "Gazprom PJSC", "Energy"),
    ("LKOH", "Lukoil", "Lukoil Oil Company PJSC", "Energy"),
    ("YDEX", "Yandex", "Yandex MKPAO", "Technology"),
    ("GMKN", "Nornickel", "MMC Norilsk Nickel PJSC", "Materials"),
    ("MGNT", "Magnit", "Magnit PJSC", "Consumer"),
    ("MTSS", "MTS", "Mobile TeleSystems PJSC", "Telecom"),
    ("ROSN", "Rosneft", "Rosneft Oil Company PJSC", "Energy"),
];

const INDICATOR_KINDS: &[&str] = &[
    "Beta",
    "Debt/Equity",
    "Dividend Yield",
    "EV/EBITDA",
    "P/B",
    "P/E",
    "ROE",
    "RSI",
];

pub struct SyntheticProvider {
    seed: u64,
    failure_rate: f64,
    latency: Duration,
    anchor: DateTime<Utc>,
    attempts: AtomicU64,
}

impl SyntheticProvider {
    /// Provider anchored at the current minute with no latency or failures.
    pub fn new(seed: u64) -> Self {
        let now = Utc::now();
        let anchor = now.duration_trunc(chrono::Duration::minutes(1)).unwrap_or(now);
        Self {
            seed,
            failure_rate: 0.0,
            latency: Duration::ZERO,
            anchor,
            attempts: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(config.seed)
            .with_failure_rate(config.failure_rate)
            .with_latency(Duration::from_millis(config.latency_ms))
    }

    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fix the timestamp of the newest candle.
    pub fn with_anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.anchor = anchor;
        self
    }

    fn rng_for(&self, ticker: &str, stream: &str, extra: u64) -> StdRng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(ticker.as_bytes());
        hasher.update(stream.as_bytes());
        hasher.update(&extra.to_le_bytes());
        let mut seed = [0u8; 32];
        seed.copy_from_slice(hasher.finalize().as_bytes());
        StdRng::from_seed(seed)
    }

    fn company(&self, ticker: &str) -> Result<&'static (&'static str, &'static str, &'static str, &'static str), ProviderError> {
        COMPANIES
            .iter()
            .find(|(t, ..)| t.eq_ignore_ascii_case(ticker))
            .ok_or_else(|| ProviderError::TickerNotFound {
                ticker: ticker.to_string(),
            })
    }

    /// Simulated round trip: sleep, then maybe fail.
    fn round_trip(&self, ticker: &str) -> Result<(), ProviderError> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        if self.failure_rate <= 0.0 {
            return Ok(());
        }
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed);
        if self.rng_for(ticker, "failure", attempt).gen_bool(self.failure_rate) {
            return Err(ProviderError::NetworkUnreachable(format!(
                "simulated outage on attempt {attempt}"
            )));
        }
        Ok(())
    }

    fn base_price(&self, ticker: &str) -> f64 {
        self.rng_for(ticker, "base", 0).gen_range(50.0..500.0)
    }
}

impl MarketProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn companies(&self) -> Vec<Page> {
        COMPANIES
            .iter()
            .map(|(ticker, name, _, sector)| Page::new(*ticker, *name, *sector))
            .collect()
    }

    fn fetch_prices(&self, ticker: &str, range: TimeRange) -> Result<Vec<ChartPoint>, ProviderError> {
        let (ticker, ..) = *self.company(ticker)?;
        self.round_trip(ticker)?;

        let step = range.step();
        let count = (range.span().num_seconds() / step.num_seconds()).max(1);
        let mut rng = self.rng_for(ticker, "prices", range.index() as u64);
        let volatility = match range {
            TimeRange::Hour | TimeRange::Day => 0.002,
            TimeRange::Week | TimeRange::Month => 0.01,
            TimeRange::Year | TimeRange::AllTime => 0.03,
        };

        let mut open = self.base_price(ticker);
        let start = self.anchor - step * (count as i32 - 1);
        let points: Vec<ChartPoint> = (0..count)
            .map(|i| {
                let point = ChartPoint::new(start + step * i as i32, (open * 100.0).round() / 100.0);
                open *= 1.0 + rng.gen_range(-volatility..volatility);
                point
            })
            .collect();

        debug!(ticker, %range, points = points.len(), "synthetic prices generated");
        Ok(points)
    }

    fn fetch_indicators(&self, ticker: &str) -> Result<IndicatorsPayload, ProviderError> {
        let (ticker, short_name, full_name, _) = *self.company(ticker)?;
        self.round_trip(ticker)?;

        let mut rng = self.rng_for(ticker, "indicators", 0);
        let indicators = INDICATOR_KINDS
            .iter()
            .map(|kind| {
                let value = rng.gen_bool(0.8).then(|| rng.gen_range(-5.0..40.0));
                let verdict = rng.gen_bool(0.9).then(|| rng.gen_range(-1..=1));
                Indicator::new(*kind, value, verdict)
            })
            .collect();

        Ok(IndicatorsPayload {
            short_name: short_name.to_string(),
            full_name: full_name.to_string(),
            indicators,
        })
    }
}
