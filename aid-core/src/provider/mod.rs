//! Market data provider trait and structured error types.
//!
//! The details session never talks to a provider directly: it emits
//! [`FetchRequest`](crate::details::FetchRequest)s and the host runs them
//! against a `MarketProvider`, so sources can be swapped and mocked in tests.

pub mod synthetic;

use thiserror::Error;

use crate::domain::{ChartPoint, IndicatorsPayload, Page, TimeRange};

pub use synthetic::SyntheticProvider;

/// Failure of a single fetch. Cloneable so it can live inside a loading state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("ticker not found: {ticker}")]
    TickerNotFound { ticker: String },

    #[error("response format changed: {0}")]
    ResponseFormat(String),

    #[error("provider error: {0}")]
    Other(String),
}

/// Source of company lists, price series and indicators.
pub trait MarketProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Companies shown as carousel pages.
    fn companies(&self) -> Vec<Page>;

    /// Opening prices for `ticker` over `range`, ascending by timestamp.
    fn fetch_prices(&self, ticker: &str, range: TimeRange) -> Result<Vec<ChartPoint>, ProviderError>;

    /// Display names and indicator list for `ticker`.
    fn fetch_indicators(&self, ticker: &str) -> Result<IndicatorsPayload, ProviderError>;
}
