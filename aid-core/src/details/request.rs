//! Fetch requests emitted by a session and the completions fed back to it.

use std::fmt;

use crate::domain::{ChartPoint, IndicatorsPayload, TimeRange};
use crate::provider::{MarketProvider, ProviderError};

/// Identity of one details session, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub(crate) u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceTicket {
    pub session: SessionId,
    pub generation: u64,
    pub range: TimeRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorTicket {
    pub session: SessionId,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    Prices { ticker: String, ticket: PriceTicket },
    Indicators { ticker: String, ticket: IndicatorTicket },
}

impl FetchRequest {
    pub fn session(&self) -> SessionId {
        match self {
            FetchRequest::Prices { ticket, .. } => ticket.session,
            FetchRequest::Indicators { ticket, .. } => ticket.session,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FetchCompletion {
    Prices {
        ticket: PriceTicket,
        result: Result<Vec<ChartPoint>, ProviderError>,
    },
    Indicators {
        ticket: IndicatorTicket,
        result: Result<IndicatorsPayload, ProviderError>,
    },
}

impl FetchCompletion {
    pub fn session(&self) -> SessionId {
        match self {
            FetchCompletion::Prices { ticket, .. } => ticket.session,
            FetchCompletion::Indicators { ticket, .. } => ticket.session,
        }
    }
}

/// Run a request against `provider`, blocking until it finishes.
pub fn execute(provider: &dyn MarketProvider, request: FetchRequest) -> FetchCompletion {
    match request {
        FetchRequest::Prices { ticker, ticket } => FetchCompletion::Prices {
            result: provider.fetch_prices(&ticker, ticket.range),
            ticket,
        },
        FetchRequest::Indicators { ticker, ticket } => FetchCompletion::Indicators {
            result: provider.fetch_indicators(&ticker),
            ticket,
        },
    }
}
