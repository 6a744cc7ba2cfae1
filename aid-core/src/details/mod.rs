//! Per-ticker details session: price chart cache, indicators, derived views.
//!
//! A session never performs I/O. Loads return a [`FetchRequest`] for the host
//! to run (on a worker thread, or inline in the CLI); the result comes back as
//! a [`FetchCompletion`] through [`DetailsSession::apply`]. Each request
//! carries a ticket naming the session, the generation of its concern and,
//! for prices, the range it was issued for. The session uses the ticket to
//! drop completions that no longer matter:
//!
//! - another session (the screen was closed and reopened),
//! - an older generation (a reload happened in between),
//! - a closed session.
//!
//! A price completion for a range that is no longer selected is still stored,
//! but does not touch the visible loading state.

mod request;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::domain::{ChartDataset, ChartPoint, Indicator, IndicatorsPayload, ProsCons, TimeRange};
use crate::provider::ProviderError;

pub use request::{execute, FetchCompletion, FetchRequest, IndicatorTicket, PriceTicket, SessionId};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Loading status of one concern (chart or indicators).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadingState {
    Fetching,
    Loaded,
    Error(ProviderError),
}

impl LoadingState {
    pub fn is_fetching(&self) -> bool {
        matches!(self, LoadingState::Fetching)
    }

    pub fn error(&self) -> Option<&ProviderError> {
        match self {
            LoadingState::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// State changes published to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    RangeSelected(TimeRange),
    ChartFetching(TimeRange),
    /// A series was stored; `visible` is false when its range is no longer selected.
    ChartStored { range: TimeRange, visible: bool },
    ChartFailed { range: TimeRange, error: ProviderError },
    IndicatorsFetching,
    IndicatorsLoaded { count: usize },
    IndicatorsFailed(ProviderError),
}

pub struct DetailsSession {
    id: SessionId,
    ticker: String,
    short_name: Option<String>,
    full_name: Option<String>,

    selected_range: TimeRange,
    dataset: ChartDataset,
    chart_state: LoadingState,
    chart_generation: u64,
    pending_ranges: BTreeSet<TimeRange>,

    indicators: Vec<Indicator>,
    indicators_state: LoadingState,
    indicators_generation: u64,
    indicators_pending: bool,

    closed: bool,
    events: Vec<SessionEvent>,
}

impl DetailsSession {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self::with_range(ticker, TimeRange::default())
    }

    pub fn with_range(ticker: impl Into<String>, range: TimeRange) -> Self {
        Self {
            id: SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed)),
            ticker: ticker.into(),
            short_name: None,
            full_name: None,
            selected_range: range,
            dataset: ChartDataset::new(),
            chart_state: LoadingState::Fetching,
            chart_generation: 0,
            pending_ranges: BTreeSet::new(),
            indicators: Vec::new(),
            indicators_state: LoadingState::Fetching,
            indicators_generation: 0,
            indicators_pending: false,
            closed: false,
            events: Vec::new(),
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub fn selected_range(&self) -> TimeRange {
        self.selected_range
    }

    pub fn chart_state(&self) -> &LoadingState {
        &self.chart_state
    }

    pub fn indicators_state(&self) -> &LoadingState {
        &self.indicators_state
    }

    pub fn dataset(&self) -> &ChartDataset {
        &self.dataset
    }

    /// Series for the selected range; empty until it has been fetched.
    pub fn chart_points(&self) -> &[ChartPoint] {
        self.dataset.points(self.selected_range)
    }

    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_range_pending(&self, range: TimeRange) -> bool {
        self.pending_ranges.contains(&range)
    }

    // ── Derived views ──────────────────────────────────────────────────

    /// Indicators that have a value, sorted by kind.
    pub fn indicators_for_view(&self) -> Vec<&Indicator> {
        let mut view: Vec<&Indicator> = self.indicators.iter().filter(|i| i.value.is_some()).collect();
        view.sort_by(|a, b| a.kind.cmp(&b.kind));
        view
    }

    /// Verdict tally over every indicator, shown or not.
    pub fn pros_cons(&self) -> ProsCons {
        ProsCons::tally(&self.indicators)
    }

    // ── Loads ──────────────────────────────────────────────────────────

    /// Request prices for the selected range unless cached or already in flight.
    pub fn load_chart(&mut self) -> Option<FetchRequest> {
        if self.closed {
            return None;
        }
        let range = self.selected_range;
        if self.dataset.contains(range) || self.pending_ranges.contains(&range) {
            return None;
        }

        self.chart_state = LoadingState::Fetching;
        self.pending_ranges.insert(range);
        self.events.push(SessionEvent::ChartFetching(range));
        debug!(ticker = %self.ticker, %range, generation = self.chart_generation, "price fetch issued");

        Some(FetchRequest::Prices {
            ticker: self.ticker.clone(),
            ticket: PriceTicket {
                session: self.id,
                generation: self.chart_generation,
                range,
            },
        })
    }

    /// Request indicators unless already loaded or in flight.
    pub fn load_indicators(&mut self) -> Option<FetchRequest> {
        if self.closed || !self.indicators.is_empty() || self.indicators_pending {
            return None;
        }

        self.indicators_state = LoadingState::Fetching;
        self.indicators_pending = true;
        self.events.push(SessionEvent::IndicatorsFetching);
        debug!(ticker = %self.ticker, generation = self.indicators_generation, "indicator fetch issued");

        Some(FetchRequest::Indicators {
            ticker: self.ticker.clone(),
            ticket: IndicatorTicket {
                session: self.id,
                generation: self.indicators_generation,
            },
        })
    }

    /// Drop every cached range and fetch the selected one again.
    pub fn reload_chart(&mut self) -> Option<FetchRequest> {
        self.dataset.clear();
        self.pending_ranges.clear();
        self.chart_generation += 1;
        self.load_chart()
    }

    /// Drop the indicator list and fetch it again.
    pub fn reload_indicators(&mut self) -> Option<FetchRequest> {
        self.indicators.clear();
        self.indicators_pending = false;
        self.indicators_generation += 1;
        self.load_indicators()
    }

    /// Change the selected range and load it.
    ///
    /// Switching to a range that is already cached shows it as loaded right
    /// away; switching to one with a fetch in flight shows it as fetching.
    pub fn select_range(&mut self, range: TimeRange) -> Option<FetchRequest> {
        if self.closed {
            return None;
        }
        if range != self.selected_range {
            self.selected_range = range;
            self.events.push(SessionEvent::RangeSelected(range));
            if self.dataset.contains(range) {
                self.chart_state = LoadingState::Loaded;
            } else if self.pending_ranges.contains(&range) {
                self.chart_state = LoadingState::Fetching;
            }
        }
        self.load_chart()
    }

    // ── Completions ────────────────────────────────────────────────────

    /// Apply a finished fetch. Returns false if the completion was stale.
    pub fn apply(&mut self, completion: FetchCompletion) -> bool {
        match completion {
            FetchCompletion::Prices { ticket, result } => self.apply_prices(ticket, result),
            FetchCompletion::Indicators { ticket, result } => self.apply_indicators(ticket, result),
        }
    }

    fn apply_prices(&mut self, ticket: PriceTicket, result: Result<Vec<ChartPoint>, ProviderError>) -> bool {
        if self.closed || ticket.session != self.id || ticket.generation != self.chart_generation {
            debug!(ticker = %self.ticker, range = %ticket.range, "stale price completion discarded");
            return false;
        }
        let range = ticket.range;
        self.pending_ranges.remove(&range);

        match result {
            Ok(points) => {
                self.dataset.insert(range, points);
                let visible = range == self.selected_range;
                if visible {
                    self.chart_state = LoadingState::Loaded;
                }
                self.events.push(SessionEvent::ChartStored { range, visible });
            }
            Err(error) => {
                warn!(ticker = %self.ticker, %range, %error, "price fetch failed");
                self.chart_state = LoadingState::Error(error.clone());
                self.events.push(SessionEvent::ChartFailed { range, error });
            }
        }
        true
    }

    fn apply_indicators(&mut self, ticket: IndicatorTicket, result: Result<IndicatorsPayload, ProviderError>) -> bool {
        if self.closed || ticket.session != self.id || ticket.generation != self.indicators_generation {
            debug!(ticker = %self.ticker, "stale indicator completion discarded");
            return false;
        }
        self.indicators_pending = false;

        match result {
            Ok(payload) => {
                self.short_name = Some(payload.short_name);
                self.full_name = Some(payload.full_name);
                self.indicators = payload.indicators;
                self.indicators_state = LoadingState::Loaded;
                self.events.push(SessionEvent::IndicatorsLoaded {
                    count: self.indicators.len(),
                });
            }
            Err(error) => {
                warn!(ticker = %self.ticker, %error, "indicator fetch failed");
                self.indicators_state = LoadingState::Error(error.clone());
                self.events.push(SessionEvent::IndicatorsFailed(error));
            }
        }
        true
    }

    // ── Lifecycle ──────────────────────────────────────────────────────

    /// Tear the session down. Later completions are ignored.
    pub fn close(&mut self) {
        self.closed = true;
        self.pending_ranges.clear();
        self.indicators_pending = false;
        self.events.clear();
    }

    /// Drain published events, oldest first.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn points(n: i64) -> Vec<ChartPoint> {
        (0..n)
            .map(|i| ChartPoint::new(Utc.timestamp_opt(i * 60, 0).unwrap(), 100.0 + i as f64))
            .collect()
    }

    fn price_ticket(request: FetchRequest) -> PriceTicket {
        match request {
            FetchRequest::Prices { ticket, .. } => ticket,
            other => panic!("expected price request, got {other:?}"),
        }
    }

    fn indicator_ticket(request: FetchRequest) -> IndicatorTicket {
        match request {
            FetchRequest::Indicators { ticket, .. } => ticket,
            other => panic!("expected indicator request, got {other:?}"),
        }
    }

    #[test]
    fn starts_fetching_with_default_range() {
        let session = DetailsSession::new("SBER");
        assert_eq!(session.selected_range(), TimeRange::Month);
        assert!(session.chart_state().is_fetching());
        assert!(session.indicators_state().is_fetching());
        assert!(session.chart_points().is_empty());
    }

    #[test]
    fn second_load_while_in_flight_is_noop() {
        let mut session = DetailsSession::new("SBER");
        assert!(session.load_chart().is_some());
        assert!(session.load_chart().is_none());
        assert!(session.is_range_pending(TimeRange::Month));
    }

    #[test]
    fn cached_range_is_not_refetched() {
        let mut session = DetailsSession::new("SBER");
        let ticket = price_ticket(session.load_chart().unwrap());
        assert!(session.apply(FetchCompletion::Prices { ticket, result: Ok(points(3)) }));
        assert_eq!(session.chart_state(), &LoadingState::Loaded);
        assert!(session.load_chart().is_none());
        assert_eq!(session.chart_points().len(), 3);
    }

    #[test]
    fn empty_series_loads_as_no_data() {
        let mut session = DetailsSession::new("SBER");
        let ticket = price_ticket(session.load_chart().unwrap());
        session.apply(FetchCompletion::Prices { ticket, result: Ok(Vec::new()) });
        assert_eq!(session.chart_state(), &LoadingState::Loaded);
        assert!(session.chart_points().is_empty());
        assert!(session.load_chart().is_none());
    }

    #[test]
    fn stale_range_completion_is_stored_without_touching_state() {
        let mut session = DetailsSession::with_range("SBER", TimeRange::Week);
        let week = price_ticket(session.load_chart().unwrap());
        let day = price_ticket(session.select_range(TimeRange::Day).unwrap());
        assert_eq!(day.range, TimeRange::Day);

        assert!(session.apply(FetchCompletion::Prices { ticket: week, result: Ok(points(5)) }));
        assert!(session.dataset().contains(TimeRange::Week));
        assert!(session.chart_state().is_fetching());

        assert!(session.apply(FetchCompletion::Prices { ticket: day, result: Ok(points(2)) }));
        assert_eq!(session.chart_state(), &LoadingState::Loaded);
    }

    #[test]
    fn selecting_cached_range_shows_loaded() {
        let mut session = DetailsSession::with_range("SBER", TimeRange::Week);
        let week = price_ticket(session.load_chart().unwrap());
        session.apply(FetchCompletion::Prices { ticket: week, result: Ok(points(5)) });
        let _day = session.select_range(TimeRange::Day).unwrap();
        assert!(session.chart_state().is_fetching());

        assert!(session.select_range(TimeRange::Week).is_none());
        assert_eq!(session.chart_state(), &LoadingState::Loaded);
        assert_eq!(session.chart_points().len(), 5);
    }

    #[test]
    fn failure_sets_error_even_for_other_range() {
        let mut session = DetailsSession::with_range("SBER", TimeRange::Week);
        let week = price_ticket(session.load_chart().unwrap());
        session.select_range(TimeRange::Day);
        let error = ProviderError::NetworkUnreachable("down".into());
        session.apply(FetchCompletion::Prices { ticket: week, result: Err(error.clone()) });
        assert_eq!(session.chart_state(), &LoadingState::Error(error));
        assert!(!session.dataset().contains(TimeRange::Week));
    }

    #[test]
    fn reload_refetches_and_discards_older_generation() {
        let mut session = DetailsSession::new("SBER");
        let first = price_ticket(session.load_chart().unwrap());
        let second = price_ticket(session.reload_chart().unwrap());
        assert_ne!(first.generation, second.generation);

        assert!(!session.apply(FetchCompletion::Prices { ticket: first, result: Ok(points(1)) }));
        assert!(!session.dataset().contains(TimeRange::Month));
        assert!(session.apply(FetchCompletion::Prices { ticket: second, result: Ok(points(4)) }));
        assert_eq!(session.chart_points().len(), 4);

        // cached, but reload still fetches and drops every range
        assert!(session.reload_chart().is_some());
        assert!(session.dataset().is_empty());
    }

    #[test]
    fn closed_session_ignores_completions() {
        let mut session = DetailsSession::new("SBER");
        let ticket = price_ticket(session.load_chart().unwrap());
        session.close();
        assert!(!session.apply(FetchCompletion::Prices { ticket, result: Ok(points(2)) }));
        assert!(session.load_chart().is_none());
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn other_session_ticket_is_ignored() {
        let mut a = DetailsSession::new("SBER");
        let mut b = DetailsSession::new("SBER");
        let ticket = price_ticket(a.load_chart().unwrap());
        b.load_chart();
        assert!(!b.apply(FetchCompletion::Prices { ticket, result: Ok(points(2)) }));
        assert!(b.chart_state().is_fetching());
    }

    #[test]
    fn indicators_load_once_and_populate_names() {
        let mut session = DetailsSession::new("SBER");
        let ticket = indicator_ticket(session.load_indicators().unwrap());
        assert!(session.load_indicators().is_none());

        let payload = IndicatorsPayload {
            short_name: "Sberbank".into(),
            full_name: "Sberbank of Russia PJSC".into(),
            indicators: vec![Indicator::new("P/E", Some(4.0), Some(1))],
        };
        assert!(session.apply(FetchCompletion::Indicators { ticket, result: Ok(payload) }));
        assert_eq!(session.indicators_state(), &LoadingState::Loaded);
        assert_eq!(session.short_name(), Some("Sberbank"));
        assert!(session.load_indicators().is_none());
    }

    #[test]
    fn indicator_failure_then_reload() {
        let mut session = DetailsSession::new("SBER");
        let ticket = indicator_ticket(session.load_indicators().unwrap());
        let error = ProviderError::Other("boom".into());
        session.apply(FetchCompletion::Indicators { ticket, result: Err(error.clone()) });
        assert_eq!(session.indicators_state().error(), Some(&error));
        assert!(session.reload_indicators().is_some());
        assert!(session.indicators_state().is_fetching());
    }

    #[test]
    fn view_filters_and_sorts_while_tally_counts_all() {
        let mut session = DetailsSession::new("SBER");
        let ticket = indicator_ticket(session.load_indicators().unwrap());
        let payload = IndicatorsPayload {
            short_name: String::new(),
            full_name: String::new(),
            indicators: vec![
                Indicator::new("B", Some(5.0), Some(-1)),
                Indicator::new("A", None, Some(1)),
            ],
        };
        session.apply(FetchCompletion::Indicators { ticket, result: Ok(payload) });

        let view: Vec<&str> = session.indicators_for_view().iter().map(|i| i.kind.as_str()).collect();
        assert_eq!(view, vec!["B"]);
        let tally = session.pros_cons();
        assert_eq!((tally.pros, tally.cons, tally.sum()), (1, 1, 2));
    }

    #[test]
    fn events_are_published_in_order() {
        let mut session = DetailsSession::new("SBER");
        let ticket = price_ticket(session.load_chart().unwrap());
        session.apply(FetchCompletion::Prices { ticket, result: Ok(points(1)) });
        assert_eq!(
            session.take_events(),
            vec![
                SessionEvent::ChartFetching(TimeRange::Month),
                SessionEvent::ChartStored {
                    range: TimeRange::Month,
                    visible: true
                },
            ]
        );
        assert!(session.take_events().is_empty());
    }
}
