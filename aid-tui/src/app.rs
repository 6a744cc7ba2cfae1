//! Application state: single owner, main thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels;
//! details completions are routed into the open session, which decides
//! whether they still matter.

use std::cell::Cell;
use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use aid_core::chart::{nearest, ChartDomain, ChartSelection};
use aid_core::config::AppConfig;
use aid_core::details::{DetailsSession, FetchCompletion, FetchRequest, SessionEvent};
use aid_core::domain::{Page, TimeRange};
use aid_core::{CarouselController, Favourites};

use crate::worker::{WorkerCommand, WorkerResponse};

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Main,
    Favourites,
    Details,
}

impl Screen {
    pub fn label(self) -> &'static str {
        match self {
            Screen::Main => "Companies",
            Screen::Favourites => "Favourites",
            Screen::Details => "Details",
        }
    }
}

/// Popups drawn over the active screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Help,
    /// Explanation of the indicator at this row of the details list.
    Indicator(usize),
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Screen regions recorded while drawing, used to map mouse positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitAreas {
    pub carousel: Rect,
    /// Plot area of the price chart, excluding axis labels.
    pub chart: Rect,
}

/// An open details screen.
pub struct DetailsView {
    pub session: DetailsSession,
    pub selection: ChartSelection,
    pub indicator_cursor: usize,
    /// Screen to go back to on close.
    pub return_to: Screen,
}

impl DetailsView {
    /// Move the chart pointer to a horizontal fraction of the plot.
    pub fn point_at_fraction(&mut self, fraction: f64) {
        let points = self.session.chart_points();
        match ChartDomain::of(points) {
            Some(domain) => {
                self.selection.point_at(points, domain.time_at(fraction));
            }
            None => self.selection.clear(),
        }
    }

    /// Keyboard scrubbing: move the pointer `delta` points along the series.
    ///
    /// Starting without a selection picks the last point.
    pub fn step_pointer(&mut self, delta: isize) {
        let points = self.session.chart_points();
        if points.is_empty() {
            self.selection.clear();
            return;
        }
        let current = self
            .selection
            .position()
            .and_then(|t| nearest(points, t))
            .and_then(|p| points.iter().position(|q| q == p));
        let target = match current {
            Some(i) => i.saturating_add_signed(delta).min(points.len() - 1),
            None => points.len() - 1,
        };
        self.selection.point_at(points, points[target].timestamp);
    }

    pub fn move_indicator_cursor(&mut self, delta: isize) {
        let count = self.session.indicators_for_view().len();
        if count == 0 {
            self.indicator_cursor = 0;
            return;
        }
        self.indicator_cursor = self.indicator_cursor.saturating_add_signed(delta).min(count - 1);
    }
}

/// Top-level application state.
pub struct AppState {
    pub running: bool,
    pub screen: Screen,
    pub overlay: Overlay,
    pub config: AppConfig,

    pub carousel: CarouselController,
    pub companies: Vec<Page>,
    pub companies_loading: bool,
    /// Column where the current mouse drag started.
    pub drag_origin: Option<u16>,
    animation_started: Option<Instant>,

    pub favourites: Favourites,
    pub favourites_cursor: usize,

    pub details: Option<DetailsView>,

    pub status_message: Option<(String, StatusLevel)>,
    pub hit_areas: Cell<HitAreas>,

    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
}

impl AppState {
    pub fn new(config: AppConfig, worker_tx: Sender<WorkerCommand>, worker_rx: Receiver<WorkerResponse>) -> Self {
        Self {
            running: true,
            screen: Screen::Main,
            overlay: Overlay::None,
            carousel: CarouselController::new(config.carousel.clone()),
            config,
            companies: Vec::new(),
            companies_loading: false,
            drag_origin: None,
            animation_started: None,
            favourites: Favourites::new(),
            favourites_cursor: 0,
            details: None,
            status_message: None,
            hit_areas: Cell::new(HitAreas::default()),
            worker_tx,
            worker_rx,
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }

    fn send(&mut self, command: WorkerCommand) {
        if self.worker_tx.send(command).is_err() {
            warn!("fetch worker is gone");
            self.set_error("Background worker stopped");
        }
    }

    fn dispatch(&mut self, request: Option<FetchRequest>) {
        if let Some(request) = request {
            self.send(WorkerCommand::Fetch(request));
        }
    }

    // ── Companies / carousel ─────────────────────────────────────────

    pub fn request_companies(&mut self) {
        self.companies_loading = true;
        self.send(WorkerCommand::LoadCompanies);
    }

    pub fn set_companies(&mut self, pages: Vec<Page>) {
        info!(count = pages.len(), "companies loaded");
        if pages.is_empty() {
            self.set_warning("Provider returned no companies");
        }
        self.companies_loading = false;
        self.companies = pages.clone();
        self.carousel.configure(pages);
        self.drag_origin = None;
        self.animation_started = None;
    }

    /// Display name for a ticker, falling back to the ticker itself.
    pub fn company(&self, ticker: &str) -> Page {
        self.companies
            .iter()
            .find(|p| p.ticker == ticker)
            .cloned()
            .unwrap_or_else(|| Page::new(ticker, ticker, ""))
    }

    pub fn favourite_pages(&self) -> Vec<Page> {
        self.favourites.iter().map(|t| self.company(t)).collect()
    }

    /// Advance time-based state: settle a finished carousel animation.
    pub fn tick(&mut self, now: Instant) {
        if !self.carousel.phase().is_animating() {
            self.animation_started = None;
            return;
        }
        let started = *self.animation_started.get_or_insert(now);
        if now.duration_since(started) >= Duration::from_millis(self.config.carousel.animation_ms) {
            self.carousel.finish_animation();
            self.animation_started = None;
        }
    }

    // ── Favourites ───────────────────────────────────────────────────

    /// Toggle a ticker's favourite flag. Returns the new membership.
    pub fn toggle_favourite(&mut self, ticker: &str) -> bool {
        let now_favourite = self.favourites.toggle(ticker);
        if now_favourite {
            self.set_status(format!("{ticker} added to favourites"));
        } else {
            self.set_status(format!("{ticker} removed from favourites"));
        }
        self.clamp_favourites_cursor();
        now_favourite
    }

    pub fn move_favourites_cursor(&mut self, delta: isize) {
        let len = self.favourites.len();
        if len == 0 {
            self.favourites_cursor = 0;
        } else {
            self.favourites_cursor = self.favourites_cursor.saturating_add_signed(delta).min(len - 1);
        }
    }

    fn clamp_favourites_cursor(&mut self) {
        self.favourites_cursor = self.favourites_cursor.min(self.favourites.len().saturating_sub(1));
    }

    pub fn favourite_under_cursor(&self) -> Option<String> {
        self.favourites.iter().nth(self.favourites_cursor).map(str::to_string)
    }

    // ── Details ──────────────────────────────────────────────────────

    /// Open the details screen for `ticker`, fetching the default range
    /// and the indicators.
    pub fn open_details(&mut self, ticker: &str) {
        let return_to = match self.details.take() {
            Some(mut previous) => {
                previous.session.close();
                previous.return_to
            }
            None => self.screen,
        };
        let mut session = DetailsSession::with_range(ticker, self.config.details.default_range);
        let chart = session.load_chart();
        let indicators = session.load_indicators();
        info!(ticker, session = %session.id(), "details opened");
        self.details = Some(DetailsView {
            session,
            selection: ChartSelection::default(),
            indicator_cursor: 0,
            return_to,
        });
        self.screen = Screen::Details;
        self.overlay = Overlay::None;
        self.dispatch(chart);
        self.dispatch(indicators);
    }

    /// Screen the open details view was entered from.
    pub fn details_origin(&self) -> Option<Screen> {
        self.details.as_ref().map(|v| v.return_to)
    }

    pub fn close_details(&mut self) {
        if let Some(mut view) = self.details.take() {
            view.session.close();
            debug!(ticker = view.session.ticker(), "details closed");
            self.screen = view.return_to;
        } else {
            self.screen = Screen::Main;
        }
        self.overlay = Overlay::None;
        self.clamp_favourites_cursor();
    }

    pub fn select_range(&mut self, range: TimeRange) {
        let request = match self.details.as_mut() {
            Some(view) => {
                view.selection.clear();
                view.session.select_range(range)
            }
            None => return,
        };
        self.dispatch(request);
    }

    pub fn reload_chart(&mut self) {
        let request = match self.details.as_mut() {
            Some(view) => {
                view.selection.clear();
                view.session.reload_chart()
            }
            None => return,
        };
        self.dispatch(request);
    }

    pub fn reload_indicators(&mut self) {
        let request = match self.details.as_mut() {
            Some(view) => {
                view.indicator_cursor = 0;
                view.session.reload_indicators()
            }
            None => return,
        };
        self.dispatch(request);
    }

    // ── Worker responses ─────────────────────────────────────────────

    pub fn handle_worker_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::Companies(pages) => self.set_companies(pages),
            WorkerResponse::Completed(completion) => self.apply_completion(completion),
        }
    }

    fn apply_completion(&mut self, completion: FetchCompletion) {
        let Some(view) = self.details.as_mut() else {
            debug!(session = %completion.session(), "completion with no details screen open");
            return;
        };
        if !view.session.apply(completion) {
            return;
        }
        let events = view.session.take_events();
        // A pointer resolved against the previous series may now be off-domain.
        if let Some(position) = view.selection.position() {
            let points = view.session.chart_points();
            if points.is_empty() {
                view.selection.clear();
            } else {
                view.selection.point_at(points, position);
            }
        }
        view.move_indicator_cursor(0);

        for event in events {
            match event {
                SessionEvent::ChartFailed { range, error } => {
                    self.set_error(format!("Chart ({range}) failed: {error}"));
                }
                SessionEvent::IndicatorsFailed(error) => {
                    self.set_error(format!("Indicators failed: {error}"));
                }
                SessionEvent::IndicatorsLoaded { count } => {
                    self.set_status(format!("{count} indicators loaded"));
                }
                SessionEvent::ChartStored { range, visible: false } => {
                    debug!(%range, "cached off-screen range");
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::mpsc;

    pub struct Harness {
        pub app: AppState,
        pub commands: Receiver<WorkerCommand>,
        pub responses: Sender<WorkerResponse>,
    }

    impl Harness {
        /// Drain every command sent so far.
        pub fn sent(&self) -> Vec<WorkerCommand> {
            self.commands.try_iter().collect()
        }
    }

    pub fn harness() -> Harness {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let mut config = AppConfig::default();
        config.carousel.page_width = 100.0;
        Harness {
            app: AppState::new(config, cmd_tx, resp_rx),
            commands: cmd_rx,
            responses: resp_tx,
        }
    }

    pub fn pages(n: usize) -> Vec<Page> {
        (0..n)
            .map(|i| Page::new(format!("T{i}"), format!("Company {i}"), "Sector"))
            .collect()
    }
}
