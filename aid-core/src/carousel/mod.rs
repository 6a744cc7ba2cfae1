//! Swipeable page carousel: gesture state machine over an ordered page set.
//!
//! The controller owns one [`PageView`] per page and moves them in response
//! to horizontal drag phases:
//!
//! ```text
//!            Began              Ended (|dx| > commit)
//!   Idle ─────────────► Dragging ─────────────────────► Committing ──┐
//!    ▲                     │  Ended (short) / Cancelled               │
//!    │                     └──────────────────────────► Cancelling ──┤
//!    └──────────────────── finish_animation() ◄───────────────────────┘
//! ```
//!
//! Positions and visibility flags are the only output. Animating between the
//! old and new positions belongs to the presentation layer, which reports the
//! end of the animation through [`CarouselController::finish_animation`].

mod geometry;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CarouselConfig;
use crate::domain::Page;

pub use geometry::Point;

/// Phase of a horizontal drag gesture, as delivered by the host toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragPhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

/// Where the gesture state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GesturePhase {
    Idle,
    Dragging { translation: f64 },
    /// Settling towards `to`; `from` slides off-screen.
    Committing { from: usize, to: usize },
    /// Settling back onto `active`; `candidate` slides off-screen.
    Cancelling { active: usize, candidate: usize },
}

impl GesturePhase {
    pub fn is_animating(&self) -> bool {
        matches!(self, GesturePhase::Committing { .. } | GesturePhase::Cancelling { .. })
    }
}

/// Keyboard-style swipe direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwipeDirection {
    /// Reveal the following page (leftward drag).
    Next,
    /// Reveal the preceding page (rightward drag).
    Previous,
}

/// Observable visual state of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub page: Page,
    pub center: Point,
    pub hidden: bool,
}

pub struct CarouselController {
    config: CarouselConfig,
    views: Vec<PageView>,
    active: usize,
    rest: Point,
    anchor: Point,
    drag_offset: f64,
    phase: GesturePhase,
}

impl CarouselController {
    pub fn new(config: CarouselConfig) -> Self {
        Self {
            config,
            views: Vec::new(),
            active: 0,
            rest: Point::default(),
            anchor: Point::default(),
            drag_offset: 0.0,
            phase: GesturePhase::Idle,
        }
    }

    /// Replace every page and reset to the first one.
    pub fn configure(&mut self, pages: Vec<Page>) {
        self.views = pages
            .into_iter()
            .map(|page| PageView {
                page,
                center: self.rest,
                hidden: true,
            })
            .collect();
        if let Some(first) = self.views.first_mut() {
            first.hidden = false;
        }
        self.active = 0;
        self.anchor = self.rest;
        self.drag_offset = 0.0;
        self.phase = GesturePhase::Idle;
    }

    /// Resize pages, e.g. after the terminal changed size.
    pub fn set_page_width(&mut self, width: f64) {
        if width > 0.0 {
            self.config.page_width = width;
        }
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_page(&self) -> Option<&Page> {
        self.views.get(self.active).map(|v| &v.page)
    }

    pub fn page_views(&self) -> &[PageView] {
        &self.views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// An empty carousel renders a placeholder instead of pages.
    pub fn is_placeholder(&self) -> bool {
        self.views.is_empty()
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn drag_offset(&self) -> f64 {
        self.drag_offset
    }

    /// `(current page, page count)`, 1-based, for the page indicator dots.
    pub fn page_indicator(&self) -> (usize, usize) {
        if self.views.is_empty() {
            (0, 0)
        } else {
            (self.active + 1, self.views.len())
        }
    }

    /// Index of the page a drag with this translation would reveal.
    ///
    /// Leftward drags move forward, everything else moves back; the index
    /// wraps in both directions. For a single page this is the active page.
    pub fn candidate_index(&self, translation: f64) -> usize {
        let count = self.views.len().max(1) as isize;
        let direction: isize = if translation < 0.0 { 1 } else { -1 };
        (self.active as isize + direction).rem_euclid(count) as usize
    }

    /// Distance a page travels to leave the viewport.
    fn travel(&self) -> f64 {
        self.config.page_width + self.config.page_spacing
    }

    pub fn handle_drag(&mut self, phase: DragPhase, translation: f64) {
        if self.views.is_empty() {
            return;
        }
        match phase {
            DragPhase::Began => self.begin(),
            DragPhase::Changed => self.update(translation),
            DragPhase::Ended => self.end(translation),
            DragPhase::Cancelled => self.cancel(translation),
        }
    }

    fn begin(&mut self) {
        if self.phase.is_animating() {
            self.finish_animation();
        }
        if matches!(self.phase, GesturePhase::Dragging { .. }) {
            // previous gesture never ended: snap it back without animating
            self.keep_visible(self.active, self.active);
        }
        self.anchor = self.rest;
        self.views[self.active].center = self.rest;
        self.drag_offset = 0.0;
        self.phase = GesturePhase::Dragging { translation: 0.0 };
    }

    fn update(&mut self, translation: f64) {
        if !matches!(self.phase, GesturePhase::Dragging { .. }) {
            self.begin();
        }
        self.phase = GesturePhase::Dragging { translation };
        self.drag_offset = translation;

        let active = self.active;
        self.views[active].center = Point::new(self.anchor.x + translation, self.anchor.y);

        let candidate = self.candidate_index(translation);
        if candidate == active {
            return;
        }

        let revealed = translation.abs() > self.config.reveal_threshold;
        self.keep_visible(active, if revealed { candidate } else { active });
        if revealed {
            let side = if translation < 0.0 { 1.0 } else { -1.0 };
            let x = self.views[active].center.x + side * self.travel();
            self.views[candidate].center = Point::new(x, self.anchor.y);
        }
    }

    fn end(&mut self, translation: f64) {
        if !matches!(self.phase, GesturePhase::Dragging { .. }) {
            return;
        }
        let active = self.active;
        let candidate = self.candidate_index(translation);
        let distance = translation.abs();
        let commits = candidate != active
            && distance > self.config.reveal_threshold
            && distance > self.config.page_width * self.config.commit_fraction;

        if !commits {
            self.settle_back(translation);
            return;
        }

        let side = if translation > 0.0 { 1.0 } else { -1.0 };
        self.keep_visible(active, candidate);
        self.views[candidate].center = self.anchor;
        self.views[active].center = Point::new(self.anchor.x + side * self.travel(), self.anchor.y);
        self.drag_offset = 0.0;
        self.phase = GesturePhase::Committing {
            from: active,
            to: candidate,
        };
        debug!(from = active, to = candidate, translation, "carousel swipe committed");
    }

    fn cancel(&mut self, translation: f64) {
        if matches!(self.phase, GesturePhase::Dragging { .. }) {
            self.settle_back(translation);
        }
    }

    fn settle_back(&mut self, translation: f64) {
        let active = self.active;
        let candidate = self.candidate_index(translation);
        // a page revealed on the other side of the origin is not this candidate
        for (i, view) in self.views.iter_mut().enumerate() {
            if i != active && i != candidate {
                view.hidden = true;
            }
        }
        self.views[active].center = self.anchor;
        if candidate != active {
            let side = if translation > 0.0 { -1.0 } else { 1.0 };
            self.views[candidate].center = Point::new(self.anchor.x + side * self.travel(), self.anchor.y);
        }
        self.drag_offset = 0.0;
        self.phase = GesturePhase::Cancelling { active, candidate };
    }

    /// Show `active` and `candidate`, hide every other page.
    fn keep_visible(&mut self, active: usize, candidate: usize) {
        for (i, view) in self.views.iter_mut().enumerate() {
            view.hidden = !(i == active || i == candidate);
        }
    }

    /// Apply the end-of-animation effects of a commit or cancel.
    pub fn finish_animation(&mut self) {
        match self.phase {
            GesturePhase::Committing { from, to } => {
                self.views[from].hidden = true;
                self.views[to].hidden = false;
                self.active = to;
            }
            GesturePhase::Cancelling { active, candidate } => {
                if candidate != active {
                    self.views[candidate].hidden = true;
                }
            }
            GesturePhase::Idle | GesturePhase::Dragging { .. } => return,
        }
        self.phase = GesturePhase::Idle;
    }

    /// Run a full committing swipe, as if the user dragged half a page.
    ///
    /// Returns false when nothing can move (empty or single page) or while a
    /// pointer drag is in progress.
    pub fn step(&mut self, direction: SwipeDirection) -> bool {
        if self.views.len() < 2 || matches!(self.phase, GesturePhase::Dragging { .. }) {
            return false;
        }
        let half = self.config.page_width / 2.0 + self.config.reveal_threshold;
        let translation = match direction {
            SwipeDirection::Next => -half,
            SwipeDirection::Previous => half,
        };
        self.handle_drag(DragPhase::Began, 0.0);
        self.handle_drag(DragPhase::Changed, translation);
        self.handle_drag(DragPhase::Ended, translation);
        matches!(self.phase, GesturePhase::Committing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(n: usize) -> Vec<Page> {
        (0..n)
            .map(|i| Page::new(format!("T{i}"), format!("Company {i}"), "Sector"))
            .collect()
    }

    fn carousel(n: usize) -> CarouselController {
        let mut c = CarouselController::new(CarouselConfig {
            page_width: 100.0,
            page_spacing: 20.0,
            ..CarouselConfig::default()
        });
        c.configure(pages(n));
        c
    }

    fn visible(c: &CarouselController) -> Vec<usize> {
        c.page_views()
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.hidden)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn configure_shows_only_first_page() {
        let c = carousel(3);
        assert_eq!(c.active_index(), 0);
        assert_eq!(visible(&c), vec![0]);
        assert_eq!(c.page_indicator(), (1, 3));
    }

    #[test]
    fn configure_resets_active_index() {
        let mut c = carousel(3);
        assert!(c.step(SwipeDirection::Next));
        c.finish_animation();
        assert_eq!(c.active_index(), 1);
        c.configure(pages(2));
        assert_eq!(c.active_index(), 0);
        assert_eq!(visible(&c), vec![0]);
    }

    #[test]
    fn candidate_wraps_both_ways() {
        let c = carousel(3);
        assert_eq!(c.candidate_index(-5.0), 1);
        assert_eq!(c.candidate_index(5.0), 2);
        assert_eq!(carousel(1).candidate_index(-5.0), 0);
        assert_eq!(carousel(1).candidate_index(5.0), 0);
    }

    #[test]
    fn small_drag_moves_page_but_keeps_candidate_hidden() {
        let mut c = carousel(3);
        c.handle_drag(DragPhase::Began, 0.0);
        c.handle_drag(DragPhase::Changed, -8.0);
        assert_eq!(c.page_views()[0].center.x, -8.0);
        assert_eq!(visible(&c), vec![0]);
        c.handle_drag(DragPhase::Ended, -8.0);
        c.finish_animation();
        assert_eq!(c.active_index(), 0);
        assert_eq!(c.page_views()[0].center, Point::default());
    }

    #[test]
    fn drag_past_threshold_reveals_neighbour_outside_bound() {
        let mut c = carousel(3);
        c.handle_drag(DragPhase::Began, 0.0);
        c.handle_drag(DragPhase::Changed, -15.0);
        assert_eq!(visible(&c), vec![0, 1]);
        // active at -15, neighbour one page + spacing to the right
        assert_eq!(c.page_views()[1].center.x, -15.0 + 120.0);

        c.handle_drag(DragPhase::Changed, 15.0);
        assert_eq!(visible(&c), vec![0, 2]);
        assert_eq!(c.page_views()[2].center.x, 15.0 - 120.0);
    }

    #[test]
    fn leftward_commit_advances() {
        let mut c = carousel(3);
        c.handle_drag(DragPhase::Began, 0.0);
        c.handle_drag(DragPhase::Changed, -30.0);
        c.handle_drag(DragPhase::Ended, -30.0);
        assert_eq!(c.phase(), GesturePhase::Committing { from: 0, to: 1 });
        // new page at the anchor, old page pushed off to the left
        assert_eq!(c.page_views()[1].center, Point::default());
        assert_eq!(c.page_views()[0].center.x, -120.0);
        // index changes only once the animation completes
        assert_eq!(c.active_index(), 0);
        c.finish_animation();
        assert_eq!(c.active_index(), 1);
        assert_eq!(visible(&c), vec![1]);
        assert_eq!(c.phase(), GesturePhase::Idle);
    }

    #[test]
    fn rightward_commit_wraps_to_last() {
        let mut c = carousel(3);
        c.handle_drag(DragPhase::Began, 0.0);
        c.handle_drag(DragPhase::Changed, 40.0);
        c.handle_drag(DragPhase::Ended, 40.0);
        c.finish_animation();
        assert_eq!(c.active_index(), 2);
        assert_eq!(c.page_views()[0].center.x, 120.0);
    }

    #[test]
    fn short_release_cancels_and_returns_candidate_offscreen() {
        let mut c = carousel(3);
        c.handle_drag(DragPhase::Began, 0.0);
        c.handle_drag(DragPhase::Changed, -20.0);
        c.handle_drag(DragPhase::Ended, -20.0);
        assert_eq!(c.phase(), GesturePhase::Cancelling { active: 0, candidate: 1 });
        assert_eq!(c.page_views()[0].center, Point::default());
        assert_eq!(c.page_views()[1].center.x, 120.0);
        c.finish_animation();
        assert_eq!(c.active_index(), 0);
        assert_eq!(visible(&c), vec![0]);
    }

    #[test]
    fn cancelled_gesture_snaps_back() {
        let mut c = carousel(2);
        c.handle_drag(DragPhase::Began, 0.0);
        c.handle_drag(DragPhase::Changed, -60.0);
        c.handle_drag(DragPhase::Cancelled, -60.0);
        c.finish_animation();
        assert_eq!(c.active_index(), 0);
        assert_eq!(visible(&c), vec![0]);
    }

    #[test]
    fn single_page_never_transitions() {
        let mut c = carousel(1);
        for dx in [-500.0, -30.0, 30.0, 500.0] {
            c.handle_drag(DragPhase::Began, 0.0);
            c.handle_drag(DragPhase::Changed, dx);
            c.handle_drag(DragPhase::Ended, dx);
            c.finish_animation();
            assert_eq!(c.active_index(), 0);
            assert!(!c.page_views()[0].hidden);
            assert_eq!(c.page_views()[0].center, Point::default());
        }
        assert!(!c.step(SwipeDirection::Next));
    }

    #[test]
    fn empty_carousel_ignores_drags() {
        let mut c = carousel(0);
        assert!(c.is_placeholder());
        c.handle_drag(DragPhase::Began, 0.0);
        c.handle_drag(DragPhase::Changed, -50.0);
        c.handle_drag(DragPhase::Ended, -50.0);
        c.finish_animation();
        assert_eq!(c.phase(), GesturePhase::Idle);
        assert_eq!(c.page_indicator(), (0, 0));
        assert!(c.active_page().is_none());
    }

    #[test]
    fn begin_during_animation_settles_first() {
        let mut c = carousel(3);
        assert!(c.step(SwipeDirection::Next));
        c.handle_drag(DragPhase::Began, 0.0);
        assert_eq!(c.active_index(), 1);
        assert_eq!(c.anchor, Point::default());
    }

    #[test]
    fn end_without_drag_is_ignored() {
        let mut c = carousel(3);
        c.handle_drag(DragPhase::Ended, -80.0);
        assert_eq!(c.phase(), GesturePhase::Idle);
        assert_eq!(c.active_index(), 0);
    }

    #[test]
    fn second_began_mid_drag_keeps_rest_position() {
        let mut c = carousel(3);
        c.handle_drag(DragPhase::Began, 0.0);
        c.handle_drag(DragPhase::Changed, -8.0);
        c.handle_drag(DragPhase::Began, 0.0);
        assert_eq!(c.page_views()[0].center, Point::default());
        c.handle_drag(DragPhase::Changed, -5.0);
        c.handle_drag(DragPhase::Ended, -5.0);
        c.finish_animation();
        assert_eq!(c.active_index(), 0);
        assert_eq!(c.page_views()[0].center, Point::default());
        assert_eq!(visible(&c), vec![0]);
    }

    #[test]
    fn second_began_hides_page_revealed_by_abandoned_drag() {
        let mut c = carousel(3);
        c.handle_drag(DragPhase::Began, 0.0);
        c.handle_drag(DragPhase::Changed, -40.0);
        assert_eq!(visible(&c), vec![0, 1]);
        c.handle_drag(DragPhase::Began, 0.0);
        assert_eq!(visible(&c), vec![0]);
    }

    #[test]
    fn step_during_drag_is_ignored() {
        let mut c = carousel(3);
        c.handle_drag(DragPhase::Began, 0.0);
        c.handle_drag(DragPhase::Changed, -8.0);
        assert!(!c.step(SwipeDirection::Next));
        assert_eq!(c.phase(), GesturePhase::Dragging { translation: -8.0 });
        c.handle_drag(DragPhase::Ended, 0.0);
        c.finish_animation();
        assert_eq!(c.active_index(), 0);
        assert_eq!(c.page_views()[0].center, Point::default());

        assert!(c.step(SwipeDirection::Next));
        c.finish_animation();
        assert_eq!(c.active_index(), 1);
        assert_eq!(c.page_views()[1].center, Point::default());
    }

    #[test]
    fn release_across_origin_hides_stale_candidate() {
        let mut c = carousel(3);
        c.handle_drag(DragPhase::Began, 0.0);
        c.handle_drag(DragPhase::Changed, -50.0);
        assert_eq!(visible(&c), vec![0, 1]);
        c.handle_drag(DragPhase::Ended, 50.0);
        assert_eq!(c.phase(), GesturePhase::Committing { from: 0, to: 2 });
        c.finish_animation();
        assert_eq!(c.active_index(), 2);
        assert_eq!(visible(&c), vec![2]);
    }

    #[test]
    fn cancel_across_origin_hides_stale_candidate() {
        let mut c = carousel(3);
        c.handle_drag(DragPhase::Began, 0.0);
        c.handle_drag(DragPhase::Changed, -50.0);
        c.handle_drag(DragPhase::Cancelled, 50.0);
        c.finish_animation();
        assert_eq!(c.active_index(), 0);
        assert_eq!(visible(&c), vec![0]);
    }

    #[test]
    fn step_previous_wraps() {
        let mut c = carousel(4);
        assert!(c.step(SwipeDirection::Previous));
        c.finish_animation();
        assert_eq!(c.active_index(), 3);
        assert_eq!(c.active_page().unwrap().ticker, "T3");
    }
}
