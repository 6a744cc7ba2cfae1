//! Input dispatch: overlays, then global keys, then the active screen.
//!
//! Mouse drags drive the carousel on the main screen and the chart pointer
//! on the details screen.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use aid_core::domain::TimeRange;
use aid_core::{DragPhase, SwipeDirection};

use crate::app::{AppState, Overlay, Screen};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.running = false;
        return;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::Help => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::Indicator(_) => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                app.overlay = Overlay::None;
            }
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('?') => {
            app.overlay = Overlay::Help;
            return;
        }
        _ => {}
    }

    // 3. Screen-specific keys.
    match app.screen {
        Screen::Main => handle_main_key(app, key),
        Screen::Favourites => handle_favourites_key(app, key),
        Screen::Details => handle_details_key(app, key),
    }
}

fn handle_main_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => {
            app.carousel.step(SwipeDirection::Previous);
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.carousel.step(SwipeDirection::Next);
        }
        KeyCode::Enter | KeyCode::Char(' ') => open_active_page(app),
        KeyCode::Char('f') => {
            if let Some(ticker) = app.carousel.active_page().map(|p| p.ticker.clone()) {
                app.toggle_favourite(&ticker);
            }
        }
        KeyCode::Char('r') => app.request_companies(),
        KeyCode::Tab | KeyCode::Char('2') => app.screen = Screen::Favourites,
        _ => {}
    }
}

fn handle_favourites_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_favourites_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_favourites_cursor(1),
        KeyCode::Enter => {
            if let Some(ticker) = app.favourite_under_cursor() {
                app.open_details(&ticker);
            }
        }
        KeyCode::Char('d') | KeyCode::Char('f') | KeyCode::Delete => {
            if let Some(ticker) = app.favourite_under_cursor() {
                app.toggle_favourite(&ticker);
            }
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('1') | KeyCode::Esc => app.screen = Screen::Main,
        _ => {}
    }
}

fn handle_details_key(app: &mut AppState, key: KeyEvent) {
    let Some(view) = app.details.as_mut() else {
        app.screen = Screen::Main;
        return;
    };
    match key.code {
        KeyCode::Esc | KeyCode::Backspace => {
            if view.selection.is_active() {
                view.selection.clear();
            } else {
                app.close_details();
            }
        }
        KeyCode::Char(c @ '1'..='6') => {
            let index = c as usize - '1' as usize;
            if let Some(range) = TimeRange::from_index(index) {
                app.select_range(range);
            }
        }
        KeyCode::Char('[') => {
            let range = view.session.selected_range().finer();
            app.select_range(range);
        }
        KeyCode::Char(']') => {
            let range = view.session.selected_range().coarser();
            app.select_range(range);
        }
        KeyCode::Left | KeyCode::Char('h') => view.step_pointer(-1),
        KeyCode::Right | KeyCode::Char('l') => view.step_pointer(1),
        KeyCode::Up | KeyCode::Char('k') => view.move_indicator_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => view.move_indicator_cursor(1),
        KeyCode::Enter => {
            if !view.session.indicators_for_view().is_empty() {
                app.overlay = Overlay::Indicator(view.indicator_cursor);
            }
        }
        KeyCode::Char('r') => app.reload_chart(),
        KeyCode::Char('R') => app.reload_indicators(),
        KeyCode::Char('f') => {
            let ticker = view.session.ticker().to_string();
            app.toggle_favourite(&ticker);
        }
        _ => {}
    }
}

fn open_active_page(app: &mut AppState) {
    if let Some(ticker) = app.carousel.active_page().map(|p| p.ticker.clone()) {
        app.open_details(&ticker);
    }
}

pub fn handle_mouse(app: &mut AppState, mouse: MouseEvent) {
    if app.overlay != Overlay::None {
        return;
    }
    match app.screen {
        Screen::Main => handle_carousel_mouse(app, mouse),
        Screen::Details => handle_chart_mouse(app, mouse),
        Screen::Favourites => {}
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
}

fn handle_carousel_mouse(app: &mut AppState, mouse: MouseEvent) {
    let area = app.hit_areas.get().carousel;
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if contains(area, mouse.column, mouse.row) {
                app.drag_origin = Some(mouse.column);
                app.carousel.handle_drag(DragPhase::Began, 0.0);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if let Some(origin) = app.drag_origin {
                let dx = f64::from(mouse.column) - f64::from(origin);
                app.carousel.handle_drag(DragPhase::Changed, dx);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let Some(origin) = app.drag_origin.take() else {
                return;
            };
            let dx = f64::from(mouse.column) - f64::from(origin);
            app.carousel.handle_drag(DragPhase::Ended, dx);
            // A click without movement is a tap on the page.
            if dx == 0.0 {
                app.carousel.finish_animation();
                open_active_page(app);
            }
        }
        _ => {}
    }
}

fn handle_chart_mouse(app: &mut AppState, mouse: MouseEvent) {
    let area = app.hit_areas.get().chart;
    let Some(view) = app.details.as_mut() else {
        return;
    };
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if !contains(area, mouse.column, mouse.row) => {}
        MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
            if area.width == 0 {
                return;
            }
            let span = f64::from(area.width.saturating_sub(1).max(1));
            let fraction = (f64::from(mouse.column) - f64::from(area.x)) / span;
            view.point_at_fraction(fraction);
        }
        MouseEventKind::Up(MouseButton::Left) => view.selection.clear(),
        _ => {}
    }
}
