//! Top-level UI layout: tab header, active screen, status bar.

pub mod details;
pub mod favourites;
pub mod main_screen;
pub mod overlays;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, Overlay, Screen};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    draw_tabs(f, chunks[0], app);

    match app.screen {
        Screen::Main => main_screen::render(f, chunks[1], app),
        Screen::Favourites => favourites::render(f, chunks[1], app),
        Screen::Details => details::render(f, chunks[1], app),
    }

    status_bar::render(f, chunks[2], app);

    match app.overlay {
        Overlay::Help => overlays::render_help(f, chunks[1]),
        Overlay::Indicator(row) => overlays::render_indicator(f, chunks[1], app, row),
        Overlay::None => {}
    }
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans = vec![Span::styled(" AID ", theme::accent_bold())];
    for (key, screen) in [("1", Screen::Main), ("2", Screen::Favourites)] {
        let active = app.screen == screen || (app.screen == Screen::Details && app.details_origin() == Some(screen));
        let style = if active { theme::accent_bold() } else { theme::muted() };
        spans.push(Span::styled(format!(" {key}:{} ", screen.label()), style));
    }
    if let Some(view) = &app.details {
        spans.push(Span::styled(format!(" > {} ", view.session.ticker()), theme::accent()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Centered popup rect, as a percentage of `r`.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
