//! Main screen: one company card at a time, swiped with the mouse or arrows.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use aid_core::carousel::PageView;

use crate::app::{AppState, HitAreas};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(" Companies ")
        .title_style(theme::panel_title(true));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);
    let carousel_area = chunks[0];

    app.hit_areas.set(HitAreas {
        carousel: carousel_area,
        ..app.hit_areas.get()
    });

    if app.carousel.is_placeholder() {
        let text = if app.companies_loading { "Loading companies..." } else { "No companies" };
        let para = Paragraph::new(Span::styled(text, theme::muted())).alignment(Alignment::Center);
        f.render_widget(para, centered_line(carousel_area));
        return;
    }

    for view in app.carousel.page_views().iter().filter(|v| !v.hidden) {
        if let Some(rect) = card_rect(carousel_area, view.center.x) {
            render_card(f, rect, app, view);
        }
    }

    render_dots(f, chunks[1], app);
    let hints = Line::from(Span::styled(
        "←/→ or drag: swipe   Enter/click: details   f: favourite   r: refresh",
        theme::muted(),
    ));
    f.render_widget(Paragraph::new(hints).alignment(Alignment::Center), chunks[2]);
}

/// Screen rect of a page whose left edge sits `offset` columns from the
/// carousel origin, clipped to the carousel. None when fully off-screen.
pub fn card_rect(area: Rect, offset: f64) -> Option<Rect> {
    let left = f64::from(area.x) + offset.round();
    let right = left + f64::from(area.width);
    let x0 = left.max(f64::from(area.x));
    let x1 = right.min(f64::from(area.right()));
    if x1 <= x0 {
        return None;
    }
    Some(Rect::new(x0 as u16, area.y, (x1 - x0) as u16, area.height))
}

fn render_card(f: &mut Frame, rect: Rect, app: &AppState, view: &PageView) {
    let page = &view.page;
    let favourite = app.favourites.is_favourite(&page.ticker);
    let mut title = vec![Span::styled(format!(" {} ", page.ticker), theme::accent_bold())];
    if favourite {
        title.push(Span::styled("★ ", theme::warning()));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(Line::from(title));

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(page.name.as_str(), theme::text().add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(page.sector.as_str(), theme::text_secondary())),
        Line::from(""),
        Line::from(Span::styled(
            if favourite { "In favourites" } else { "Press f to add to favourites" },
            theme::muted(),
        )),
    ];
    let para = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(para, rect);
}

fn render_dots(f: &mut Frame, area: Rect, app: &AppState) {
    let (current, total) = app.carousel.page_indicator();
    let mut spans: Vec<Span> = (1..=total)
        .map(|i| {
            if i == current {
                Span::styled("● ", theme::accent())
            } else {
                Span::styled("○ ", theme::muted())
            }
        })
        .collect();
    spans.push(Span::styled(format!(" {current}/{total}"), theme::text_secondary()));
    f.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
}

fn centered_line(area: Rect) -> Rect {
    Rect::new(area.x, area.y + area.height / 2, area.width, 1.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_rect_at_rest_fills_area() {
        let area = Rect::new(2, 3, 40, 10);
        assert_eq!(card_rect(area, 0.0), Some(area));
    }

    #[test]
    fn card_rect_clips_partial_pages() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(card_rect(area, -30.0), Some(Rect::new(0, 0, 10, 10)));
        assert_eq!(card_rect(area, 25.0), Some(Rect::new(25, 0, 15, 10)));
    }

    #[test]
    fn card_rect_off_screen() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(card_rect(area, 64.0), None);
        assert_eq!(card_rect(area, -40.0), None);
    }

    proptest::proptest! {
        #[test]
        fn card_rect_never_leaves_carousel(
            x in 0u16..50,
            width in 1u16..200,
            offset in -400.0..400.0_f64,
        ) {
            let area = Rect::new(x, 1, width, 10);
            if let Some(rect) = card_rect(area, offset) {
                proptest::prop_assert!(rect.x >= area.x);
                proptest::prop_assert!(rect.right() <= area.right());
                proptest::prop_assert!(rect.width > 0);
            }
        }
    }
}
