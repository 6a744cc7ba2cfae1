//! Details screen: price chart with range picker, analytics results list.

use chrono::{DateTime, Utc};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use aid_core::chart::ChartDomain;
use aid_core::details::LoadingState;
use aid_core::domain::{ChartPoint, TimeRange};

use crate::app::{AppState, DetailsView, HitAreas};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(view) = app.details.as_ref() else {
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(5)])
        .split(area);
    render_header(f, rows[0], app, view);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(rows[1]);
    render_chart_panel(f, cols[0], app, view);
    render_indicators_panel(f, cols[1], view);
}

fn render_header(f: &mut Frame, area: Rect, app: &AppState, view: &DetailsView) {
    let session = &view.session;
    let mut spans = vec![Span::styled(format!(" {} ", session.ticker()), theme::accent_bold())];
    if let Some(name) = session.full_name() {
        spans.push(Span::styled(name.to_string(), theme::text()));
    }
    if app.favourites.is_favourite(session.ticker()) {
        spans.push(Span::styled("  ★", theme::warning()));
    }
    let hints = Line::from(Span::styled(
        " 1-6/[ ]: range  ←/→ or drag: inspect  r/R: reload  f: favourite  Esc: back",
        theme::muted(),
    ));
    f.render_widget(Paragraph::new(vec![Line::from(spans), hints]), area);
}

// ── Chart ────────────────────────────────────────────────────────────

fn render_chart_panel(f: &mut Frame, area: Rect, app: &AppState, view: &DetailsView) {
    let session = &view.session;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" Price: {} ", session.selected_range()))
        .title_style(theme::panel_title(true));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    let mut plot = Rect::default();
    match session.chart_state() {
        LoadingState::Fetching => render_message(f, chunks[0], "Loading...", theme::muted()),
        LoadingState::Error(_) => render_error(f, chunks[0], "r"),
        LoadingState::Loaded => {
            let points = session.chart_points();
            match ChartDomain::of(points) {
                Some(domain) => plot = render_chart(f, chunks[0], view, points, &domain),
                None => render_message(f, chunks[0], "No data for this range", theme::muted()),
            }
        }
    }
    app.hit_areas.set(HitAreas {
        chart: plot,
        ..app.hit_areas.get()
    });

    // While the pointer is down the tooltip replaces the range picker.
    let footer = match view.selection.resolve(session.chart_points()) {
        Some(point) => tooltip_line(session.selected_range(), point),
        None => range_picker_line(session.selected_range()),
    };
    f.render_widget(Paragraph::new(footer), chunks[1]);
}

/// Draw the series and return the plot area used for pointer mapping.
fn render_chart(f: &mut Frame, area: Rect, view: &DetailsView, points: &[ChartPoint], domain: &ChartDomain) -> Rect {
    let range = view.session.selected_range();
    let (y_min, y_max) = domain.price_bounds();
    let x_max = seconds_since(domain.start, domain.end).max(1.0);

    let data: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (seconds_since(domain.start, p.timestamp), p.open))
        .collect();
    let first = points.first().map_or(0.0, |p| p.open);
    let last = points.last().map_or(0.0, |p| p.open);

    let (rule, marker) = match view.selection.resolve(points) {
        Some(point) => {
            let x = seconds_since(domain.start, point.timestamp);
            (vec![(x, y_min), (x, y_max)], vec![(x, point.open)])
        }
        None => (Vec::new(), Vec::new()),
    };
    let mut datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(theme::trend(first, last)))
        .graph_type(GraphType::Line)
        .data(&data)];

    if !rule.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .style(theme::muted())
                .graph_type(GraphType::Line)
                .data(&rule),
        );
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .style(theme::warning().add_modifier(Modifier::BOLD))
                .graph_type(GraphType::Scatter)
                .data(&marker),
        );
    }

    let y_labels = [format!("{y_min:.2}"), format!("{y_max:.2}")];
    let y_label_width = y_labels.iter().map(String::len).max().unwrap_or(0) as u16;

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([0.0, x_max])
                .labels(vec![
                    Span::styled(time_label(range, domain.start), theme::muted()),
                    Span::styled(time_label(range, domain.end), theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(y_labels.into_iter().map(|l| Span::styled(l, theme::muted())).collect::<Vec<_>>()),
        );
    f.render_widget(chart, area);

    // y labels plus the axis line on the left, x labels plus the axis line below
    let left = (y_label_width + 1).min(area.width);
    Rect::new(
        area.x + left,
        area.y,
        area.width - left,
        area.height.saturating_sub(2),
    )
}

fn seconds_since(start: DateTime<Utc>, t: DateTime<Utc>) -> f64 {
    (t - start).num_seconds() as f64
}

/// Axis and tooltip timestamp format, coarser for longer ranges.
pub fn time_label(range: TimeRange, t: DateTime<Utc>) -> String {
    let fmt = match range {
        TimeRange::Hour | TimeRange::Day => "%H:%M",
        TimeRange::Week | TimeRange::Month => "%d %b %H:%M",
        TimeRange::Year | TimeRange::AllTime => "%d %b %Y",
    };
    t.format(fmt).to_string()
}

fn tooltip_line(range: TimeRange, point: &ChartPoint) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {} ", time_label(range, point.timestamp)), theme::text_secondary()),
        Span::styled(format!("{:.2}", point.open), theme::accent_bold()),
    ])
}

fn range_picker_line(selected: TimeRange) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for (i, range) in TimeRange::ALL.iter().enumerate() {
        let style = if *range == selected { theme::selected() } else { theme::muted() };
        spans.push(Span::styled(format!(" {}:{} ", i + 1, range.label()), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

// ── Indicators ───────────────────────────────────────────────────────

fn render_indicators_panel(f: &mut Frame, area: Rect, view: &DetailsView) {
    let session = &view.session;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(false))
        .title(" Analytics Results ")
        .title_style(theme::panel_title(false));
    let inner = block.inner(area);
    f.render_widget(block, area);

    match session.indicators_state() {
        LoadingState::Fetching => render_message(f, inner, "Loading...", theme::muted()),
        LoadingState::Error(_) => render_error(f, inner, "R"),
        LoadingState::Loaded => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(2), Constraint::Min(1)])
                .split(inner);
            render_pros_cons(f, chunks[0], view);

            let items: Vec<ListItem> = session
                .indicators_for_view()
                .into_iter()
                .map(|indicator| {
                    let verdict = indicator.verdict_kind();
                    ListItem::new(Line::from(vec![
                        Span::styled(format!("{:<2}", verdict.symbol().unwrap_or(" ")), theme::verdict(verdict)),
                        Span::styled(format!("{:<12}", indicator.kind), theme::text()),
                        Span::styled(indicator.formatted_value(), theme::text_secondary()),
                    ]))
                })
                .collect();
            let list = List::new(items).highlight_style(theme::selected());
            let mut state = ListState::default().with_selected(Some(view.indicator_cursor));
            f.render_stateful_widget(list, chunks[1], &mut state);
        }
    }
}

fn render_pros_cons(f: &mut Frame, area: Rect, view: &DetailsView) {
    let tally = view.session.pros_cons();
    let summary = Line::from(vec![
        Span::styled(format!(" ▲ {} ", tally.pros), theme::positive()),
        Span::styled(format!(" ▼ {} ", tally.cons), theme::negative()),
    ]);
    let bar = match tally.pros_ratio() {
        Some(ratio) => {
            let width = usize::from(area.width.saturating_sub(2));
            let pros = ((ratio * width as f64).round() as usize).min(width);
            Line::from(vec![
                Span::raw(" "),
                Span::styled("█".repeat(pros), theme::positive()),
                Span::styled("█".repeat(width - pros), theme::negative()),
            ])
        }
        None => Line::from(Span::styled(" no verdicts", theme::muted())),
    };
    f.render_widget(Paragraph::new(vec![summary, bar]), area);
}

// ── Shared ───────────────────────────────────────────────────────────

fn render_message(f: &mut Frame, area: Rect, text: &str, style: Style) {
    if area.height == 0 {
        return;
    }
    let line_area = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
    f.render_widget(
        Paragraph::new(Span::styled(text.to_string(), style)).alignment(Alignment::Center),
        line_area,
    );
}

fn render_error(f: &mut Frame, area: Rect, reload_key: &str) {
    if area.height < 2 {
        render_message(f, area, "Something went wrong", theme::negative());
        return;
    }
    let top = Rect::new(area.x, area.y + area.height / 2 - 1, area.width, 2);
    let lines = vec![
        Line::from(Span::styled("Something went wrong", theme::negative())),
        Line::from(Span::styled(format!("press {reload_key} to retry"), theme::muted())),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), top);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn time_labels_follow_range() {
        let t = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        assert_eq!(time_label(TimeRange::Hour, t), "14:30");
        assert_eq!(time_label(TimeRange::Week, t), "05 Mar 14:30");
        assert_eq!(time_label(TimeRange::AllTime, t), "05 Mar 2024");
    }

    #[test]
    fn range_picker_lists_every_range() {
        let line = range_picker_line(TimeRange::Month);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        for range in TimeRange::ALL {
            assert!(text.contains(range.label()));
        }
    }
}
