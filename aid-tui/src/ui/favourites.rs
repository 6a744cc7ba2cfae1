//! Favourites screen: list of starred companies.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" Favourites ({}) ", app.favourites.len()))
        .title_style(theme::panel_title(true));

    if app.favourites.is_empty() {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled("No favourites yet.", theme::muted())),
            Line::from(Span::styled(
                "Press f on a company card or its details screen to add one.",
                theme::muted(),
            )),
        ];
        f.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let items: Vec<ListItem> = app
        .favourite_pages()
        .into_iter()
        .map(|page| {
            ListItem::new(Line::from(vec![
                Span::styled("★ ", theme::warning()),
                Span::styled(format!("{:<6}", page.ticker), theme::accent_bold()),
                Span::styled(page.name, theme::text()),
                Span::styled(format!("  {}", page.sector), theme::text_secondary()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme::selected())
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.favourites_cursor));
    f.render_stateful_widget(list, area, &mut state);
}
