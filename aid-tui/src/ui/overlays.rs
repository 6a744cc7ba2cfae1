//! Overlay widgets: key help, indicator explanation.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use aid_core::domain::Verdict;

use crate::app::AppState;
use crate::theme;
use crate::ui::centered_rect;

pub fn render_help(f: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Keys ")
        .title_style(theme::accent_bold());

    let section = |title: &'static str| Line::from(Span::styled(title, theme::accent_bold()));
    let entry = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {keys:<14}"), theme::text()),
            Span::styled(what, theme::muted()),
        ])
    };

    let text = vec![
        section("Companies"),
        entry("←/→, drag", "swipe between companies"),
        entry("Enter, click", "open details"),
        entry("f", "toggle favourite"),
        entry("r", "refresh company list"),
        Line::from(""),
        section("Favourites"),
        entry("j/k", "move"),
        entry("Enter", "open details"),
        entry("d", "remove"),
        Line::from(""),
        section("Details"),
        entry("1-6, [ ]", "chart range"),
        entry("←/→, drag", "inspect a price"),
        entry("j/k, Enter", "indicator info"),
        entry("r / R", "reload chart / indicators"),
        entry("Esc", "back"),
        Line::from(""),
        entry("Tab", "switch companies/favourites"),
        entry("q", "quit"),
    ];

    let para = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
    f.render_widget(para, popup);
}

/// Explanation sheet for one indicator of the open details screen.
pub fn render_indicator(f: &mut Frame, area: Rect, app: &AppState, row: usize) {
    let Some(view) = app.details.as_ref() else {
        return;
    };
    let indicators = view.session.indicators_for_view();
    let Some(indicator) = indicators.get(row) else {
        return;
    };

    let popup = centered_rect(50, 40, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(format!(" {} ", indicator.kind))
        .title_style(theme::accent_bold());

    let verdict = indicator.verdict_kind();
    let verdict_text = match verdict {
        Verdict::Favorable => "favourable",
        Verdict::Unfavorable => "unfavourable",
        Verdict::Neutral => "neutral",
    };
    let text = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Value:   ", theme::muted()),
            Span::styled(indicator.formatted_value(), theme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Verdict: ", theme::muted()),
            Span::styled(verdict_text, theme::verdict(verdict)),
        ]),
        Line::from(""),
        Line::from(Span::styled(format!("  {}", describe(&indicator.kind)), theme::text_secondary())),
        Line::from(""),
        Line::from(Span::styled("  Esc to close", theme::neutral())),
    ];
    f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), popup);
}

/// One-line description of the common indicator kinds.
pub fn describe(kind: &str) -> &'static str {
    match kind {
        "P/E" => "Price to earnings: share price over earnings per share.",
        "P/B" => "Price to book: market value over book value of equity.",
        "EV/EBITDA" => "Enterprise value over earnings before interest, taxes, depreciation and amortisation.",
        "ROE" => "Return on equity: net income over shareholder equity, in percent.",
        "RSI" => "Relative strength index: momentum oscillator between 0 and 100.",
        "Debt/Equity" => "Total liabilities over shareholder equity.",
        "Dividend Yield" => "Annual dividend over share price, in percent.",
        "Beta" => "Volatility of the share relative to the market index.",
        _ => "No description available.",
    }
}
