//! Colour tokens and style helpers.
//!
//! # Palette
//! - **Accent**: electric cyan (focus, active page, selected range)
//! - **Positive**: neon green (favourable indicators, price above range start)
//! - **Negative**: hot pink (unfavourable indicators, errors)
//! - **Warning**: neon orange (favourite star, warnings)
//! - **Muted**: steel blue (hints, secondary text)

use ratatui::style::{Color, Modifier, Style};

use aid_core::domain::Verdict;

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT: Color = Color::White;
pub const TEXT_SECONDARY: Color = Color::Rgb(170, 170, 170);

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn text() -> Style {
    Style::default().fg(TEXT)
}

pub fn text_secondary() -> Style {
    Style::default().fg(TEXT_SECONDARY)
}

pub fn panel_border(active: bool) -> Style {
    if active { accent() } else { muted() }
}

pub fn panel_title(active: bool) -> Style {
    if active { accent_bold() } else { muted() }
}

/// Highlighted list row.
pub fn selected() -> Style {
    Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Colour of an indicator's verdict arrow.
pub fn verdict(v: Verdict) -> Style {
    match v {
        Verdict::Favorable => positive(),
        Verdict::Unfavorable => negative(),
        Verdict::Neutral => text_secondary(),
    }
}

/// Line colour for a price series: green when it closes at or above its start.
pub fn trend(first: f64, last: f64) -> Color {
    if last >= first { POSITIVE } else { NEGATIVE }
}
