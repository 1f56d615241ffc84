//! Small widgets shared by both views

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{accent, header, inactive, text, text_dim};

/// Single line text field. Shows `placeholder` when empty and unfocused.
pub fn input_box<'a>(
    title: &'a str,
    value: &'a str,
    placeholder: &'a str,
    focused: bool,
) -> Paragraph<'a> {
    let line = if focused {
        Line::from(vec![
            Span::styled(value, Style::default().fg(text())),
            Span::styled("_", Style::default().fg(accent())),
        ])
    } else if value.is_empty() {
        Line::styled(placeholder, Style::default().fg(text_dim()))
    } else {
        Line::styled(value, Style::default().fg(text()))
    };

    Paragraph::new(line).block(
        Block::default()
            .title(Span::styled(
                title,
                Style::default().fg(if focused { accent() } else { header() }),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused { accent() } else { inactive() })),
    )
}

/// `key action` pair for the footer
pub fn key_hint<'a>(key: &'a str, action: &'a str) -> [Span<'a>; 2] {
    [
        Span::styled(key, Style::default().fg(accent()).add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {}", action), Style::default().fg(text_dim())),
    ]
}

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
