mod components;

use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus, Mode, Popup};
use crate::theme::Theme;
use crate::view;

use components::{centered_rect, input_box, key_hint};

static THEME: OnceLock<Theme> = OnceLock::new();

const MAX_PAGE_ROWS: usize = 3;

/// Install the palette built from config. Only the first call has an effect.
pub fn init_theme(theme: Theme) {
    let _ = THEME.set(theme);
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn inactive() -> Color { theme().inactive }
fn success() -> Color { theme().success }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title line
            Constraint::Length(1), // Error line
            Constraint::Min(6),    // Current view
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    draw_title_line(f, app, chunks[0]);
    draw_error_line(f, app, chunks[1]);
    match app.mode() {
        Mode::Search => draw_search_view(f, app, chunks[2]),
        Mode::Review => draw_review_view(f, app, chunks[2]),
    }
    draw_footer(f, app, chunks[3]);

    // Draw popups on top
    match app.popup {
        Popup::None => {}
        Popup::Help => draw_help_popup(f),
        Popup::ConfirmDelete => draw_confirm_popup(f, app),
    }
}

fn draw_title_line(f: &mut Frame, app: &App, area: Rect) {
    let mode = match (&app.selected_title, app.mode()) {
        (Some(title), Mode::Review) => format!("Reviews › {}", title),
        _ => "Search".to_string(),
    };

    let mut spans = vec![
        Span::styled(" reelnote ", Style::default().fg(accent()).add_modifier(Modifier::BOLD)),
        Span::styled("│ ", Style::default().fg(inactive())),
        Span::styled(mode, Style::default().fg(text())),
    ];
    if app.is_loading() {
        spans.push(Span::styled("  ◌ Loading…", Style::default().fg(warning())));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_error_line(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.error_message {
        Some(message) => Line::from(vec![
            Span::styled("✗ ", Style::default().fg(danger())),
            Span::styled(message.as_str(), Style::default().fg(danger())),
        ]),
        None => Line::from(""),
    };
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

// ----------------------------------------------------------------------
// Search mode
// ----------------------------------------------------------------------

fn draw_search_view(f: &mut Frame, app: &App, area: Rect) {
    let page_rows = pagination_rows(app, area.width);

    let mut constraints = vec![Constraint::Length(3), Constraint::Min(3)];
    if !page_rows.is_empty() {
        constraints.push(Constraint::Length(page_rows.len() as u16 + 2));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let editing = app.focus == Focus::Input;
    f.render_widget(
        input_box(" Search ", &app.keyword, "Movie title…", editing),
        chunks[0],
    );
    draw_results(f, app, chunks[1]);
    if !page_rows.is_empty() {
        draw_pagination(f, page_rows, chunks[2]);
    }
}

fn draw_results(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.focus == Focus::List;
    let border_color = if is_active { accent() } else { inactive() };

    let title = if app.search_result.total_count > 0 {
        format!(" Results ({}) ", app.search_result.total_count)
    } else {
        " Results ".to_string()
    };
    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(header())))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    if app.search_result.is_empty() {
        let hint = Paragraph::new(Line::styled(
            "  Type a title and press Enter",
            Style::default().fg(text_dim()),
        ))
        .block(block);
        f.render_widget(hint, area);
        return;
    }

    let items: Vec<ListItem> = app
        .search_result
        .items
        .iter()
        .map(|movie| {
            let poster = view::poster_url(movie, &app.placeholder_poster);
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        movie.title.as_str(),
                        Style::default().fg(text()).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!(" ({})", movie.year), Style::default().fg(text_dim())),
                ]),
                Line::from(vec![
                    Span::styled("  poster: ", Style::default().fg(inactive())),
                    Span::styled(poster.to_string(), Style::default().fg(text_dim())),
                ]),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(if is_active {
            Style::default().bg(bg_selected()).fg(text())
        } else {
            Style::default()
        });

    let mut state = ListState::default().with_selected(Some(app.selected_result));
    f.render_stateful_widget(list, area, &mut state);
}

/// Pagination laid out in rows of equal-width cells that fit inside the box.
/// Pages that don't fit in `MAX_PAGE_ROWS` rows collapse into gaps.
fn pagination_rows(app: &App, width: u16) -> Vec<Line<'static>> {
    let total_pages = app.total_pages();
    let digits = total_pages.to_string().len();
    let cell = digits + 2;
    let per_row = (usize::from(width.saturating_sub(2)) / cell).max(1);

    let items = view::page_bar(app.current_page, total_pages, per_row * MAX_PAGE_ROWS);
    items
        .chunks(per_row)
        .map(|row| {
            let spans: Vec<Span<'static>> = row
                .iter()
                .map(|item| match item {
                    view::PageItem::Control(control) if control.disabled => Span::styled(
                        format!("{:<cell$}", format!("[{}]", control.page)),
                        Style::default().fg(inactive()).add_modifier(Modifier::BOLD),
                    ),
                    view::PageItem::Control(control) => Span::styled(
                        format!(" {:<digits$} ", control.page),
                        Style::default().fg(accent()),
                    ),
                    view::PageItem::Gap => {
                        Span::styled(format!("{:^cell$}", "…"), Style::default().fg(text_dim()))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn draw_pagination(f: &mut Frame, rows: Vec<Line<'static>>, area: Rect) {
    let pagination = Paragraph::new(rows).block(
        Block::default()
            .title(Span::styled(" Pages ", Style::default().fg(header())))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(inactive())),
    );
    f.render_widget(pagination, area);
}

// ----------------------------------------------------------------------
// Review mode
// ----------------------------------------------------------------------

fn draw_review_view(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let editing = app.focus == Focus::Input;
    f.render_widget(
        input_box(
            " Your review ",
            &app.draft_review_text,
            "Write a review and press Enter…",
            editing,
        ),
        chunks[0],
    );
    draw_reviews(f, app, chunks[1]);
}

fn draw_reviews(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.focus == Focus::List;
    let border_color = if is_active { accent() } else { inactive() };
    let title = app.selected_title.as_deref().unwrap_or_default();

    let block = Block::default()
        .title(Span::styled(format!(" Reviews for {} ", title), Style::default().fg(header())))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    if app.review_list.is_empty() {
        let empty = Paragraph::new(Line::styled(
            format!("  {}", view::EMPTY_REVIEWS),
            Style::default().fg(text_dim()),
        ))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .review_list
        .iter()
        .map(|review| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("#{:<5}", review.id), Style::default().fg(text_dim())),
                Span::styled(review.text.as_str(), Style::default().fg(text())),
                Span::styled("  (d)elete", Style::default().fg(inactive())),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(if is_active {
            Style::default().bg(bg_selected()).fg(text())
        } else {
            Style::default()
        });

    let mut state = ListState::default().with_selected(Some(app.selected_review));
    f.render_stateful_widget(list, area, &mut state);
}

// ----------------------------------------------------------------------
// Footer and popups
// ----------------------------------------------------------------------

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: &[(&str, &str)] = match (app.mode(), app.focus) {
        (Mode::Search, Focus::Input) => {
            &[("Enter", "search"), ("Tab", "results"), ("^C", "quit")]
        }
        (Mode::Search, Focus::List) => &[
            ("↑↓", "move"),
            ("Enter", "reviews"),
            ("←→", "page"),
            ("/", "search"),
            ("?", "help"),
            ("q", "quit"),
        ],
        (Mode::Review, Focus::Input) => &[
            ("Enter", "submit"),
            ("Tab", "reviews"),
            ("Esc", "back"),
            ("^C", "quit"),
        ],
        (Mode::Review, Focus::List) => &[
            ("↑↓", "move"),
            ("d", "delete"),
            ("i", "write"),
            ("Esc", "back"),
            ("?", "help"),
            ("q", "quit"),
        ],
    };

    let mut spans = Vec::new();
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(inactive())));
        }
        spans.extend(key_hint(key, action));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(header()).add_modifier(Modifier::BOLD)))
    };
    let entry = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", key), Style::default().fg(accent())),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        section("═══ Search ═══"),
        entry("Enter", "Search for the typed title (page 1)"),
        entry("Tab", "Switch between search field and results"),
        entry("↑/↓ j/k", "Move through results"),
        entry("Enter", "Open reviews for the selected movie"),
        entry("←/→ [ ]", "Previous / next page"),
        entry("1-9", "Jump to page"),
        Line::from(""),
        section("═══ Reviews ═══"),
        entry("Enter", "Submit the review you typed"),
        entry("Tab", "Switch between review field and list"),
        entry("d", "Delete selected review (asks first)"),
        entry("Esc", "Back to search results"),
        Line::from(""),
        section("═══ General ═══"),
        entry("?", "Toggle this help"),
        entry("q / ^C", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" reelnote Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn draw_confirm_popup(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(40, 30, f.area());

    f.render_widget(Clear, popup_area);

    let message = match app.pending_delete {
        Some(id) => format!("Delete review #{}?", id),
        None => "Confirm?".to_string(),
    };

    let confirm = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(warning()))),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y", Style::default().fg(success()).add_modifier(Modifier::BOLD)),
            Span::raw(" Yes   "),
            Span::styled("n", Style::default().fg(danger()).add_modifier(Modifier::BOLD)),
            Span::raw(" No"),
        ]),
    ])
    .block(
        Block::default()
            .title(Span::styled(" Confirm ", Style::default().fg(warning())))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(warning())),
    )
    .alignment(Alignment::Center);

    f.render_widget(confirm, popup_area);
}
