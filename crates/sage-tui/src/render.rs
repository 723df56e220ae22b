//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState` by immutable reference, draw to a
//! ratatui Frame, and never mutate state or return effects. All view
//! selection follows `app.screen`, which the reducer has already run
//! through the route guard.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::features;
use crate::state::{AppState, Screen};

/// Height of the header line at the top.
const HEADER_HEIGHT: u16 = 1;

/// Height of the status line at the bottom.
const STATUS_HEIGHT: u16 = 1;

/// Spinner frames for in-flight work.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

/// Tick counts per spinner frame; keeps the animation readable at 60fps.
const SPINNER_SPEED_DIVISOR: usize = 8;

/// The current spinner glyph for this frame.
pub fn spinner(app: &AppState) -> &'static str {
    SPINNER_FRAMES[(app.spinner_frame / SPINNER_SPEED_DIVISOR) % SPINNER_FRAMES.len()]
}

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);

    render_header(app, frame, chunks[0]);

    // Body area with a small horizontal margin
    let body = Rect {
        x: chunks[1].x + 2,
        y: chunks[1].y + 1,
        width: chunks[1].width.saturating_sub(4),
        height: chunks[1].height.saturating_sub(1),
    };

    match app.screen {
        Screen::Waiting => render_waiting(app, frame, body),
        Screen::Login => features::login::render::render(app, frame, body),
        Screen::ApiKey => features::api_key::render::render(app, frame, body),
        Screen::Repos => features::repos::render::render(app, frame, body),
    }

    render_status_line(app, frame, chunks[2]);
}

fn render_header(app: &AppState, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(" sage ", Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::raw(" "),
    ];

    for (label, screen) in [("1 API Key", Screen::ApiKey), ("2 Repos", Screen::Repos)] {
        let style = if app.screen == screen {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {label} "), style));
    }

    let header = Paragraph::new(Line::from(spans));
    frame.render_widget(header, area);

    // Signed-in identity on the right
    if let Some(session) = &app.snapshot.session {
        let who = format!("{} ", session.identity.display_name());
        let right = Paragraph::new(Line::from(Span::styled(
            who,
            Style::default().fg(Color::Green),
        )))
        .alignment(Alignment::Right);
        frame.render_widget(right, area);
    }
}

fn render_waiting(app: &AppState, frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(spinner(app), Style::default().fg(Color::Yellow)),
            Span::raw(" "),
            Span::styled("Restoring session...", Style::default().fg(Color::Yellow)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

/// Renders the status line: a transient message when one is up, otherwise
/// the shortcuts for the current view.
fn render_status_line(app: &AppState, frame: &mut Frame, area: Rect) {
    let spans: Vec<Span> = if let Some(status) = &app.status {
        vec![
            Span::raw(" "),
            Span::styled(status.text.clone(), Style::default().fg(Color::Green)),
        ]
    } else {
        let hint_key = Style::default().fg(Color::DarkGray);
        let mut spans = vec![Span::raw(" ")];
        let hints: &[(&str, &str)] = match app.screen {
            Screen::Waiting => &[("q", "quit")],
            Screen::Login => &[("Enter", "sign in"), ("Esc", "reset"), ("q", "quit")],
            Screen::ApiKey => &[
                ("c", "copy key"),
                ("w", "copy workflow"),
                ("r", "reveal"),
                ("g", "regenerate"),
                ("s", "sign out"),
                ("q", "quit"),
            ],
            Screen::Repos => &[
                ("j/k", "select"),
                ("Enter", "recommendation"),
                ("c", "copy fix"),
                ("s", "sign out"),
                ("q", "quit"),
            ],
        };
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(*key, hint_key));
            spans.push(Span::raw(format!(" {label}")));
        }
        spans
    };

    let status = Paragraph::new(Line::from(spans)).alignment(Alignment::Left);
    frame.render_widget(status, area);
}

/// Truncates a string in the middle with "..." if it exceeds `max_len`
/// bytes. Cut points are moved to char boundaries, so multi-byte input
/// (a non-ASCII base URL, say) never splits a character.
pub fn truncate_middle(s: &str, max_len: usize) -> String {
    if s.len() <= max_len || max_len < 10 {
        return s.to_string();
    }
    let half = (max_len - 3) / 2;
    let mut head_end = half;
    while !s.is_char_boundary(head_end) {
        head_end -= 1;
    }
    let mut tail_start = s.len() - half;
    while !s.is_char_boundary(tail_start) {
        tail_start += 1;
    }
    format!("{}...{}", &s[..head_end], &s[tail_start..])
}
