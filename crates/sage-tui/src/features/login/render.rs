//! Login view.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::render::{spinner, truncate_middle};
use crate::state::AppState;

use super::state::LoginFlow;

pub fn render(app: &AppState, frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Sign in with GitHub",
            Style::default().fg(Color::White),
        )),
        Line::from(""),
    ];

    match &app.login.flow {
        LoginFlow::Idle => {
            lines.push(Line::from(Span::styled(
                "Press Enter to open the browser and sign in.",
                Style::default().fg(Color::Gray),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "If the browser cannot reach this machine, paste the redirect",
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(Line::from(Span::styled(
                "URL from the address bar here instead.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        LoginFlow::AwaitingRedirect { url } => {
            let display_url = truncate_middle(url, area.width.saturating_sub(2) as usize);
            lines.push(Line::from(Span::styled(
                "Browser opened for authentication.",
                Style::default().fg(Color::Green),
            )));
            lines.push(Line::from(Span::styled(
                display_url,
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(spinner(app), Style::default().fg(Color::Yellow)),
                Span::raw(" "),
                Span::styled(
                    "Waiting for the browser redirect...",
                    Style::default().fg(Color::White),
                ),
            ]));
        }
        LoginFlow::Resolving => {
            lines.push(Line::from(vec![
                Span::styled(spinner(app), Style::default().fg(Color::Yellow)),
                Span::raw(" "),
                Span::styled("Validating session...", Style::default().fg(Color::Yellow)),
            ]));
        }
    }

    if let Some(error) = &app.login.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    if let Some(config_error) = &app.config_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            config_error.clone(),
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::from(Span::styled(
            "Run `sage config init` and fill in the service settings.",
            Style::default().fg(Color::Yellow),
        )));
    }

    frame.render_widget(Paragraph::new(lines), area);
}
