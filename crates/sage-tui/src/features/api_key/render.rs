//! API key view.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use sage_core::auth::session::mask_token;
use sage_core::snippet;

use crate::render::spinner;
use crate::state::AppState;

pub fn render(app: &AppState, frame: &mut Frame, area: Rect) {
    let state = &app.api_key;
    let mut lines = vec![
        Line::from(Span::styled(
            "Workflow API Key",
            Style::default().fg(Color::White),
        )),
        Line::from(""),
    ];

    if state.loading {
        lines.push(busy_line(app, "Fetching your API key..."));
    } else if state.generating {
        lines.push(busy_line(app, "Generating a new API key..."));
    } else if let Some(key) = &state.key {
        let shown = if state.revealed {
            key.clone()
        } else {
            mask_token(key)
        };
        lines.push(Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(shown, Style::default().fg(Color::Cyan)),
        ]));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            snippet::WORKFLOW_NOTE,
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(""));
        for snippet_line in snippet::workflow_snippet(key).lines() {
            // Keep the snippet masked along with the key itself.
            let rendered = if state.revealed {
                snippet_line.to_string()
            } else {
                snippet_line.replace(key.as_str(), &mask_token(key))
            };
            lines.push(Line::from(Span::styled(
                format!("  {rendered}"),
                Style::default().fg(Color::DarkGray),
            )));
        }
    } else {
        lines.push(Line::from(Span::styled(
            "No API key yet. Press g to generate one.",
            Style::default().fg(Color::Gray),
        )));
    }

    if let Some(error) = &state.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn busy_line(app: &AppState, label: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(spinner(app), Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::styled(label.to_string(), Style::default().fg(Color::Yellow)),
    ])
}
