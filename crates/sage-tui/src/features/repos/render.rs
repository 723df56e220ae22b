//! Repository view: list on the left, latest recommendation on the right.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use sage_core::api::Recommendation;
use sage_core::highlight;

use crate::render::spinner;
use crate::state::AppState;

pub fn render(app: &AppState, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    render_list(app, frame, chunks[0]);
    render_detail(app, frame, chunks[1]);
}

fn render_list(app: &AppState, frame: &mut Frame, area: Rect) {
    let state = &app.repos;
    let mut lines = Vec::new();

    if state.loading {
        lines.push(Line::from(vec![
            Span::styled(spinner(app), Style::default().fg(Color::Yellow)),
            Span::raw(" "),
            Span::styled("Loading repositories...", Style::default().fg(Color::Yellow)),
        ]));
    } else if state.repos.is_empty() {
        lines.push(Line::from(Span::styled(
            "No repositories have reported builds yet.",
            Style::default().fg(Color::Gray),
        )));
    } else {
        // Leave room for borders, keep the selection visible.
        let visible = area.height.saturating_sub(2) as usize;
        let offset = state.selected.saturating_sub(visible.saturating_sub(1));
        for (idx, repo) in state.repos.iter().enumerate().skip(offset).take(visible) {
            let selected = idx == state.selected;
            let pointer = if selected { ">" } else { " " };
            let style = if selected {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(Span::styled(
                format!("{pointer} {repo}"),
                style,
            )));
        }
    }

    if let Some(error) = &state.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Repositories ",
            Style::default().fg(Color::White),
        ));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_detail(app: &AppState, frame: &mut Frame, area: Rect) {
    let state = &app.repos;

    let lines: Vec<Line<'static>> = if state.recommendation_loading {
        vec![Line::from(vec![
            Span::styled(spinner(app), Style::default().fg(Color::Yellow)),
            Span::raw(" "),
            Span::styled(
                "Loading recommendation...",
                Style::default().fg(Color::Yellow),
            ),
        ])]
    } else if let Some(rec) = &state.recommendation {
        recommendation_lines(rec)
    } else if let Some(repo) = &state.recommendation_repo {
        vec![Line::from(Span::styled(
            format!("No recommendations for {repo} yet."),
            Style::default().fg(Color::Gray),
        ))]
    } else {
        vec![Line::from(Span::styled(
            "Press Enter on a repository to load its latest recommendation.",
            Style::default().fg(Color::DarkGray),
        ))]
    };

    let title = state
        .recommendation_repo
        .as_ref()
        .map_or_else(|| " Recommendation ".to_string(), |r| format!(" {r} "));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(title, Style::default().fg(Color::White)));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn recommendation_lines(rec: &Recommendation) -> Vec<Line<'static>> {
    let language = highlight::language_for_file(&rec.file_name);
    let mut lines = vec![Line::from(vec![
        Span::styled(rec.file_name.clone(), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("  ({language})"),
            Style::default().fg(Color::DarkGray),
        ),
    ])];
    if let Some(created_at) = &rec.created_at {
        lines.push(Line::from(Span::styled(
            created_at.clone(),
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines.push(Line::from(""));
    for text_line in rec.response_data.lines() {
        lines.push(Line::from(Span::styled(
            text_line.to_string(),
            Style::default().fg(Color::White),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Before:",
        Style::default().fg(Color::Gray),
    )));
    lines.extend(code_lines(&rec.old_code, Color::Red));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "After (c to copy):",
        Style::default().fg(Color::Gray),
    )));
    lines.extend(code_lines(&rec.new_code, Color::Green));

    lines
}

fn code_lines(code: &str, color: Color) -> Vec<Line<'static>> {
    code.lines()
        .map(|l| {
            Line::from(Span::styled(
                format!("  {l}"),
                Style::default().fg(color),
            ))
        })
        .collect()
}
