//! Leaderboard screen with category filter.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::format::{format_date, format_time};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], app);
    render_entries(frame, chunks[1], app);
    render_controls(frame, chunks[2]);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let filter_label = app
        .leaderboard
        .filter
        .map(|quiz_type| quiz_type.label())
        .unwrap_or("All");

    let content = vec![
        Line::from(Span::styled(
            "LEADERBOARD",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(Span::styled(
            format!("Category: {}", filter_label),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_entries(frame: &mut Frame, area: Rect, app: &App) {
    let visible = app.leaderboard.visible();

    let lines: Vec<Line> = if visible.is_empty() {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "No entries found for this category",
                Style::default().fg(Color::DarkGray),
            )),
        ]
    } else {
        visible
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let rank = index + 1;
                let rank_style = match rank {
                    1 => Style::default().fg(Color::Yellow).bold(),
                    2 => Style::default().fg(Color::White),
                    3 => Style::default().fg(Color::LightRed),
                    _ => Style::default().fg(Color::DarkGray),
                };

                Line::from(vec![
                    Span::styled(format!(" {:>2}. ", rank), rank_style),
                    Span::styled(
                        format!("{:<20}", entry.username),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(
                        format!(
                            "{}/{} ({}%)  ",
                            entry.score,
                            entry.total_questions,
                            entry.percentage()
                        ),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled(
                        format!(
                            "{}  {}  {}",
                            format_time(entry.time),
                            format_date(&entry.date),
                            entry.quiz_type.label()
                        ),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect()
    };

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .padding(Padding::horizontal(1)),
        )
        .scroll((app.leaderboard.scroll as u16, 0));
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("f filter  ·  j/k scroll  ·  b back  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
