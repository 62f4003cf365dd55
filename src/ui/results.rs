//! Results screen: score summary, outcome charts, and per-question review.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::format::{format_date, format_time};
use crate::results::CategoryBreakdown;

const QUESTION_PREVIEW_LENGTH: usize = 55;
const BAR_WIDTH: usize = 20;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(view) = &app.results else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[0], view);
    render_charts(frame, chunks[1], view);
    render_question_breakdown(frame, chunks[2], view);
    render_status(frame, chunks[3], view);
    render_controls(frame, chunks[4]);
}

fn grade_color(percentage: u32) -> Color {
    match percentage {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_score_summary(frame: &mut Frame, area: Rect, view: &crate::app::ResultsView) {
    let result = &view.result;
    let percentage = result.percentage();

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "RESULTS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} / {}  ({}%)",
                result.score,
                result.total_questions(),
                percentage
            ),
            Style::default().fg(grade_color(percentage)).bold(),
        )),
        Line::from(Span::styled(
            format!(
                "{}  ·  Time {}  ·  {}  ·  {}",
                result.username,
                format_time(result.time),
                result.quiz_type.label(),
                format_date(&result.date)
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_charts(frame: &mut Frame, area: Rect, view: &crate::app::ResultsView) {
    let halves =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);

    render_overall_split(frame, halves[0], view);
    render_category_chart(frame, halves[1], &view.categories);
}

fn render_overall_split(frame: &mut Frame, area: Rect, view: &crate::app::ResultsView) {
    let split = view.split;
    let total = split.total().max(1);
    let percent = |count: usize| ((count as f64 / total as f64) * 100.0).round() as u32;

    let row = |label: &str, count: usize, color: Color| {
        Line::from(vec![
            Span::styled(format!(" {:<10}", label), Style::default().fg(Color::Gray)),
            Span::styled(bar(count, total), Style::default().fg(color)),
            Span::styled(
                format!(" {} ({}%)", count, percent(count)),
                Style::default().fg(color),
            ),
        ])
    };

    let lines = vec![
        row("Correct", split.correct, Color::Green),
        row("Incorrect", split.incorrect, Color::Red),
        row("Skipped", split.skipped, Color::Yellow),
    ];

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Overall ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_category_chart(frame: &mut Frame, area: Rect, categories: &[CategoryBreakdown]) {
    let max_total = categories.iter().map(|c| c.total).max().unwrap_or(1).max(1);

    let lines: Vec<Line> = categories
        .iter()
        .map(|category| {
            Line::from(vec![
                Span::styled(
                    format!(" {:<14}", category.label),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    bar(category.correct, max_total),
                    Style::default().fg(Color::Green),
                ),
                Span::styled(
                    bar(category.incorrect, max_total),
                    Style::default().fg(Color::Red),
                ),
                Span::styled(
                    bar(category.skipped, max_total),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(
                    format!(" {}/{}/{}", category.correct, category.incorrect, category.skipped),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" By Category ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

/// A block bar scaled against `max`, never empty for a nonzero count.
fn bar(count: usize, max: usize) -> String {
    if count == 0 {
        return String::new();
    }
    let width = (count * BAR_WIDTH / max).max(1);
    "█".repeat(width)
}

fn render_question_breakdown(frame: &mut Frame, area: Rect, view: &crate::app::ResultsView) {
    let result = &view.result;

    let lines: Vec<Line> = result
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let selected = result.selected_answers.get(index).copied().flatten();
            let (symbol, color) = match selected {
                None => ("○", Color::Yellow),
                Some(choice) if question.correct_index() == Some(choice) => ("+", Color::Green),
                Some(_) => ("-", Color::Red),
            };

            Line::from(vec![
                Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
                Span::styled(
                    format!("{:2}. ", index + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    truncate_question(&question.question),
                    Style::default().fg(Color::Gray),
                ),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Question Analysis ")
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        )
        .scroll((view.scroll as u16, 0));
    frame.render_widget(widget, area);
}

fn truncate_question(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > QUESTION_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(QUESTION_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

fn render_status(frame: &mut Frame, area: Rect, view: &crate::app::ResultsView) {
    if let Some(status) = &view.status {
        let widget = Paragraph::new(status.as_str())
            .alignment(Alignment::Center)
            .fg(Color::Yellow);
        frame.render_widget(widget, area);
    }
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new(
        "j/k scroll  ·  s save  ·  e export  ·  l leaderboard  ·  r retake  ·  q quit",
    )
    .alignment(Alignment::Center)
    .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
