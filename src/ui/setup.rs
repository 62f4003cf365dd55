//! Quiz setup screen: username, quiz type, and question count.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;
use crate::session::SessionPhase;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let SessionPhase::AwaitingUsername { input, error } = &app.session.phase else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(14),
        Constraint::Fill(1),
    ])
    .split(area);

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "APTIFY",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from("Aptitude Practice".fg(Color::DarkGray)),
        Line::from(""),
        Line::from(vec![
            Span::styled("Username: ", Style::default().fg(Color::White)),
            Span::styled(input.as_str(), Style::default().fg(Color::Yellow)),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Quiz Type: ", Style::default().fg(Color::White)),
            Span::styled(
                format!("< {} >", app.session.quiz_type().label()),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled("   Questions: ", Style::default().fg(Color::White)),
            Span::styled(
                format!("< {} >", app.session.question_count()),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(""),
    ];

    if let Some(err) = error {
        content.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    } else {
        content.push(Line::from(""));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "enter start  ·  tab quiz type  ·  ←/→ questions  ·  esc quit",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, chunks[1]);
}
