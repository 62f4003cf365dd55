//! Loading screen while questions are being fetched.

use ratatui::{prelude::*, widgets::Paragraph};

use crate::app::App;
use crate::fetch::MAX_RETRIES;
use crate::session::SessionPhase;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let SessionPhase::Fetching { retries } = &app.session.phase else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(7),
        Constraint::Percentage(40),
    ])
    .split(area);

    let loading_text = if *retries > 0 {
        format!("Fetching questions... Retry {}/{}", retries, MAX_RETRIES)
    } else {
        "Fetching questions...".to_string()
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "APTIFY",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(loading_text, Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(
            format!("Quiz Type: {}", app.session.quiz_type().label()).fg(Color::DarkGray),
        ),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}
