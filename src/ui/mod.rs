//! Screen-per-state rendering.

mod error;
mod fetching;
mod leaderboard;
mod quiz;
mod results;
mod setup;

use ratatui::{prelude::*, widgets::Block};

use crate::app::{App, Screen};
use crate::session::SessionPhase;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.screen {
        Screen::Session => match &app.session.phase {
            SessionPhase::AwaitingUsername { .. } => setup::render(frame, area, app),
            SessionPhase::Fetching { .. } => fetching::render(frame, area, app),
            SessionPhase::Answering | SessionPhase::Finalized => quiz::render(frame, area, app),
            SessionPhase::Error { message } => error::render(frame, area, message),
        },
        Screen::Results => results::render(frame, area, app),
        Screen::Leaderboard => leaderboard::render(frame, area, app),
    }
}
