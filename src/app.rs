//! Application runtime.
//!
//! Owns the event loop: crossterm input on one side, an mpsc channel of
//! async completions (fetch results, timer ticks) on the other. Spawned
//! tasks never touch state directly; they post events that the loop folds
//! into the session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::fetch::{FetchError, QuestionClient};
use crate::models::{LeaderboardEntry, Question, QuizResult, QuizType};
use crate::report;
use crate::results::{self, CategoryBreakdown, OutcomeSplit};
use crate::session::{QuizSession, SessionPhase};
use crate::storage::{self, Store};
use crate::{terminal, ui};

/// Which screen the app is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// The quiz flow: setup, fetching, answering, or a fetch error.
    Session,
    Results,
    Leaderboard,
}

/// Completions delivered from spawned tasks to the event loop.
enum SessionEvent {
    FetchRetry {
        token: u64,
        attempt: u32,
    },
    FetchDone {
        token: u64,
        result: Result<Vec<Question>, FetchError>,
    },
    Tick,
}

/// Results screen state, derived once from the stored result record.
pub struct ResultsView {
    pub result: QuizResult,
    pub split: OutcomeSplit,
    pub categories: Vec<CategoryBreakdown>,
    pub scroll: usize,
    pub saved: bool,
    pub status: Option<String>,
}

impl ResultsView {
    fn new(result: QuizResult) -> Self {
        Self {
            split: results::outcome_split(&result),
            categories: results::category_breakdown(&result),
            result,
            scroll: 0,
            saved: false,
            status: None,
        }
    }
}

/// Leaderboard screen state.
pub struct LeaderboardView {
    pub entries: Vec<LeaderboardEntry>,
    pub filter: Option<QuizType>,
    pub scroll: usize,
}

impl LeaderboardView {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            filter: None,
            scroll: 0,
        }
    }

    /// Entries matching the active filter, in stored (ranked) order.
    pub fn visible(&self) -> Vec<&LeaderboardEntry> {
        self.entries
            .iter()
            .filter(|entry| self.filter.is_none_or(|f| entry.quiz_type == f))
            .collect()
    }

    /// Step the filter: all, then each quiz type in turn.
    pub fn cycle_filter(&mut self) {
        self.filter = match self.filter {
            None => Some(QuizType::Aptitude),
            Some(QuizType::Aptitude) => Some(QuizType::Reasoning),
            Some(QuizType::Reasoning) => Some(QuizType::Verbal),
            Some(QuizType::Verbal) => Some(QuizType::Mixed),
            Some(QuizType::Mixed) => None,
        };
        self.scroll = 0;
    }
}

/// Run the quiz application until the user quits.
pub async fn run(api_url: String, data_dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut app = App::new(api_url, data_dir, tx);

    let mut term = terminal::init()?;
    let result = run_event_loop(&mut term, &mut app, rx).await;
    app.stop_ticker();
    terminal::restore()?;
    result
}

async fn run_event_loop(
    term: &mut terminal::AppTerminal,
    app: &mut App,
    mut rx: mpsc::UnboundedReceiver<SessionEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if app.should_quit {
            return Ok(());
        }

        term.draw(|frame| ui::render(frame, app))?;

        while let Ok(session_event) = rx.try_recv() {
            app.handle_session_event(session_event);
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                app.handle_key(key.code);
            }
        }
    }
}

/// Top-level application state.
pub struct App {
    pub session: QuizSession,
    pub screen: Screen,
    pub results: Option<ResultsView>,
    pub leaderboard: LeaderboardView,
    pub should_quit: bool,
    store: Store,
    client: Arc<QuestionClient>,
    report_dir: PathBuf,
    tx: mpsc::UnboundedSender<SessionEvent>,
    ticker: Option<JoinHandle<()>>,
}

impl App {
    fn new(api_url: String, data_dir: PathBuf, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        let store = Store::open(data_dir.join("storage.json"));
        let prefill = store.read(storage::USERNAME_KEY, String::new());

        Self {
            session: QuizSession::new(QuizType::Mixed, crate::session::DEFAULT_QUESTIONS, prefill),
            screen: Screen::Session,
            results: None,
            leaderboard: LeaderboardView::new(),
            should_quit: false,
            store,
            client: Arc::new(QuestionClient::new(api_url)),
            report_dir: data_dir.join("reports"),
            tx,
            ticker: None,
        }
    }

    // --- input -----------------------------------------------------------

    fn handle_key(&mut self, key: KeyCode) {
        match self.screen {
            Screen::Session => self.handle_session_key(key),
            Screen::Results => self.handle_results_key(key),
            Screen::Leaderboard => self.handle_leaderboard_key(key),
        }
    }

    fn handle_session_key(&mut self, key: KeyCode) {
        match &self.session.phase {
            SessionPhase::AwaitingUsername { .. } => match key {
                KeyCode::Char(c) => self.session.username_input_push(c),
                KeyCode::Backspace => self.session.username_input_pop(),
                KeyCode::Tab => self.session.cycle_quiz_type(),
                KeyCode::Left => self.session.adjust_question_count(-1),
                KeyCode::Right => self.session.adjust_question_count(1),
                KeyCode::Enter => {
                    if self.session.submit_username() {
                        self.store
                            .write(storage::USERNAME_KEY, &self.session.username().to_string());
                        self.start_fetch();
                    }
                }
                KeyCode::Esc => self.should_quit = true,
                _ => {}
            },
            SessionPhase::Fetching { .. } => {
                if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
                    self.should_quit = true;
                }
            }
            SessionPhase::Answering => match key {
                KeyCode::Up | KeyCode::Char('k') => self.session.cursor_up(),
                KeyCode::Down | KeyCode::Char('j') => self.session.cursor_down(),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    let cursor = self.session.cursor();
                    self.session.select_option(cursor);
                }
                KeyCode::Char('n') | KeyCode::Char('N') => self.advance(false),
                KeyCode::Char('s') | KeyCode::Char('S') => self.advance(true),
                KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
                _ => {}
            },
            SessionPhase::Error { .. } => match key {
                // A manual retry starts over with a fresh attempt budget.
                KeyCode::Char('r') | KeyCode::Char('R') => self.start_fetch(),
                KeyCode::Esc => self.enter_setup(),
                KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
                _ => {}
            },
            SessionPhase::Finalized => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(view) = &mut self.results {
                    let max_scroll = view.result.questions.len().saturating_sub(1);
                    view.scroll = (view.scroll + 1).min(max_scroll);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(view) = &mut self.results {
                    view.scroll = view.scroll.saturating_sub(1);
                }
            }
            KeyCode::Char('s') | KeyCode::Char('S') => self.save_to_leaderboard(),
            KeyCode::Char('e') | KeyCode::Char('E') => self.export_report(),
            KeyCode::Char('l') | KeyCode::Char('L') => self.enter_leaderboard(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.retake(),
            KeyCode::Esc => self.enter_setup(),
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_leaderboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('f') | KeyCode::Char('F') => self.leaderboard.cycle_filter(),
            KeyCode::Down | KeyCode::Char('j') => {
                let max_scroll = self.leaderboard.visible().len().saturating_sub(1);
                self.leaderboard.scroll = (self.leaderboard.scroll + 1).min(max_scroll);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.leaderboard.scroll = self.leaderboard.scroll.saturating_sub(1);
            }
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('B') => {
                self.screen = if self.results.is_some() {
                    Screen::Results
                } else {
                    Screen::Session
                };
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    // --- async completions ----------------------------------------------

    fn handle_session_event(&mut self, session_event: SessionEvent) {
        match session_event {
            SessionEvent::FetchRetry { token, attempt } => {
                self.session.fetch_retrying(token, attempt);
            }
            SessionEvent::FetchDone { token, result } => match result {
                Ok(questions) => {
                    if self.session.questions_loaded(token, questions) {
                        self.store
                            .write(storage::QUESTIONS_KEY, &self.session.questions());
                        self.start_ticker();
                    }
                }
                Err(err) => {
                    self.session.fetch_failed(token, err.to_string());
                }
            },
            SessionEvent::Tick => self.session.tick(),
        }
    }

    // --- quiz flow -------------------------------------------------------

    fn start_fetch(&mut self) {
        // A fresh attempt invalidates any running clock from a prior quiz.
        self.stop_ticker();

        let token = self.session.begin_fetch();
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let quiz_type = self.session.quiz_type();
        let count = self.session.question_count();

        tokio::spawn(async move {
            let retry_tx = tx.clone();
            let result = client
                .fetch_questions(quiz_type, count, move |attempt| {
                    let _ = retry_tx.send(SessionEvent::FetchRetry { token, attempt });
                })
                .await;
            let _ = tx.send(SessionEvent::FetchDone { token, result });
        });
    }

    fn advance(&mut self, skip: bool) {
        if let Some(result) = self.session.advance(skip) {
            self.stop_ticker();
            info!(
                score = result.score,
                total = result.questions.len(),
                time = result.time,
                "quiz finalized"
            );
            self.store.write(storage::LAST_RESULTS_KEY, &result);
            self.enter_results();
        }
    }

    fn start_ticker(&mut self) {
        self.stop_ticker();
        let tx = self.tx.clone();
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first tick completes immediately; skip it.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(SessionEvent::Tick).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    // --- navigation ------------------------------------------------------

    /// Show the results of the stored last result, or fall back to the
    /// setup screen when there is none.
    fn enter_results(&mut self) {
        match self.store.read::<Option<QuizResult>>(storage::LAST_RESULTS_KEY, None) {
            Some(result) => {
                self.results = Some(ResultsView::new(result));
                self.screen = Screen::Results;
            }
            None => self.enter_setup(),
        }
    }

    fn enter_setup(&mut self) {
        self.stop_ticker();
        let prefill = self.store.read(storage::USERNAME_KEY, String::new());
        self.session = QuizSession::new(
            self.session.quiz_type(),
            self.session.question_count(),
            prefill,
        );
        self.screen = Screen::Session;
    }

    fn enter_leaderboard(&mut self) {
        self.leaderboard.entries = self.store.read(storage::LEADERBOARD_KEY, Vec::new());
        self.leaderboard.scroll = 0;
        self.screen = Screen::Leaderboard;
    }

    /// Start a new quiz of the same type. A stored username skips the
    /// entry prompt, as on the original retake flow.
    fn retake(&mut self) {
        let quiz_type = self
            .results
            .as_ref()
            .map(|view| view.result.quiz_type)
            .unwrap_or(QuizType::Mixed);
        let stored = self.store.read(storage::USERNAME_KEY, String::new());

        self.session = QuizSession::new(quiz_type, self.session.question_count(), stored.clone());
        self.screen = Screen::Session;

        if let Ok(username) = crate::session::validate_username(&stored) {
            self.session.adopt_username(username);
            self.start_fetch();
        }
    }

    fn save_to_leaderboard(&mut self) {
        let Some(view) = &mut self.results else {
            return;
        };
        if view.saved {
            view.status = Some("Already saved to leaderboard".to_string());
            return;
        }

        results::save_to_leaderboard(&mut self.store, &view.result);
        view.saved = true;
        view.status = Some("Saved to Leaderboard!".to_string());
    }

    fn export_report(&mut self) {
        let Some(view) = &mut self.results else {
            return;
        };

        match report::write_report(&view.result, &self.report_dir) {
            Ok(path) => view.status = Some(format!("Report saved to {}", path.display())),
            // The export stays armed; the user can press e again.
            Err(err) => view.status = Some(format!("Report export failed: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn test_app(dir: &std::path::Path) -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new("http://localhost:0".to_string(), dir.to_path_buf(), tx)
    }

    #[tokio::test]
    async fn results_without_stored_record_fall_back_to_setup() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());

        app.enter_results();
        assert_eq!(app.screen, Screen::Session);
        assert!(matches!(
            app.session.phase,
            SessionPhase::AwaitingUsername { .. }
        ));
    }

    #[tokio::test]
    async fn leaderboard_filter_cycles_back_to_all() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());

        assert_eq!(app.leaderboard.filter, None);
        for _ in 0..5 {
            app.leaderboard.cycle_filter();
        }
        assert_eq!(app.leaderboard.filter, None);
    }

    #[tokio::test]
    async fn leaderboard_filter_limits_visible_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());

        let entry = |quiz_type| LeaderboardEntry {
            id: Uuid::new_v4(),
            username: "someone".to_string(),
            score: 5,
            total_questions: 10,
            time: 60,
            date: Utc::now(),
            quiz_type,
        };
        app.leaderboard.entries = vec![
            entry(QuizType::Verbal),
            entry(QuizType::Mixed),
            entry(QuizType::Verbal),
        ];

        app.leaderboard.filter = Some(QuizType::Verbal);
        assert_eq!(app.leaderboard.visible().len(), 2);
        app.leaderboard.filter = None;
        assert_eq!(app.leaderboard.visible().len(), 3);
    }
}
