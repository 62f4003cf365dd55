//! Quiz session state machine.
//!
//! One [`QuizSession`] owns everything that changes during a quiz attempt:
//! the fetched questions, the answer sheet, the cursor, and the elapsed
//! time. All mutation goes through transition methods; UI event handlers
//! only trigger transitions.

use chrono::Utc;

use crate::models::{Question, QuizResult, QuizType};

/// Smallest selectable question count.
pub const MIN_QUESTIONS: usize = 10;
/// Largest selectable question count.
pub const MAX_QUESTIONS: usize = 20;
/// Count used when the requested one is out of range.
pub const DEFAULT_QUESTIONS: usize = 10;

const USERNAME_MIN_LENGTH: usize = 3;
const USERNAME_MAX_LENGTH: usize = 20;

/// Validate a username: trimmed, 3-20 characters, letters/digits/underscore.
///
/// Returns the trimmed name on success.
pub fn validate_username(raw: &str) -> Result<String, &'static str> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err("Username is required");
    }
    if trimmed.len() < USERNAME_MIN_LENGTH || trimmed.len() > USERNAME_MAX_LENGTH {
        return Err("Username must be 3-20 characters");
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("Username must contain only letters, numbers, and underscores");
    }

    Ok(trimmed.to_string())
}

/// Where the session is in the quiz flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Collecting a username before anything is fetched.
    AwaitingUsername { input: String, error: Option<String> },

    /// A question fetch is in flight; `retries` counts retry attempts so far.
    Fetching { retries: u32 },

    /// Working through the questions.
    Answering,

    /// A result record has been produced.
    Finalized,

    /// The fetch failed terminally.
    Error { message: String },
}

/// State of one quiz attempt, from username entry to the finalized result.
pub struct QuizSession {
    pub phase: SessionPhase,
    quiz_type: QuizType,
    question_count: usize,
    username: String,
    questions: Vec<Question>,
    current_index: usize,
    selected_answers: Vec<Option<usize>>,
    cursor: usize,
    elapsed_seconds: u64,
    fetch_token: u64,
}

impl QuizSession {
    /// Create a session for `quiz_type`, pre-filling the username input.
    ///
    /// A `question_count` outside [10, 20] falls back to 10.
    pub fn new(quiz_type: QuizType, question_count: usize, username_prefill: String) -> Self {
        let question_count = if (MIN_QUESTIONS..=MAX_QUESTIONS).contains(&question_count) {
            question_count
        } else {
            DEFAULT_QUESTIONS
        };

        Self {
            phase: SessionPhase::AwaitingUsername {
                input: username_prefill,
                error: None,
            },
            quiz_type,
            question_count,
            username: String::new(),
            questions: Vec::new(),
            current_index: 0,
            selected_answers: Vec::new(),
            cursor: 0,
            elapsed_seconds: 0,
            fetch_token: 0,
        }
    }

    pub fn quiz_type(&self) -> QuizType {
        self.quiz_type
    }

    pub fn question_count(&self) -> usize {
        self.question_count
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// Answer recorded for the current question.
    pub fn current_answer(&self) -> Option<usize> {
        self.selected_answers
            .get(self.current_index)
            .copied()
            .flatten()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    // --- setup -----------------------------------------------------------

    /// Cycle to the next quiz type in the setup screen.
    pub fn cycle_quiz_type(&mut self) {
        let position = QuizType::ALL
            .iter()
            .position(|t| *t == self.quiz_type)
            .unwrap_or(0);
        self.quiz_type = QuizType::ALL[(position + 1) % QuizType::ALL.len()];
    }

    /// Adjust the question count by `delta`, clamped to [10, 20].
    pub fn adjust_question_count(&mut self, delta: isize) {
        let adjusted = self.question_count.saturating_add_signed(delta);
        self.question_count = adjusted.clamp(MIN_QUESTIONS, MAX_QUESTIONS);
    }

    /// Append a character to the username input.
    pub fn username_input_push(&mut self, c: char) {
        if let SessionPhase::AwaitingUsername { input, error } = &mut self.phase {
            if input.len() < USERNAME_MAX_LENGTH {
                input.push(c);
            }
            *error = None;
        }
    }

    /// Remove the last character from the username input.
    pub fn username_input_pop(&mut self) {
        if let SessionPhase::AwaitingUsername { input, error } = &mut self.phase {
            input.pop();
            *error = None;
        }
    }

    pub fn username_input(&self) -> &str {
        match &self.phase {
            SessionPhase::AwaitingUsername { input, .. } => input,
            _ => "",
        }
    }

    /// Validate the typed username and record it on success.
    ///
    /// On failure the phase keeps the input and carries the rejection
    /// message. The fetch itself is the caller's move.
    pub fn submit_username(&mut self) -> bool {
        let SessionPhase::AwaitingUsername { input, error } = &mut self.phase else {
            return false;
        };

        match validate_username(input) {
            Ok(username) => {
                self.username = username;
                true
            }
            Err(message) => {
                *error = Some(message.to_string());
                false
            }
        }
    }

    /// Adopt a username that was validated previously (e.g. a stored one).
    pub fn adopt_username(&mut self, username: String) {
        self.username = username;
    }

    // --- fetch -----------------------------------------------------------

    /// Enter the Fetching phase and issue a new request token.
    ///
    /// Completions carrying any older token are discarded, so a late
    /// response can never overwrite a newer attempt.
    pub fn begin_fetch(&mut self) -> u64 {
        self.fetch_token += 1;
        self.phase = SessionPhase::Fetching { retries: 0 };
        self.fetch_token
    }

    /// Record a retry attempt for the in-flight fetch.
    pub fn fetch_retrying(&mut self, token: u64, attempt: u32) {
        if token != self.fetch_token {
            return;
        }
        if let SessionPhase::Fetching { retries } = &mut self.phase {
            *retries = attempt;
        }
    }

    /// Accept a fetched question set and start answering.
    ///
    /// Returns false (and changes nothing) when `token` is stale.
    pub fn questions_loaded(&mut self, token: u64, questions: Vec<Question>) -> bool {
        if token != self.fetch_token {
            return false;
        }

        self.selected_answers = vec![None; questions.len()];
        self.questions = questions;
        self.current_index = 0;
        self.cursor = 0;
        self.elapsed_seconds = 0;
        self.phase = SessionPhase::Answering;
        true
    }

    /// Record a terminal fetch failure.
    ///
    /// Returns false when `token` is stale.
    pub fn fetch_failed(&mut self, token: u64, message: String) -> bool {
        if token != self.fetch_token {
            return false;
        }
        self.phase = SessionPhase::Error { message };
        true
    }

    // --- answering -------------------------------------------------------

    /// Advance the session clock by one second.
    pub fn tick(&mut self) {
        if self.phase == SessionPhase::Answering {
            self.elapsed_seconds += 1;
        }
    }

    pub fn cursor_down(&mut self) {
        if let Some(question) = self.current_question() {
            self.cursor = (self.cursor + 1) % question.options.len();
        }
    }

    pub fn cursor_up(&mut self) {
        if let Some(question) = self.current_question() {
            let len = question.options.len();
            self.cursor = (self.cursor + len - 1) % len;
        }
    }

    /// Record `index` as the answer for the current question.
    ///
    /// Re-selecting overwrites the prior choice. Out-of-range indices are
    /// ignored.
    pub fn select_option(&mut self, index: usize) {
        if self.phase != SessionPhase::Answering {
            return;
        }
        let Some(question) = self.questions.get(self.current_index) else {
            return;
        };
        if index < question.options.len() {
            self.selected_answers[self.current_index] = Some(index);
        }
    }

    /// Move to the next question, or finalize on the last one.
    ///
    /// With `skip` the current answer is cleared first. Without it, an
    /// unanswered question blocks progression and `None` is returned.
    /// Finalization computes the score, stamps the result, and moves the
    /// session to Finalized.
    pub fn advance(&mut self, skip: bool) -> Option<QuizResult> {
        if self.phase != SessionPhase::Answering {
            return None;
        }
        let current = self.selected_answers.get(self.current_index).copied()?;

        if skip {
            self.selected_answers[self.current_index] = None;
        } else if current.is_none() {
            return None;
        }

        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            self.cursor = 0;
            return None;
        }

        Some(self.finalize())
    }

    fn finalize(&mut self) -> QuizResult {
        self.phase = SessionPhase::Finalized;

        QuizResult {
            username: self.username.clone(),
            quiz_type: self.quiz_type,
            questions: self.questions.clone(),
            selected_answers: self.selected_answers.clone(),
            time: self.elapsed_seconds,
            date: Utc::now(),
            score: self.calculate_score(),
        }
    }

    /// Count correct answers: the recorded index must equal the index of
    /// `correct_answer` within the options. Skips never count.
    fn calculate_score(&self) -> usize {
        self.selected_answers
            .iter()
            .zip(self.questions.iter())
            .filter(|(answer, question)| answer.is_some() && **answer == question.correct_index())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, correct: usize) -> Question {
        let options = [
            "alpha".to_string(),
            "beta".to_string(),
            "gamma".to_string(),
            "delta".to_string(),
        ];
        Question {
            question: text.to_string(),
            correct_answer: options[correct].clone(),
            options,
            explanation: format!("{text} explained"),
        }
    }

    fn answering_session(questions: Vec<Question>) -> QuizSession {
        let mut session = QuizSession::new(QuizType::Mixed, 10, String::new());
        session.adopt_username("tester".to_string());
        let token = session.begin_fetch();
        assert!(session.questions_loaded(token, questions));
        session
    }

    #[test]
    fn question_count_out_of_range_falls_back_to_default() {
        assert_eq!(QuizSession::new(QuizType::Mixed, 5, String::new()).question_count(), 10);
        assert_eq!(QuizSession::new(QuizType::Mixed, 25, String::new()).question_count(), 10);
        assert_eq!(QuizSession::new(QuizType::Mixed, 15, String::new()).question_count(), 15);
    }

    #[test]
    fn username_too_short_is_rejected_with_length_message() {
        let mut session = QuizSession::new(QuizType::Mixed, 10, "ab".to_string());
        assert!(!session.submit_username());

        let SessionPhase::AwaitingUsername { error, .. } = &session.phase else {
            panic!("expected AwaitingUsername");
        };
        assert_eq!(error.as_deref(), Some("Username must be 3-20 characters"));
    }

    #[test]
    fn valid_username_is_accepted_and_trimmed() {
        let mut session = QuizSession::new(QuizType::Mixed, 10, " ab_12 ".to_string());
        assert!(session.submit_username());
        assert_eq!(session.username(), "ab_12");
    }

    #[test]
    fn username_with_invalid_charset_is_rejected() {
        assert!(validate_username("ab-12").is_err());
        assert!(validate_username("ab 12").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn select_records_and_overwrites_answer() {
        let mut session = answering_session(vec![question("q1", 0), question("q2", 1)]);

        session.select_option(2);
        assert_eq!(session.current_answer(), Some(2));
        session.select_option(0);
        assert_eq!(session.current_answer(), Some(0));
    }

    #[test]
    fn out_of_range_selection_is_ignored() {
        let mut session = answering_session(vec![question("q1", 0)]);
        session.select_option(4);
        assert_eq!(session.current_answer(), None);
    }

    #[test]
    fn advance_without_answer_blocks_progression() {
        let mut session = answering_session(vec![question("q1", 0), question("q2", 1)]);

        assert!(session.advance(false).is_none());
        assert_eq!(session.current_index(), 0);

        session.select_option(0);
        assert!(session.advance(false).is_none());
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn skip_clears_answer_and_advances() {
        let mut session = answering_session(vec![question("q1", 0), question("q2", 1)]);

        session.select_option(3);
        assert!(session.advance(true).is_none());
        assert_eq!(session.current_index(), 1);

        // The skipped question never counts as correct.
        session.select_option(1);
        let result = session.advance(false).expect("final advance produces a result");
        assert_eq!(result.selected_answers[0], None);
        assert_eq!(result.score, 1);
    }

    #[test]
    fn two_question_quiz_correct_then_skipped() {
        let mut session = answering_session(vec![question("q1", 2), question("q2", 1)]);

        session.select_option(2);
        session.advance(false);
        let result = session.advance(true).expect("skip on last question finalizes");

        assert_eq!(result.score, 1);
        assert_eq!(result.selected_answers, vec![Some(2), None]);
        assert_eq!(session.phase, SessionPhase::Finalized);
    }

    #[test]
    fn tick_only_counts_while_answering() {
        let mut session = QuizSession::new(QuizType::Mixed, 10, String::new());
        session.tick();
        assert_eq!(session.elapsed_seconds(), 0);

        let mut session = answering_session(vec![question("q1", 0)]);
        session.tick();
        session.tick();
        assert_eq!(session.elapsed_seconds(), 2);

        session.select_option(0);
        session.advance(false);
        session.tick();
        assert_eq!(session.elapsed_seconds(), 2);
    }

    #[test]
    fn stale_fetch_completion_is_discarded() {
        let mut session = QuizSession::new(QuizType::Mixed, 10, String::new());
        let first = session.begin_fetch();
        let second = session.begin_fetch();

        // The first request resolves late; its payload must not win.
        assert!(!session.questions_loaded(first, vec![question("stale", 0)]));
        assert_eq!(session.phase, SessionPhase::Fetching { retries: 0 });

        assert!(session.questions_loaded(second, vec![question("fresh", 0)]));
        assert_eq!(session.questions()[0].question, "fresh");
    }

    #[test]
    fn stale_fetch_failure_is_discarded() {
        let mut session = QuizSession::new(QuizType::Mixed, 10, String::new());
        let first = session.begin_fetch();
        let second = session.begin_fetch();

        assert!(!session.fetch_failed(first, "boom".to_string()));
        assert!(matches!(session.phase, SessionPhase::Fetching { .. }));

        assert!(session.fetch_failed(second, "boom".to_string()));
        assert!(matches!(session.phase, SessionPhase::Error { .. }));
    }

    #[test]
    fn fetch_retry_updates_phase_counter() {
        let mut session = QuizSession::new(QuizType::Mixed, 10, String::new());
        let token = session.begin_fetch();

        session.fetch_retrying(token, 2);
        assert_eq!(session.phase, SessionPhase::Fetching { retries: 2 });

        session.fetch_retrying(token + 1, 3);
        assert_eq!(session.phase, SessionPhase::Fetching { retries: 2 });
    }

    #[test]
    fn cycle_quiz_type_walks_all_variants() {
        let mut session = QuizSession::new(QuizType::Mixed, 10, String::new());
        let mut seen = vec![session.quiz_type()];
        for _ in 0..3 {
            session.cycle_quiz_type();
            seen.push(session.quiz_type());
        }
        seen.sort_by_key(|t| t.as_str());
        seen.dedup();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn question_count_adjustment_clamps() {
        let mut session = QuizSession::new(QuizType::Mixed, 10, String::new());
        session.adjust_question_count(-1);
        assert_eq!(session.question_count(), 10);
        session.adjust_question_count(15);
        assert_eq!(session.question_count(), 20);
    }
}
