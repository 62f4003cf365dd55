//! Persisted quiz outcome records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::question::{Question, QuizType};

/// The outcome of one completed quiz attempt.
///
/// Created once at finalization, stored under the last-results key, and
/// read-only afterwards. `selected_answers` runs parallel to `questions`;
/// `None` marks a skipped question.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub username: String,
    pub quiz_type: QuizType,
    pub questions: Vec<Question>,
    pub selected_answers: Vec<Option<usize>>,
    /// Quiz duration in seconds.
    pub time: u64,
    pub date: DateTime<Utc>,
    /// Count of correctly answered questions.
    pub score: usize,
}

impl QuizResult {
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn percentage(&self) -> u32 {
        if self.questions.is_empty() {
            return 0;
        }
        ((self.score as f64 / self.questions.len() as f64) * 100.0).round() as u32
    }
}

/// One ranked leaderboard row derived from a [`QuizResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub username: String,
    pub score: usize,
    pub total_questions: usize,
    pub time: u64,
    pub date: DateTime<Utc>,
    pub quiz_type: QuizType,
}

impl LeaderboardEntry {
    pub fn percentage(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        ((self.score as f64 / self.total_questions as f64) * 100.0).round() as u32
    }
}
