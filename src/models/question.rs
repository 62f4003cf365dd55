use serde::{Deserialize, Serialize};

/// A single multiple-choice question as delivered by the question API.
///
/// `correct_answer` is the answer *text* and must match exactly one of the
/// four options; its index is recomputed by lookup, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: [String; 4],
    pub correct_answer: String,
    pub explanation: String,
}

impl Question {
    /// Index of `correct_answer` within `options`.
    ///
    /// Returns `None` when the answer text matches no option, which marks
    /// the question as malformed.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o == &self.correct_answer)
    }
}

/// Category tag selecting a question pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizType {
    Aptitude,
    Reasoning,
    Verbal,
    Mixed,
}

impl QuizType {
    pub const ALL: [QuizType; 4] = [
        QuizType::Mixed,
        QuizType::Aptitude,
        QuizType::Reasoning,
        QuizType::Verbal,
    ];

    /// Lowercase wire name, as sent to the question API.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizType::Aptitude => "aptitude",
            QuizType::Reasoning => "reasoning",
            QuizType::Verbal => "verbal",
            QuizType::Mixed => "mixed",
        }
    }

    /// Capitalized display name.
    pub fn label(&self) -> &'static str {
        match self {
            QuizType::Aptitude => "Aptitude",
            QuizType::Reasoning => "Reasoning",
            QuizType::Verbal => "Verbal",
            QuizType::Mixed => "Mixed",
        }
    }

    /// Parse a type parameter, normalizing unknown values to Mixed.
    pub fn from_param(value: &str) -> QuizType {
        match value {
            "aptitude" => QuizType::Aptitude,
            "reasoning" => QuizType::Reasoning,
            "verbal" => QuizType::Verbal,
            _ => QuizType::Mixed,
        }
    }
}
