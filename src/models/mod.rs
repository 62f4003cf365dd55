//! Core data types shared across the quiz pipeline.

mod question;
mod result;

pub use question::{Question, QuizType};
pub use result::{LeaderboardEntry, QuizResult};
