//! # aptify
//!
//! A terminal aptitude-quiz application: pick a quiz type, answer timed
//! multiple-choice questions fetched from a question API, review scored
//! results with charts, keep a local leaderboard, and export a paginated
//! HTML report.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     aptify::run(
//!         "http://localhost:5000".to_string(),
//!         PathBuf::from("aptify-data"),
//!     )
//!     .await
//! }
//! ```

mod app;
pub mod fetch;
pub mod format;
mod models;
pub mod report;
pub mod results;
pub mod session;
pub mod storage;
pub mod terminal;
mod ui;

pub use app::{App, LeaderboardView, ResultsView, Screen, run};
pub use models::{LeaderboardEntry, Question, QuizResult, QuizType};
pub use session::{QuizSession, SessionPhase};
