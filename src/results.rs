//! Derived statistics and leaderboard persistence.
//!
//! Everything here is computed from a finished [`QuizResult`]; nothing in
//! this module mutates the result itself.

use uuid::Uuid;

use crate::models::{LeaderboardEntry, QuizResult, QuizType};
use crate::storage::{LEADERBOARD_KEY, Store};

/// How the questions of one result divide into outcomes.
///
/// The three counts always sum to the question total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeSplit {
    pub correct: usize,
    pub incorrect: usize,
    pub skipped: usize,
}

impl OutcomeSplit {
    pub fn total(&self) -> usize {
        self.correct + self.incorrect + self.skipped
    }
}

/// Split a result into correct/incorrect/skipped counts.
pub fn outcome_split(result: &QuizResult) -> OutcomeSplit {
    let correct = result.score;
    let skipped = result
        .selected_answers
        .iter()
        .filter(|answer| answer.is_none())
        .count();
    let incorrect = result.questions.len() - correct - skipped;

    OutcomeSplit {
        correct,
        incorrect,
        skipped,
    }
}

/// Share of attempted questions answered correctly, rounded percent.
pub fn accuracy(split: &OutcomeSplit) -> u32 {
    let attempted = split.correct + split.incorrect;
    if attempted == 0 {
        return 0;
    }
    ((split.correct as f64 / attempted as f64) * 100.0).round() as u32
}

/// Average seconds spent per question, rounded.
pub fn average_seconds_per_question(result: &QuizResult) -> u64 {
    if result.questions.is_empty() {
        return 0;
    }
    (result.time as f64 / result.questions.len() as f64).round() as u64
}

const MIXED_CATEGORIES: [&str; 3] = ["Aptitude", "Reasoning", "Verbal"];

const APTITUDE_SUBCATEGORIES: [&str; 4] = ["Arithmetic", "Percentages", "Ratios", "Time & Work"];
const REASONING_SUBCATEGORIES: [&str; 4] = ["Logical", "Patterns", "Sequences", "Puzzles"];
const VERBAL_SUBCATEGORIES: [&str; 4] = ["Vocabulary", "Grammar", "Comprehension", "Synonyms"];

/// Presentation-only category label for the question at `index`.
///
/// Mixed quizzes cycle the three top-level pools; specific types cycle
/// their fixed four sub-categories. Deterministic in (quiz type, index).
pub fn category_label(quiz_type: QuizType, index: usize) -> &'static str {
    match quiz_type {
        QuizType::Mixed => MIXED_CATEGORIES[index % MIXED_CATEGORIES.len()],
        QuizType::Aptitude => APTITUDE_SUBCATEGORIES[index % APTITUDE_SUBCATEGORIES.len()],
        QuizType::Reasoning => REASONING_SUBCATEGORIES[index % REASONING_SUBCATEGORIES.len()],
        QuizType::Verbal => VERBAL_SUBCATEGORIES[index % VERBAL_SUBCATEGORIES.len()],
    }
}

/// Per-category outcome counts, in first-seen category order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBreakdown {
    pub label: &'static str,
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub skipped: usize,
}

/// Group a result's questions by category and count outcomes per group.
pub fn category_breakdown(result: &QuizResult) -> Vec<CategoryBreakdown> {
    let mut groups: Vec<CategoryBreakdown> = Vec::new();

    for (index, question) in result.questions.iter().enumerate() {
        let label = category_label(result.quiz_type, index);
        let position = match groups.iter().position(|g| g.label == label) {
            Some(position) => position,
            None => {
                groups.push(CategoryBreakdown {
                    label,
                    total: 0,
                    correct: 0,
                    incorrect: 0,
                    skipped: 0,
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[position];

        group.total += 1;
        match result.selected_answers.get(index).copied().flatten() {
            None => group.skipped += 1,
            Some(selected) if question.correct_index() == Some(selected) => group.correct += 1,
            Some(_) => group.incorrect += 1,
        }
    }

    groups
}

/// Build the leaderboard row for a result.
///
/// The id is a name-based UUID over (username, date, score), so saving the
/// same result twice produces the same id.
pub fn leaderboard_entry(result: &QuizResult) -> LeaderboardEntry {
    let key = format!(
        "{}|{}|{}",
        result.username,
        result.date.to_rfc3339(),
        result.score
    );

    LeaderboardEntry {
        id: Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()),
        username: result.username.clone(),
        score: result.score,
        total_questions: result.questions.len(),
        time: result.time,
        date: result.date,
        quiz_type: result.quiz_type,
    }
}

/// Sort by score descending, then time ascending. The sort is stable, so
/// entries with equal (score, time) keep their insertion order.
pub fn sort_leaderboard(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| b.score.cmp(&a.score).then(a.time.cmp(&b.time)));
}

/// Upsert the result into the persisted leaderboard and re-sort it.
///
/// A repeat save of the same result replaces its existing row instead of
/// duplicating it.
pub fn save_to_leaderboard(store: &mut Store, result: &QuizResult) -> LeaderboardEntry {
    let mut board: Vec<LeaderboardEntry> = store.read(LEADERBOARD_KEY, Vec::new());
    let entry = leaderboard_entry(result);

    match board.iter_mut().find(|existing| existing.id == entry.id) {
        Some(existing) => *existing = entry.clone(),
        None => board.push(entry.clone()),
    }

    sort_leaderboard(&mut board);
    store.write(LEADERBOARD_KEY, &board);
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;
    use chrono::{TimeZone, Utc};

    fn question(correct: usize) -> Question {
        let options = [
            "one".to_string(),
            "two".to_string(),
            "three".to_string(),
            "four".to_string(),
        ];
        Question {
            question: "pick".to_string(),
            correct_answer: options[correct].clone(),
            options,
            explanation: "because".to_string(),
        }
    }

    fn result_with_answers(
        quiz_type: QuizType,
        answers: Vec<Option<usize>>,
        corrects: Vec<usize>,
    ) -> QuizResult {
        let questions: Vec<Question> = corrects.into_iter().map(question).collect();
        let score = answers
            .iter()
            .zip(questions.iter())
            .filter(|(a, q)| a.is_some() && **a == q.correct_index())
            .count();

        QuizResult {
            username: "splitter".to_string(),
            quiz_type,
            questions,
            selected_answers: answers,
            time: 120,
            date: Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap(),
            score,
        }
    }

    #[test]
    fn outcome_split_sums_to_total() {
        let result = result_with_answers(
            QuizType::Mixed,
            vec![Some(0), Some(3), None, Some(1), None],
            vec![0, 1, 2, 1, 0],
        );

        let split = outcome_split(&result);
        assert_eq!(split.correct, 2);
        assert_eq!(split.skipped, 2);
        assert_eq!(split.incorrect, 1);
        assert_eq!(split.total(), result.questions.len());
    }

    #[test]
    fn accuracy_ignores_skipped_questions() {
        let split = OutcomeSplit {
            correct: 3,
            incorrect: 1,
            skipped: 6,
        };
        assert_eq!(accuracy(&split), 75);

        let all_skipped = OutcomeSplit {
            correct: 0,
            incorrect: 0,
            skipped: 10,
        };
        assert_eq!(accuracy(&all_skipped), 0);
    }

    #[test]
    fn mixed_categories_cycle_by_three() {
        assert_eq!(category_label(QuizType::Mixed, 0), "Aptitude");
        assert_eq!(category_label(QuizType::Mixed, 1), "Reasoning");
        assert_eq!(category_label(QuizType::Mixed, 2), "Verbal");
        assert_eq!(category_label(QuizType::Mixed, 3), "Aptitude");
    }

    #[test]
    fn specific_types_cycle_their_four_subcategories() {
        assert_eq!(category_label(QuizType::Verbal, 0), "Vocabulary");
        assert_eq!(category_label(QuizType::Verbal, 4), "Vocabulary");
        assert_eq!(category_label(QuizType::Aptitude, 3), "Time & Work");
        assert_eq!(category_label(QuizType::Reasoning, 2), "Sequences");
    }

    #[test]
    fn breakdown_counts_match_overall_split() {
        let result = result_with_answers(
            QuizType::Mixed,
            vec![Some(0), Some(3), None, Some(1), None, Some(0)],
            vec![0, 1, 2, 1, 0, 2],
        );

        let split = outcome_split(&result);
        let breakdown = category_breakdown(&result);

        assert_eq!(breakdown.len(), 3);
        assert_eq!(breakdown[0].label, "Aptitude");
        let total: usize = breakdown.iter().map(|g| g.total).sum();
        let correct: usize = breakdown.iter().map(|g| g.correct).sum();
        let skipped: usize = breakdown.iter().map(|g| g.skipped).sum();
        assert_eq!(total, result.questions.len());
        assert_eq!(correct, split.correct);
        assert_eq!(skipped, split.skipped);
    }

    fn entry(username: &str, score: usize, time: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            id: Uuid::new_v4(),
            username: username.to_string(),
            score,
            total_questions: 10,
            time,
            date: Utc::now(),
            quiz_type: QuizType::Mixed,
        }
    }

    #[test]
    fn equal_scores_rank_faster_time_first() {
        let mut board = vec![entry("slow", 8, 120), entry("fast", 8, 90)];
        sort_leaderboard(&mut board);

        assert_eq!(board[0].username, "fast");
        assert_eq!(board[1].username, "slow");
    }

    #[test]
    fn higher_score_outranks_faster_time() {
        let mut board = vec![entry("quick", 5, 30), entry("strong", 9, 300)];
        sort_leaderboard(&mut board);

        assert_eq!(board[0].username, "strong");
    }

    #[test]
    fn equal_score_and_time_keep_insertion_order() {
        let mut board = vec![
            entry("first", 7, 100),
            entry("second", 7, 100),
            entry("third", 7, 100),
        ];
        sort_leaderboard(&mut board);

        let names: Vec<&str> = board.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn repeat_save_replaces_instead_of_duplicating() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(dir.path().join("store.json"));

        let result = result_with_answers(QuizType::Verbal, vec![Some(0)], vec![0]);
        save_to_leaderboard(&mut store, &result);
        save_to_leaderboard(&mut store, &result);

        let board: Vec<LeaderboardEntry> = store.read(LEADERBOARD_KEY, Vec::new());
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn distinct_results_accumulate_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(dir.path().join("store.json"));

        let low = result_with_answers(QuizType::Mixed, vec![None], vec![0]);
        let mut high = result_with_answers(QuizType::Mixed, vec![Some(0)], vec![0]);
        high.username = "other".to_string();

        save_to_leaderboard(&mut store, &low);
        save_to_leaderboard(&mut store, &high);

        let board: Vec<LeaderboardEntry> = store.read(LEADERBOARD_KEY, Vec::new());
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].username, "other");
    }
}
