//! Results report export.
//!
//! Produces a self-contained, print-paginated HTML document for one quiz
//! result: identity header, summary statistics, the two performance charts
//! as inline SVG, then a question-by-question analysis split across pages
//! whenever the remaining vertical budget runs out. Chart rendering
//! failures degrade to a report without charts; only I/O failures surface
//! to the caller.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::format::{format_date, format_time};
use crate::models::{Question, QuizResult};
use crate::results::{self, CategoryBreakdown, OutcomeSplit};

/// Vertical line budget of one analysis page.
pub const PAGE_LINE_BUDGET: usize = 48;

const WRAP_COLUMNS: usize = 90;

const COLOR_CORRECT: &str = "#2ecc71";
const COLOR_INCORRECT: &str = "#e74c3c";
const COLOR_SKIPPED: &str = "#f1c40f";

/// Failure to produce the report artifact.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// The two rendered charts, either of which may be missing.
#[derive(Default)]
pub struct ChartSet {
    pub pie: Option<String>,
    pub bar: Option<String>,
}

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Render both charts, degrading to an empty set on failure.
pub fn render_charts(result: &QuizResult) -> ChartSet {
    let split = results::outcome_split(result);
    let categories = results::category_breakdown(result);

    let pie = pie_chart_svg(&split);
    if pie.is_none() {
        warn!("overall split chart could not be rendered, exporting without it");
    }
    let bar = bar_chart_svg(&categories);
    if bar.is_none() {
        warn!("category chart could not be rendered, exporting without it");
    }

    ChartSet { pie, bar }
}

/// Pie chart of the correct/incorrect/skipped split.
fn pie_chart_svg(split: &OutcomeSplit) -> Option<String> {
    let total = split.total();
    if total == 0 {
        return None;
    }

    let slices: Vec<(&str, usize, &str)> = [
        ("Correct", split.correct, COLOR_CORRECT),
        ("Incorrect", split.incorrect, COLOR_INCORRECT),
        ("Skipped", split.skipped, COLOR_SKIPPED),
    ]
    .into_iter()
    .filter(|(_, count, _)| *count > 0)
    .collect();

    let (cx, cy, r) = (100.0_f64, 100.0_f64, 80.0_f64);
    let mut svg = String::from(
        "<svg width=\"340\" height=\"200\" viewBox=\"0 0 340 200\" xmlns=\"http://www.w3.org/2000/svg\">\n",
    );

    if slices.len() == 1 {
        svg.push_str(&format!(
            "  <circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" fill=\"{}\"/>\n",
            slices[0].2
        ));
    } else {
        let mut angle = -std::f64::consts::FRAC_PI_2;
        for (_, count, color) in &slices {
            let fraction = *count as f64 / total as f64;
            let sweep = fraction * std::f64::consts::TAU;
            let (x0, y0) = (cx + r * angle.cos(), cy + r * angle.sin());
            let end = angle + sweep;
            let (x1, y1) = (cx + r * end.cos(), cy + r * end.sin());
            let large_arc = if fraction > 0.5 { 1 } else { 0 };

            svg.push_str(&format!(
                "  <path d=\"M {cx:.2} {cy:.2} L {x0:.2} {y0:.2} A {r:.2} {r:.2} 0 {large_arc} 1 {x1:.2} {y1:.2} Z\" fill=\"{color}\"/>\n",
            ));
            angle = end;
        }
    }

    // Legend to the right of the pie.
    for (i, (label, count, color)) in slices.iter().enumerate() {
        let y = 60 + i * 26;
        let percent = ((*count as f64 / total as f64) * 100.0).round() as u32;
        svg.push_str(&format!(
            "  <rect x=\"210\" y=\"{}\" width=\"14\" height=\"14\" fill=\"{color}\"/>\n",
            y - 11
        ));
        svg.push_str(&format!(
            "  <text x=\"232\" y=\"{y}\" font-size=\"13\" fill=\"currentColor\">{label}: {count} ({percent}%)</text>\n",
        ));
    }

    svg.push_str("</svg>\n");
    Some(svg)
}

/// Stacked horizontal bar chart of per-category outcomes.
fn bar_chart_svg(categories: &[CategoryBreakdown]) -> Option<String> {
    let max_total = categories.iter().map(|c| c.total).max()?;
    if max_total == 0 {
        return None;
    }

    let bar_height = 22;
    let padding = 10;
    let label_width = 120;
    let max_width = 280.0_f64;
    let total_height = categories.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width as usize + 70,
        total_height
    );

    for (i, category) in categories.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"13\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 8,
            y + bar_height / 2,
            html_escape(category.label)
        ));

        let mut x = label_width as f64;
        for (count, color) in [
            (category.correct, COLOR_CORRECT),
            (category.incorrect, COLOR_INCORRECT),
            (category.skipped, COLOR_SKIPPED),
        ] {
            if count == 0 {
                continue;
            }
            let width = count as f64 / max_total as f64 * max_width;
            svg.push_str(&format!(
                "  <rect x=\"{x:.1}\" y=\"{y}\" width=\"{width:.1}\" height=\"{bar_height}\" fill=\"{color}\"/>\n",
            ));
            x += width;
        }

        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}/{}/{}</text>\n",
            x + 8.0,
            y + bar_height / 2,
            category.correct,
            category.incorrect,
            category.skipped
        ));
    }

    svg.push_str("</svg>\n");
    Some(svg)
}

/// Artifact name: `Aptify_Results_<username>_<date>.html`.
pub fn report_file_name(result: &QuizResult) -> String {
    format!(
        "Aptify_Results_{}_{}.html",
        result.username,
        result.date.format("%Y-%m-%d")
    )
}

/// Render the charts and write the report into `dir`.
///
/// Returns the path of the written file.
pub fn write_report(result: &QuizResult, dir: &Path) -> Result<PathBuf, ReportError> {
    let charts = render_charts(result);
    let html = generate_report(result, &charts);

    fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(result));
    fs::write(&path, html)?;
    Ok(path)
}

/// Generate the full report document.
pub fn generate_report(result: &QuizResult, charts: &ChartSet) -> String {
    let mut pages = vec![summary_page(result, charts)];
    pages.extend(analysis_pages(result));
    let total_pages = pages.len();

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>Aptify results — {}</title>\n",
        html_escape(&result.username)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    for (i, body) in pages.iter().enumerate() {
        html.push_str("<section class=\"page\">\n");
        html.push_str(body);
        html.push_str(&format!(
            "<footer><span>Generated by Aptify - Professional Aptitude Test Platform · Generated on: {}</span><span>Page {} of {}</span></footer>\n",
            format_date(&result.date),
            i + 1,
            total_pages
        ));
        html.push_str("</section>\n");
    }

    html.push_str("</body>\n</html>");
    html
}

fn summary_page(result: &QuizResult, charts: &ChartSet) -> String {
    let split = results::outcome_split(result);
    let total = result.questions.len();
    let percent_of = |count: usize| -> u32 {
        if total == 0 {
            0
        } else {
            ((count as f64 / total as f64) * 100.0).round() as u32
        }
    };

    let mut page = String::new();
    page.push_str("<header>\n<h1>Aptify</h1>\n<p class=\"subtitle\">Aptitude Test Results</p>\n</header>\n");

    page.push_str("<div class=\"meta\">\n<div>\n");
    page.push_str(&format!(
        "<p>Username: {}</p>\n<p>Quiz Type: {}</p>\n<p>Date: {}</p>\n",
        html_escape(&result.username),
        result.quiz_type.label(),
        format_date(&result.date)
    ));
    page.push_str("</div>\n<div>\n");
    page.push_str(&format!(
        "<p>Questions: {}</p>\n<p>Time Taken: {}</p>\n<p>Score: {}/{} ({}%)</p>\n",
        total,
        format_time(result.time),
        result.score,
        total,
        result.percentage()
    ));
    page.push_str("</div>\n</div>\n");

    page.push_str("<h2>Performance Summary</h2>\n<div class=\"summary\">\n");
    page.push_str(&format!(
        "<p>Correct Answers: {} ({}%)</p>\n",
        split.correct,
        percent_of(split.correct)
    ));
    page.push_str(&format!(
        "<p>Incorrect Answers: {} ({}%)</p>\n",
        split.incorrect,
        percent_of(split.incorrect)
    ));
    page.push_str(&format!(
        "<p>Skipped Questions: {} ({}%)</p>\n",
        split.skipped,
        percent_of(split.skipped)
    ));
    page.push_str(&format!("<p>Accuracy: {}%</p>\n", results::accuracy(&split)));
    page.push_str(&format!(
        "<p>Average Time per Question: {} seconds</p>\n",
        results::average_seconds_per_question(result)
    ));
    page.push_str("</div>\n");

    page.push_str("<h2>Performance Charts</h2>\n<div class=\"charts\">\n");
    if let Some(pie) = &charts.pie {
        page.push_str("<figure>\n<figcaption>Performance Breakdown</figcaption>\n");
        page.push_str(pie);
        page.push_str("</figure>\n");
    }
    if let Some(bar) = &charts.bar {
        page.push_str("<figure>\n<figcaption>Score Distribution</figcaption>\n");
        page.push_str(bar);
        page.push_str("</figure>\n");
    }
    if charts.pie.is_none() && charts.bar.is_none() {
        page.push_str("<p class=\"missing\">Charts unavailable.</p>\n");
    }
    page.push_str("</div>\n");

    page
}

/// Split the question analysis into pages under the line budget.
///
/// Each question costs its estimated rendered height; a question that no
/// longer fits starts the next page. A page always holds at least one
/// question, so oversized questions cannot wedge the loop.
fn analysis_pages(result: &QuizResult) -> Vec<String> {
    let mut pages = Vec::new();
    let mut current = String::from("<h2>Question Analysis</h2>\n");
    let mut used_lines = 2;

    for (index, question) in result.questions.iter().enumerate() {
        let selected = result.selected_answers.get(index).copied().flatten();
        let block = question_block(index, question, selected);

        if used_lines + block.lines > PAGE_LINE_BUDGET && used_lines > 2 {
            pages.push(current);
            current = String::from("<h2>Question Analysis (continued)</h2>\n");
            used_lines = 2;
        }

        current.push_str(&block.html);
        used_lines += block.lines;
    }

    if result.questions.is_empty() {
        current.push_str("<p class=\"missing\">No questions recorded.</p>\n");
    }
    pages.push(current);
    pages
}

struct QuestionBlock {
    html: String,
    lines: usize,
}

fn question_block(index: usize, question: &Question, selected: Option<usize>) -> QuestionBlock {
    let correct = question.correct_index();

    let (status, class) = match selected {
        None => ("Skipped", "status-skipped"),
        Some(choice) if Some(choice) == correct => ("Correct", "status-correct"),
        Some(_) => ("Incorrect", "status-incorrect"),
    };

    let question_lines = wrap_count(&question.question);
    let explanation_lines = wrap_count(&question.explanation);
    let lines = 1 + question_lines + question.options.len() + explanation_lines + 2;

    let mut html = String::from("<div class=\"question\">\n");
    html.push_str(&format!(
        "<p class=\"status {class}\">Question {}: {status}</p>\n",
        index + 1
    ));
    html.push_str(&format!(
        "<p class=\"question-text\">{}</p>\n",
        html_escape(&question.question)
    ));

    html.push_str("<ul class=\"options\">\n");
    for (opt_index, option) in question.options.iter().enumerate() {
        let letter = (b'A' + opt_index as u8) as char;
        let is_correct = Some(opt_index) == correct;
        let is_wrong_pick = Some(opt_index) == selected && !is_correct;

        let class = if is_correct {
            " class=\"option-correct\""
        } else if is_wrong_pick {
            " class=\"option-incorrect\""
        } else {
            ""
        };
        let marker = if is_correct {
            "✓ "
        } else if is_wrong_pick {
            "✗ "
        } else {
            ""
        };
        let suffix = if is_correct { " (Correct Answer)" } else { "" };

        html.push_str(&format!(
            "<li{class}>{marker}{letter}. {}{suffix}</li>\n",
            html_escape(option)
        ));
    }
    html.push_str("</ul>\n");

    html.push_str(&format!(
        "<p class=\"explanation\">Explanation: {}</p>\n",
        html_escape(&question.explanation)
    ));
    html.push_str("</div>\n");

    QuestionBlock { html, lines }
}

/// Number of lines `text` wraps into at the report column width.
fn wrap_count(text: &str) -> usize {
    let mut lines = 1;
    let mut column = 0;

    for word in text.split_whitespace() {
        let width = word.chars().count();
        if column > 0 && column + 1 + width > WRAP_COLUMNS {
            lines += 1;
            column = width;
        } else {
            column += if column > 0 { 1 + width } else { width };
        }
    }

    lines
}

const CSS: &str = r#"
:root { --fg: #1a1a1a; --muted: #6b7280; --border: #d1d5db; }
body { font-family: Helvetica, Arial, sans-serif; margin: 0; color: var(--fg); background: #f3f4f6; }
.page { background: #fff; max-width: 760px; margin: 1.5rem auto; padding: 2.5rem 3rem; box-shadow: 0 1px 4px rgba(0,0,0,0.15); page-break-after: always; }
h1 { margin: 0; font-size: 2rem; }
h2 { border-bottom: 1px solid var(--border); padding-bottom: 0.3rem; margin-top: 2rem; }
.subtitle { color: var(--muted); margin-top: 0.2rem; border-bottom: 1px solid var(--border); padding-bottom: 1rem; }
.meta { display: flex; gap: 4rem; }
.meta p, .summary p { margin: 0.3rem 0; }
.charts { display: flex; gap: 2rem; flex-wrap: wrap; }
.charts figcaption { font-weight: bold; margin-bottom: 0.5rem; }
.question { margin: 1.2rem 0; }
.status { font-weight: bold; }
.status-correct { color: #2ecc71; }
.status-incorrect { color: #e74c3c; }
.status-skipped { color: #b7950b; }
.options { list-style: none; padding-left: 1rem; margin: 0.4rem 0; }
.option-correct { color: #2ecc71; }
.option-incorrect { color: #e74c3c; }
.explanation { color: var(--muted); font-size: 0.9rem; }
.missing { color: var(--muted); font-style: italic; }
footer { display: flex; justify-content: space-between; color: #9ca3af; font-size: 0.75rem; border-top: 1px solid var(--border); margin-top: 2rem; padding-top: 0.5rem; }
@media print { body { background: #fff; } .page { box-shadow: none; margin: 0; } }
"#;
