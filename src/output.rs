//! Plain-text rendering of API responses for the terminal

use std::fmt::Write;

use crate::data::{AnswerResult, ProblemDetail, ProblemPage, SubmitResponse, User};

/// Renders a problem listing as an aligned table
pub fn render_list(page: &ProblemPage) -> String {
    if page.results.is_empty() {
        return "No problems found.\n".to_string();
    }

    let slug_width = page
        .results
        .iter()
        .map(|p| p.slug.len())
        .max()
        .unwrap_or(0)
        .max("SLUG".len());

    let mut out = String::new();
    let _ = writeln!(out, "  {:<slug_width$}  {:<6}  {:>6}  TITLE", "SLUG", "LEVEL", "POINTS");
    for problem in &page.results {
        let done = if problem.is_completed { "✓" } else { " " };
        let points = problem.points.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{} {:<slug_width$}  {:<6}  {:>6}  {}",
            done,
            problem.slug,
            problem.difficulty.label(),
            points,
            problem.title
        );
    }

    let _ = write!(out, "\nPage {} of {}", page.page, page.total_pages);
    let _ = write!(out, " ({} problems)", page.total_items);
    if let Some(next) = page.next_page.filter(|_| page.has_next) {
        let _ = write!(out, " - next: --page {}", next);
    }
    out.push('\n');
    out
}

/// Renders a problem record with its examples, hints and quiz
pub fn render_detail(detail: &ProblemDetail) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{} [{}]", detail.title, detail.difficulty.label());
    let mut meta = Vec::new();
    if let Some(category) = &detail.category {
        meta.push(category.clone());
    }
    if let Some(points) = detail.points {
        meta.push(format!("{} points", points));
    }
    if !detail.tags.is_empty() {
        meta.push(detail.tags.join(", "));
    }
    if detail.is_completed {
        meta.push("completed".to_string());
    }
    if !meta.is_empty() {
        let _ = writeln!(out, "{}", meta.join(" · "));
    }

    let _ = writeln!(out, "\n{}", detail.description.trim_end());

    for example in &detail.examples {
        let _ = writeln!(out, "\nExample {}:", example.id);
        let _ = writeln!(out, "  Input:  {}", example.input_txt);
        let _ = writeln!(out, "  Output: {}", example.output_txt);
        if !example.explanation.is_empty() {
            let _ = writeln!(out, "  Explanation: {}", example.explanation);
        }
    }

    if let Some(constraints) = &detail.constraints {
        let _ = writeln!(out, "\nConstraints:\n{}", constraints.trim_end());
    }

    if !detail.hints.is_empty() {
        let _ = writeln!(out, "\nHints:");
        for hint in &detail.hints {
            let _ = writeln!(out, "  - {}", hint.text);
        }
    }

    if !detail.challenges.is_empty() {
        let _ = writeln!(out, "\nChallenges:");
        for challenge in &detail.challenges {
            let _ = writeln!(out, "  - {}", challenge.text);
        }
    }

    if !detail.start_function.is_empty() {
        let languages: Vec<&str> = detail
            .start_function
            .iter()
            .map(|f| f.language_name.as_str())
            .collect();
        let _ = writeln!(out, "\nLanguages: {}", languages.join(", "));
    }

    if !detail.videos.is_empty() {
        let _ = writeln!(out, "\nVideos:");
        for video in &detail.videos {
            let _ = writeln!(out, "  - {} ({})", video.title, format_duration(video.duration));
        }
    }

    for question in &detail.questions {
        let _ = writeln!(out, "\nQuestion {}: {}", question.id, question.description);
        for answer in &question.answers {
            let _ = writeln!(out, "  [{}] {}", answer.id, answer.description);
        }
    }

    out
}

pub fn render_submission(response: &SubmitResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", if response.success { "Accepted" } else { "Rejected" });
    if let Some(message) = &response.message {
        let _ = writeln!(out, "{}", message);
    }
    if let Some(result) = &response.result {
        let body = match result {
            serde_json::Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_default(),
        };
        let _ = writeln!(out, "{}", body);
    }
    out
}

pub fn render_answer(result: &AnswerResult) -> String {
    if result.is_correct {
        "Correct!\n".to_string()
    } else {
        "Incorrect.\n".to_string()
    }
}

pub fn render_user(user: Option<&User>) -> String {
    match user {
        Some(user) if !user.full_name.is_empty() => format!("{} ({})\n", user.full_name, user.phone),
        Some(user) => format!("{} ({})\n", user.user, user.phone),
        None => "Not logged in.\n".to_string(),
    }
}

/// Formats seconds as m:ss
fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
