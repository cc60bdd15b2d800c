//! Plain-text projections of the controller views.

use std::fmt::Write as _;

use client_core::{
    results::{Grade, ResultsView},
    session::{format_elapsed, progress_dots, Banner, DotState, Phase, TranscriptEntry},
    InterviewView,
};

pub fn banner_text(banner: Banner) -> &'static str {
    match banner {
        Banner::ShortAnswer => "! Answer too short. Write at least a few words.",
        Banner::OffTopic => "! That answer looks off-topic. Please answer the question asked.",
        Banner::Evaluating => "... Evaluating answer",
    }
}

/// One glyph per question, sections separated by a space.
pub fn dots_line(current: u32) -> String {
    let mut line = String::new();
    let mut last_section = None;
    for dot in progress_dots(current) {
        if last_section.is_some_and(|section| section != dot.section) {
            line.push(' ');
        }
        last_section = Some(dot.section);
        line.push(match dot.state {
            DotState::Done => '#',
            DotState::Current => '@',
            DotState::Pending => '.',
        });
    }
    line
}

pub fn render_interview(view: &InterviewView) -> String {
    let mut out = String::new();
    let Some(question) = &view.question else {
        let _ = writeln!(out, "Loading question...");
        return out;
    };

    let (current, total) = view
        .progress
        .map_or((0, 0), |progress| (progress.current, progress.total));
    let _ = writeln!(
        out,
        "[{}] Question {current}/{total}  {}  {}  {}",
        dots_line(current),
        question.kind.label(),
        question.difficulty.label(),
        format_elapsed(view.elapsed_secs),
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", question.text);
    let _ = writeln!(out);

    for banner in view.banners.iter() {
        let _ = writeln!(out, "{}", banner_text(banner));
    }

    let rephrase = if view.rephrase_enabled {
        format!("/rephrase ({} left)", view.rephrases_remaining)
    } else {
        format!("rephrase unavailable ({} left)", view.rephrases_remaining)
    };
    let input = if view.coding { "code" } else { "answer" };
    let _ = writeln!(
        out,
        "Type your {input}, then /submit. {rephrase}. /transcript /time /quit"
    );
    if view.phase == Phase::Submitting {
        let _ = writeln!(out, "(submitting, input is paused)");
    }
    out
}

pub fn render_transcript(entries: &[TranscriptEntry]) -> String {
    if entries.is_empty() {
        return "No answers yet.\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{}", entry.question_line());
        let _ = writeln!(out, "{}", entry.answer_line());
    }
    out
}

fn grade_label(grade: Grade) -> &'static str {
    match grade {
        Grade::Pass => "PASS",
        Grade::Warn => "WARN",
        Grade::Fail => "FAIL",
    }
}

pub fn render_results(view: &ResultsView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Overall: {:.0}%  [{}]", view.percentage, view.verdict);

    if !view.sections.is_empty() {
        let _ = writeln!(out, "\nSections:");
        for row in &view.sections {
            let _ = writeln!(out, "  {:<10} {:>5.0}%", row.section.label(), row.percentage);
        }
    }

    let lists = [
        ("Weak areas", &view.weak_areas),
        ("Suggestions", &view.suggestions),
    ];
    for (title, items) in lists {
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{title}:");
        for item in items {
            let _ = writeln!(out, "  - {item}");
        }
    }

    if !view.resources.is_empty() {
        let _ = writeln!(out, "\nResources:");
        for link in &view.resources {
            let _ = writeln!(out, "  - {} ({})", link.host, link.url);
        }
    }

    if !view.review.is_empty() {
        let _ = writeln!(out, "\nReview:");
        for card in &view.review {
            let _ = writeln!(
                out,
                "  Q{} {} / {}  {:.0} {}",
                card.index,
                card.kind.label(),
                card.difficulty.label(),
                card.score,
                grade_label(card.grade),
            );
            let _ = writeln!(out, "    {}", card.question);
            let _ = writeln!(out, "    > {}", card.answer_preview);
            if !card.feedback.is_empty() {
                let _ = writeln!(out, "    {}", card.feedback);
            }
        }
    }
    out
}
