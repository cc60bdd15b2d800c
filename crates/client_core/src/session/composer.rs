use chrono::{DateTime, Utc};
use shared::domain::QuestionType;

const TRANSCRIPT_PREVIEW_CHARS: usize = 120;

/// Per-question input fields. Coding questions write into the code buffer,
/// everything else into the answer text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    coding: bool,
    answer: String,
    code: String,
}

impl Composer {
    pub fn for_question(kind: QuestionType) -> Self {
        Self {
            coding: kind == QuestionType::Coding,
            ..Self::default()
        }
    }

    pub fn is_coding(&self) -> bool {
        self.coding
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        if self.coding {
            self.code = text.into();
        } else {
            self.answer = text.into();
        }
    }

    pub fn draft(&self) -> &str {
        if self.coding {
            &self.code
        } else {
            &self.answer
        }
    }

    pub fn char_count(&self) -> usize {
        self.draft().chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub index: u32,
    pub question: String,
    pub answer: String,
    pub recorded_at: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn question_line(&self) -> String {
        format!("Q{}: {}", self.index, self.question)
    }

    pub fn answer_line(&self) -> String {
        format!("A{}: {}", self.index, truncate_chars(&self.answer, TRANSCRIPT_PREVIEW_CHARS))
    }
}

/// Cuts `text` to `max` characters, appending `...` when anything was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
