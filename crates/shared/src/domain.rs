use std::fmt;

use serde::{Deserialize, Serialize};

/// Questions per interview across all four sections.
pub const TOTAL_QUESTIONS: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Theory,
    Aptitude,
    Coding,
    Hr,
}

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [
        QuestionType::Theory,
        QuestionType::Aptitude,
        QuestionType::Coding,
        QuestionType::Hr,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Theory => "theory",
            QuestionType::Aptitude => "aptitude",
            QuestionType::Coding => "coding",
            QuestionType::Hr => "hr",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Theory => "Theory",
            QuestionType::Aptitude => "Aptitude",
            QuestionType::Coding => "Coding",
            QuestionType::Hr => "Hr",
        }
    }

    /// Inclusive 1-based question indices belonging to this section.
    pub fn indices(self) -> std::ops::RangeInclusive<u32> {
        match self {
            QuestionType::Theory => 1..=6,
            QuestionType::Aptitude => 7..=11,
            QuestionType::Coding => 12..=14,
            QuestionType::Hr => 15..=15,
        }
    }

    pub fn for_index(index: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|section| section.indices().contains(&index))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}
