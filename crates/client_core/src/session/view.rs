use shared::{
    domain::{QuestionType, SessionId, TOTAL_QUESTIONS},
    protocol::{Progress, Question},
};

use crate::session::{banners::BannerSet, state::Phase};

/// Everything a renderer needs to draw the interview view.
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewView {
    pub session_id: SessionId,
    pub phase: Phase,
    pub question: Option<Question>,
    pub progress: Option<Progress>,
    pub rephrases_remaining: u32,
    pub rephrase_enabled: bool,
    pub submit_enabled: bool,
    pub banners: BannerSet,
    pub coding: bool,
    pub draft_chars: usize,
    pub transcript_len: usize,
    pub elapsed_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotState {
    Done,
    Current,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressDot {
    pub index: u32,
    pub section: QuestionType,
    pub state: DotState,
}

pub fn progress_dots(current: u32) -> Vec<ProgressDot> {
    QuestionType::ALL
        .into_iter()
        .flat_map(|section| section.indices().map(move |index| (section, index)))
        .filter(|(_, index)| *index <= TOTAL_QUESTIONS)
        .map(|(section, index)| ProgressDot {
            index,
            section,
            state: match index.cmp(&current) {
                std::cmp::Ordering::Less => DotState::Done,
                std::cmp::Ordering::Equal => DotState::Current,
                std::cmp::Ordering::Greater => DotState::Pending,
            },
        })
        .collect()
}

pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
