//! Interview progression as plain data: every operation takes an input and
//! returns what happened. The controller owns the I/O around it.

use chrono::Utc;
use serde_json::Value;
use shared::{
    domain::SessionId,
    protocol::{Progress, QuestionPayload, Rephrased, SubmitReply},
};

use crate::{
    error::ClientResult,
    session::{
        banners::{Banner, BannerSet},
        composer::{Composer, TranscriptEntry},
        view::InterviewView,
    },
};

/// Shortest accepted answer, counted after trimming.
pub const MIN_ANSWER_CHARS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No question installed yet.
    Loading,
    Answering,
    Submitting,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket {
    pub session_id: SessionId,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAdmission {
    Ignored,
    TooShort,
    Admitted(SubmitTicket),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Ignored,
    RejectedTooShort,
    BlockedOffTopic,
    Advanced(Progress),
    Completed(Value),
    TransientFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RephraseTicket {
    pub session_id: SessionId,
    question_seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RephraseOutcome {
    Ignored,
    Rephrased { remaining: u32 },
    /// Server said no; the control stays disabled until the next question.
    Rejected,
    /// Transport failure; the control is usable again.
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RephraseControl {
    remaining: u32,
    in_flight: bool,
    rejected: bool,
}

impl RephraseControl {
    fn fresh(remaining: u32) -> Self {
        Self {
            remaining,
            in_flight: false,
            rejected: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn enabled(&self) -> bool {
        self.remaining > 0 && !self.in_flight && !self.rejected
    }
}

#[derive(Debug, Clone)]
pub struct InterviewState {
    session_id: SessionId,
    phase: Phase,
    current: Option<QuestionPayload>,
    question_seq: u64,
    banners: BannerSet,
    rephrase: RephraseControl,
    composer: Composer,
    transcript: Vec<TranscriptEntry>,
    elapsed_secs: u64,
}

impl InterviewState {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            phase: Phase::Loading,
            current: None,
            question_seq: 0,
            banners: BannerSet::default(),
            rephrase: RephraseControl::default(),
            composer: Composer::default(),
            transcript: Vec::new(),
            elapsed_secs: 0,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Set from admission until the reply is handled, and for good once the
    /// interview completes. Submit is enabled exactly when this is clear and
    /// a question is installed.
    pub fn in_flight(&self) -> bool {
        matches!(self.phase, Phase::Submitting | Phase::Completed)
    }

    pub fn submit_enabled(&self) -> bool {
        self.current.is_some() && !self.in_flight()
    }

    pub fn current(&self) -> Option<&QuestionPayload> {
        self.current.as_ref()
    }

    pub fn banners(&self) -> &BannerSet {
        &self.banners
    }

    pub fn rephrase(&self) -> RephraseControl {
        self.rephrase
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut Composer {
        &mut self.composer
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Installs a question and resets everything scoped to the previous one:
    /// banners, composer, submit and rephrase controls.
    pub fn render_question(&mut self, mut payload: QuestionPayload) {
        if let Some(previous) = &self.current {
            if payload.progress.current < previous.progress.current {
                payload.progress = previous.progress;
            }
        }

        self.rephrase = RephraseControl::fresh(payload.rephrases_remaining);
        self.composer = Composer::for_question(payload.question.kind);
        self.banners.clear();
        self.current = Some(payload);
        self.question_seq += 1;
        self.phase = Phase::Answering;
    }

    pub fn begin_submit(&mut self, answer: &str) -> SubmitAdmission {
        if self.phase != Phase::Answering {
            return SubmitAdmission::Ignored;
        }
        let Some(current) = &self.current else {
            return SubmitAdmission::Ignored;
        };

        let answer = answer.trim();
        if answer.chars().count() < MIN_ANSWER_CHARS {
            self.banners.show(Banner::ShortAnswer);
            return SubmitAdmission::TooShort;
        }

        self.transcript.push(TranscriptEntry {
            index: current.progress.current,
            question: current.question.text.clone(),
            answer: answer.to_string(),
            recorded_at: Utc::now(),
        });
        self.phase = Phase::Submitting;
        self.banners.hide(Banner::ShortAnswer);
        self.banners.show(Banner::Evaluating);

        SubmitAdmission::Admitted(SubmitTicket {
            session_id: self.session_id.clone(),
            answer: answer.to_string(),
        })
    }

    pub fn resolve_submit(&mut self, result: ClientResult<SubmitReply>) -> SubmitOutcome {
        if self.phase != Phase::Submitting {
            return SubmitOutcome::Ignored;
        }
        self.banners.hide(Banner::Evaluating);

        match result {
            Err(_) => {
                self.phase = Phase::Answering;
                SubmitOutcome::TransientFailure
            }
            Ok(SubmitReply::OffTopic { .. }) => {
                self.phase = Phase::Answering;
                self.banners.show(Banner::OffTopic);
                SubmitOutcome::BlockedOffTopic
            }
            Ok(SubmitReply::Completed { results }) => {
                self.phase = Phase::Completed;
                SubmitOutcome::Completed(results)
            }
            Ok(SubmitReply::Next(payload)) => {
                let offered = payload.progress;
                self.render_question(payload);
                SubmitOutcome::Advanced(
                    self.current
                        .as_ref()
                        .map_or(offered, |current| current.progress),
                )
            }
        }
    }

    pub fn begin_rephrase(&mut self) -> Option<RephraseTicket> {
        if self.current.is_none() || self.phase == Phase::Completed || !self.rephrase.enabled() {
            return None;
        }
        self.rephrase.in_flight = true;
        Some(RephraseTicket {
            session_id: self.session_id.clone(),
            question_seq: self.question_seq,
        })
    }

    pub fn resolve_rephrase(
        &mut self,
        ticket: &RephraseTicket,
        result: ClientResult<Rephrased>,
    ) -> RephraseOutcome {
        // A newer question replaced the one this rephrase was for.
        if ticket.question_seq != self.question_seq {
            return RephraseOutcome::Ignored;
        }
        self.rephrase.in_flight = false;

        match result {
            Ok(rephrased) => {
                let Some(current) = self.current.as_mut() else {
                    return RephraseOutcome::Ignored;
                };
                current.question.text = rephrased.text;
                let remaining = rephrased
                    .rephrases_remaining
                    .min(self.rephrase.remaining.saturating_sub(1));
                self.rephrase.remaining = remaining;
                current.rephrases_remaining = remaining;
                RephraseOutcome::Rephrased { remaining }
            }
            Err(err) if err.is_server_rejection() => {
                self.rephrase.rejected = true;
                RephraseOutcome::Rejected
            }
            Err(_) => RephraseOutcome::Failed,
        }
    }

    pub fn tick(&mut self) -> u64 {
        self.elapsed_secs += 1;
        self.elapsed_secs
    }

    pub fn view(&self) -> InterviewView {
        InterviewView {
            session_id: self.session_id.clone(),
            phase: self.phase,
            question: self.current.as_ref().map(|current| current.question.clone()),
            progress: self.current.as_ref().map(|current| current.progress),
            rephrases_remaining: self.rephrase.remaining(),
            rephrase_enabled: self.current.is_some()
                && self.phase != Phase::Completed
                && self.rephrase.enabled(),
            submit_enabled: self.submit_enabled(),
            banners: self.banners.clone(),
            coding: self.composer.is_coding(),
            draft_chars: self.composer.char_count(),
            transcript_len: self.transcript.len(),
            elapsed_secs: self.elapsed_secs,
        }
    }
}

#[cfg(test)]
#[path = "../tests/session_tests.rs"]
mod tests;
