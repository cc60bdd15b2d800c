//! Start view: begins a session from a skill list or a resume file.

use std::{path::Path, sync::Arc};

use shared::protocol::SessionStarted;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    api::{InterviewApi, ResumeUpload},
    controller::{ControllerEvent, Page},
    error::ClientError,
    store::SessionStore,
};

pub const EMPTY_SKILLS_MESSAGE: &str = "Please enter at least one skill.";
pub const SKILLS_FALLBACK_MESSAGE: &str = "Failed to start interview.";
pub const RESUME_FALLBACK_MESSAGE: &str = "Failed to process resume.";

#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    Started(SessionStarted),
    /// Nothing was started; the message goes into the form's warning line.
    Warning(String),
}

/// Splits comma-separated input into trimmed, non-empty skills.
pub fn parse_skills(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
        .map(str::to_owned)
        .collect()
}

fn resume_mime_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some("application/pdf"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}

pub struct LandingController {
    api: Arc<dyn InterviewApi>,
    store: Arc<dyn SessionStore>,
    events: broadcast::Sender<ControllerEvent>,
}

impl LandingController {
    pub fn new(api: Arc<dyn InterviewApi>, store: Arc<dyn SessionStore>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self { api, store, events }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn start_with_skills(&self, input: &str) -> StartOutcome {
        let skills = parse_skills(input);
        if skills.is_empty() {
            return StartOutcome::Warning(EMPTY_SKILLS_MESSAGE.to_string());
        }

        info!(count = skills.len(), "landing: starting interview from skills");
        match self.api.start_with_skills(&skills).await {
            Ok(started) => self.enter_interview(started),
            Err(err) => {
                warn!(error = %err, "landing: start with skills failed");
                StartOutcome::Warning(err.user_message(SKILLS_FALLBACK_MESSAGE))
            }
        }
    }

    pub async fn start_with_resume(&self, path: &Path) -> StartOutcome {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(source) => {
                let err = ClientError::Io {
                    path: path.display().to_string(),
                    source,
                };
                warn!(error = %err, "landing: resume unreadable");
                return StartOutcome::Warning(format!("Could not read resume: {err}"));
            }
        };
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());

        info!(filename = %filename, size = bytes.len(), "landing: uploading resume");
        let upload = ResumeUpload {
            filename,
            mime_type: resume_mime_type(path).map(str::to_owned),
            bytes,
        };
        match self.api.start_with_resume(upload).await {
            Ok(started) => self.enter_interview(started),
            Err(err) => {
                warn!(error = %err, "landing: start with resume failed");
                let message = match &err {
                    // Only plain-string details are shown for resume uploads.
                    ClientError::Status { body, .. } => body
                        .text()
                        .unwrap_or_else(|| RESUME_FALLBACK_MESSAGE.to_string()),
                    other => other.user_message(RESUME_FALLBACK_MESSAGE),
                };
                StartOutcome::Warning(message)
            }
        }
    }

    fn enter_interview(&self, started: SessionStarted) -> StartOutcome {
        info!(session_id = %started.session_id, "landing: session started");
        self.store.save_session(&started);
        let _ = self.events.send(ControllerEvent::Navigate(Page::Interview));
        StartOutcome::Started(started)
    }
}

#[cfg(test)]
#[path = "tests/landing_tests.rs"]
mod tests;
