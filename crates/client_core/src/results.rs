//! Results view: projects the stored report and restarts the interview.

use std::sync::Arc;

use shared::{
    domain::{Difficulty, QuestionType},
    protocol::{ResultsReport, SessionStarted},
};
use tokio::sync::broadcast;
use tracing::{info, warn};
use url::Url;

use crate::{
    api::InterviewApi,
    controller::{ControllerEvent, Page},
    session::composer::truncate_chars,
    store::SessionStore,
};

const REVIEW_ANSWER_PREVIEW_CHARS: usize = 200;
const DEFAULT_VERDICT: &str = "POOR";
const UNNAMED_TOPIC: &str = "General";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Pass,
    Warn,
    Fail,
}

impl Grade {
    pub fn for_score(score: f64) -> Self {
        if score >= 70.0 {
            Grade::Pass
        } else if score >= 40.0 {
            Grade::Warn
        } else {
            Grade::Fail
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionRow {
    pub section: QuestionType,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLink {
    pub url: String,
    pub host: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewCard {
    pub index: u32,
    pub kind: QuestionType,
    pub difficulty: Difficulty,
    pub question: String,
    pub answer_preview: String,
    pub feedback: String,
    pub score: f64,
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub percentage: f64,
    pub verdict: String,
    /// Sections the report scored; absent sections are left out.
    pub sections: Vec<SectionRow>,
    pub weak_areas: Vec<String>,
    pub suggestions: Vec<String>,
    pub resources: Vec<ResourceLink>,
    pub review: Vec<ReviewCard>,
}

impl ResultsView {
    pub fn from_report(report: &ResultsReport) -> Self {
        let sections = QuestionType::ALL
            .into_iter()
            .filter_map(|section| {
                report.section(section).map(|score| SectionRow {
                    section,
                    percentage: score.percentage.unwrap_or(0.0),
                })
            })
            .collect();

        let resources = report
            .learning_resources
            .iter()
            .map(|url| ResourceLink {
                url: url.clone(),
                host: resource_host(url),
            })
            .collect();

        let review = report
            .review
            .iter()
            .map(|item| ReviewCard {
                index: item.index,
                kind: item.kind,
                difficulty: item.difficulty,
                question: item.question.clone(),
                answer_preview: truncate_chars(&item.answer, REVIEW_ANSWER_PREVIEW_CHARS),
                feedback: item.feedback.clone(),
                score: item.score,
                grade: Grade::for_score(item.score),
            })
            .collect();

        Self {
            percentage: report.percentage.unwrap_or(0.0),
            verdict: report
                .verdict
                .clone()
                .filter(|verdict| !verdict.is_empty())
                .unwrap_or_else(|| DEFAULT_VERDICT.to_string()),
            sections,
            weak_areas: report
                .weak_areas
                .iter()
                .map(|area| {
                    area.topic
                        .clone()
                        .filter(|topic| !topic.trim().is_empty())
                        .unwrap_or_else(|| UNNAMED_TOPIC.to_string())
                })
                .collect(),
            suggestions: report.improvement_suggestions.clone(),
            resources,
            review,
        }
    }
}

pub fn resource_host(raw: &str) -> String {
    if let Some(host) = Url::parse(raw).ok().and_then(|url| url.host_str().map(str::to_owned)) {
        return host;
    }
    raw.trim_start_matches("https://")
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultsOutcome {
    Ready(ResultsView),
    Redirected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RestartOutcome {
    Restarted(SessionStarted),
    Redirected,
}

pub struct ResultsController {
    api: Arc<dyn InterviewApi>,
    store: Arc<dyn SessionStore>,
    events: broadcast::Sender<ControllerEvent>,
}

impl ResultsController {
    pub fn new(api: Arc<dyn InterviewApi>, store: Arc<dyn SessionStore>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self { api, store, events }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub fn open(&self) -> ResultsOutcome {
        let Some(raw) = self.store.results() else {
            warn!("results: nothing stored, redirecting to start");
            self.navigate(Page::Start);
            return ResultsOutcome::Redirected;
        };
        let report = serde_json::from_value::<ResultsReport>(raw).unwrap_or_else(|err| {
            warn!(error = %err, "results: report does not match the expected shape");
            ResultsReport::default()
        });
        ResultsOutcome::Ready(ResultsView::from_report(&report))
    }

    /// Starts a fresh session with the same skills. Stored results are only
    /// dropped once the new session is saved.
    pub async fn restart(&self) -> RestartOutcome {
        let Some(session_id) = self.store.session_id() else {
            self.navigate(Page::Start);
            return RestartOutcome::Redirected;
        };

        match self.api.restart(&session_id).await {
            Ok(started) => {
                info!(
                    previous = %session_id,
                    session_id = %started.session_id,
                    "results: interview restarted"
                );
                self.store.save_session(&started);
                self.store.clear_results();
                self.navigate(Page::Interview);
                RestartOutcome::Restarted(started)
            }
            Err(err) => {
                warn!(session_id = %session_id, error = %err, "results: restart failed");
                self.navigate(Page::Start);
                RestartOutcome::Redirected
            }
        }
    }

    fn navigate(&self, page: Page) {
        let _ = self.events.send(ControllerEvent::Navigate(page));
    }
}

#[cfg(test)]
#[path = "tests/results_tests.rs"]
mod tests;
