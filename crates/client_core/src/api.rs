//! Backend API seam: the `InterviewApi` trait and its reqwest implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::SessionId,
    error::ApiError,
    protocol::{
        QuestionPayload, RephraseResponse, Rephrased, SessionStarted, StartWithSkillsRequest,
        SubmitAnswerRequest, SubmitAnswerResponse, SubmitReply,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(90);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Upper bounds for outbound calls. Session start gets its own bound because
/// question generation runs inside that request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub start: Duration,
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_TIMEOUT,
            request: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait InterviewApi: Send + Sync {
    async fn current_question(&self, session_id: &SessionId) -> ClientResult<QuestionPayload>;
    async fn submit_answer(&self, session_id: &SessionId, answer: &str)
        -> ClientResult<SubmitReply>;
    async fn rephrase(&self, session_id: &SessionId) -> ClientResult<Rephrased>;
    async fn start_with_skills(&self, skills: &[String]) -> ClientResult<SessionStarted>;
    async fn start_with_resume(&self, upload: ResumeUpload) -> ClientResult<SessionStarted>;
    async fn restart(&self, session_id: &SessionId) -> ClientResult<SessionStarted>;
}

pub struct HttpInterviewApi {
    http: Client,
    base_url: Url,
    timeouts: Timeouts,
}

impl HttpInterviewApi {
    pub fn new(server_url: &str, timeouts: Timeouts) -> ClientResult<Self> {
        let base_url = Url::parse(server_url)
            .map_err(|err| ClientError::Validation(format!("invalid server url '{server_url}': {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Validation(format!(
                "server url '{server_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            http: Client::new(),
            base_url,
            timeouts,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        timeout: Duration,
        endpoint: &'static str,
    ) -> ClientResult<T> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| ClientError::from_reqwest(err, timeout))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| ClientError::from_reqwest(err, timeout))?;

        if !status.is_success() {
            let body: ApiError = serde_json::from_slice(&body).unwrap_or_default();
            warn!(
                endpoint,
                status = status.as_u16(),
                detail = body.message().as_deref().unwrap_or(""),
                "interview api call failed"
            );
            return Err(ClientError::Status { status, body });
        }

        debug!(endpoint, status = status.as_u16(), "interview api call ok");
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl InterviewApi for HttpInterviewApi {
    async fn current_question(&self, session_id: &SessionId) -> ClientResult<QuestionPayload> {
        let url = self.endpoint(&["api", "current-question", session_id.as_str()]);
        self.send(self.http.get(url), self.timeouts.request, "current-question")
            .await
    }

    async fn submit_answer(
        &self,
        session_id: &SessionId,
        answer: &str,
    ) -> ClientResult<SubmitReply> {
        let url = self.endpoint(&["api", "submit-answer"]);
        let request = self.http.post(url).json(&SubmitAnswerRequest {
            session_id: session_id.clone(),
            answer: answer.to_string(),
        });
        let body: SubmitAnswerResponse = self
            .send(request, self.timeouts.request, "submit-answer")
            .await?;
        Ok(body.into_reply()?)
    }

    async fn rephrase(&self, session_id: &SessionId) -> ClientResult<Rephrased> {
        let url = self.endpoint(&["api", "rephrase", session_id.as_str()]);
        let body: RephraseResponse = self
            .send(self.http.post(url), self.timeouts.request, "rephrase")
            .await?;
        Ok(body.into_rephrased()?)
    }

    async fn start_with_skills(&self, skills: &[String]) -> ClientResult<SessionStarted> {
        let url = self.endpoint(&["api", "start-with-skills"]);
        let request = self.http.post(url).json(&StartWithSkillsRequest {
            skills: skills.to_vec(),
        });
        self.send(request, self.timeouts.start, "start-with-skills")
            .await
    }

    async fn start_with_resume(&self, upload: ResumeUpload) -> ClientResult<SessionStarted> {
        let url = self.endpoint(&["api", "start-with-resume"]);
        let mut part = multipart::Part::bytes(upload.bytes).file_name(upload.filename);
        if let Some(mime) = upload.mime_type.as_deref() {
            part = part
                .mime_str(mime)
                .map_err(|err| ClientError::Validation(format!("invalid mime type '{mime}': {err}")))?;
        }
        let form = multipart::Form::new().part("file", part);
        self.send(
            self.http.post(url).multipart(form),
            self.timeouts.start,
            "start-with-resume",
        )
        .await
    }

    async fn restart(&self, session_id: &SessionId) -> ClientResult<SessionStarted> {
        let url = self.endpoint(&["api", "restart", session_id.as_str()]);
        self.send(self.http.post(url), self.timeouts.request, "restart")
            .await
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
