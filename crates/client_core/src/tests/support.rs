use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use shared::{
    domain::{Difficulty, QuestionType, SessionId},
    error::{ApiError, ProtocolError},
    protocol::{Progress, Question, QuestionPayload, Rephrased, SessionStarted, SubmitReply},
};
use tokio::sync::Semaphore;

use crate::{
    api::{InterviewApi, ResumeUpload},
    error::{ClientError, ClientResult},
    store::{MemorySessionStore, SessionStore, StoreKey},
};

pub(crate) fn question(current: u32, kind: QuestionType, text: &str, rephrases: u32) -> QuestionPayload {
    QuestionPayload {
        question: Question {
            kind,
            difficulty: Difficulty::Easy,
            text: text.to_string(),
            topic: None,
        },
        progress: Progress {
            current,
            total: 15,
        },
        rephrases_remaining: rephrases,
    }
}

pub(crate) fn started(session_id: &str, skills: &[&str]) -> SessionStarted {
    SessionStarted {
        session_id: SessionId(session_id.to_string()),
        skills: skills.iter().map(|s| s.to_string()).collect(),
    }
}

pub(crate) fn store_with_session(session_id: &str) -> Arc<MemorySessionStore> {
    let store = MemorySessionStore::new();
    store.set(StoreKey::SessionId, session_id.to_string());
    Arc::new(store)
}

#[derive(Debug, Clone)]
pub(crate) enum Failure {
    Timeout,
    Status(u16, &'static str),
    Rejected(&'static str),
}

impl Failure {
    fn into_error(self) -> ClientError {
        match self {
            Failure::Timeout => ClientError::Timeout(Duration::from_secs(90)),
            Failure::Status(code, detail) => ClientError::Status {
                status: StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                body: ApiError::new(detail),
            },
            Failure::Rejected(message) => {
                ClientError::Protocol(ProtocolError::Rejected(message.to_string()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    CurrentQuestion(SessionId),
    Submit(SessionId, String),
    Rephrase(SessionId),
    StartWithSkills(Vec<String>),
    StartWithResume(String),
    Restart(SessionId),
}

type Script<T> = Mutex<VecDeque<Result<T, Failure>>>;

fn next<T>(script: &Script<T>) -> ClientResult<T> {
    script
        .lock()
        .expect("script lock")
        .pop_front()
        .unwrap_or(Err(Failure::Timeout))
        .map_err(Failure::into_error)
}

/// Scripted backend. Each endpoint answers from its own queue and falls back
/// to a timeout once the queue is empty.
#[derive(Default)]
pub(crate) struct FakeApi {
    pub(crate) questions: Script<QuestionPayload>,
    pub(crate) submits: Script<SubmitReply>,
    pub(crate) rephrases: Script<Rephrased>,
    pub(crate) starts: Script<SessionStarted>,
    pub(crate) restarts: Script<SessionStarted>,
    pub(crate) calls: Mutex<Vec<Call>>,
    pub(crate) submit_gate: Option<Arc<Semaphore>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            submit_gate: Some(gate),
            ..Self::default()
        }
    }

    pub(crate) fn push_question(&self, reply: Result<QuestionPayload, Failure>) {
        self.questions.lock().expect("lock").push_back(reply);
    }

    pub(crate) fn push_submit(&self, reply: Result<SubmitReply, Failure>) {
        self.submits.lock().expect("lock").push_back(reply);
    }

    pub(crate) fn push_rephrase(&self, reply: Result<Rephrased, Failure>) {
        self.rephrases.lock().expect("lock").push_back(reply);
    }

    pub(crate) fn push_start(&self, reply: Result<SessionStarted, Failure>) {
        self.starts.lock().expect("lock").push_back(reply);
    }

    pub(crate) fn push_restart(&self, reply: Result<SessionStarted, Failure>) {
        self.restarts.lock().expect("lock").push_back(reply);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    pub(crate) fn submit_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Submit(..)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("lock").push(call);
    }
}

#[async_trait]
impl InterviewApi for FakeApi {
    async fn current_question(&self, session_id: &SessionId) -> ClientResult<QuestionPayload> {
        self.record(Call::CurrentQuestion(session_id.clone()));
        next(&self.questions)
    }

    async fn submit_answer(
        &self,
        session_id: &SessionId,
        answer: &str,
    ) -> ClientResult<SubmitReply> {
        self.record(Call::Submit(session_id.clone(), answer.to_string()));
        if let Some(gate) = &self.submit_gate {
            let _permit = gate.acquire().await.expect("gate open");
        }
        next(&self.submits)
    }

    async fn rephrase(&self, session_id: &SessionId) -> ClientResult<Rephrased> {
        self.record(Call::Rephrase(session_id.clone()));
        next(&self.rephrases)
    }

    async fn start_with_skills(&self, skills: &[String]) -> ClientResult<SessionStarted> {
        self.record(Call::StartWithSkills(skills.to_vec()));
        next(&self.starts)
    }

    async fn start_with_resume(&self, upload: ResumeUpload) -> ClientResult<SessionStarted> {
        self.record(Call::StartWithResume(upload.filename));
        next(&self.starts)
    }

    async fn restart(&self, session_id: &SessionId) -> ClientResult<SessionStarted> {
        self.record(Call::Restart(session_id.clone()));
        next(&self.restarts)
    }
}
