//! Interview view controller: drives [`InterviewState`] with backend calls,
//! the elapsed-time clock and view events.

use std::{
    sync::{Arc, Mutex as StdMutex, PoisonError, Weak},
    time::Duration,
};

use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::{info, warn};

use crate::{
    api::InterviewApi,
    session::{
        InterviewState, InterviewView, RephraseOutcome, SubmitAdmission, SubmitOutcome,
        TranscriptEntry,
    },
    store::SessionStore,
};

const TICK_INTERVAL: Duration = Duration::from_secs(1);
const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Start,
    Interview,
    Results,
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    Rendered(InterviewView),
    Tick { elapsed_secs: u64 },
    Navigate(Page),
    Notice(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(InterviewView),
    Redirected,
}

enum TimerSlot {
    Idle,
    Running(JoinHandle<()>),
    Stopped,
}

pub struct InterviewSessionController {
    api: Arc<dyn InterviewApi>,
    store: Arc<dyn SessionStore>,
    state: Mutex<Option<InterviewState>>,
    timer: StdMutex<TimerSlot>,
    tick_interval: Duration,
    events: broadcast::Sender<ControllerEvent>,
}

impl InterviewSessionController {
    pub fn new(api: Arc<dyn InterviewApi>, store: Arc<dyn SessionStore>) -> Arc<Self> {
        Self::new_with_tick_interval(api, store, TICK_INTERVAL)
    }

    pub fn new_with_tick_interval(
        api: Arc<dyn InterviewApi>,
        store: Arc<dyn SessionStore>,
        tick_interval: Duration,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            api,
            store,
            state: Mutex::new(None),
            timer: StdMutex::new(TimerSlot::Idle),
            tick_interval,
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> Option<InterviewView> {
        self.state.lock().await.as_ref().map(InterviewState::view)
    }

    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        self.state
            .lock()
            .await
            .as_ref()
            .map(|state| state.transcript().to_vec())
            .unwrap_or_default()
    }

    /// Fetches the current question for the stored session. Without a session
    /// or on any load failure the user is sent back to the start view.
    pub async fn load(self: &Arc<Self>) -> LoadOutcome {
        let Some(session_id) = self.store.session_id() else {
            warn!("interview: no stored session, redirecting to start");
            self.emit(ControllerEvent::Navigate(Page::Start));
            return LoadOutcome::Redirected;
        };

        let payload = match self.api.current_question(&session_id).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(session_id = %session_id, error = %err, "interview: failed to load question");
                self.emit(ControllerEvent::Navigate(Page::Start));
                return LoadOutcome::Redirected;
            }
        };

        info!(
            session_id = %session_id,
            current = payload.progress.current,
            total = payload.progress.total,
            "interview: question loaded"
        );
        let view = {
            let mut guard = self.state.lock().await;
            if guard
                .as_ref()
                .is_some_and(|state| state.session_id() != &session_id)
            {
                *guard = None;
            }
            let state = guard.get_or_insert_with(|| InterviewState::new(session_id));
            state.render_question(payload);
            state.view()
        };
        self.emit(ControllerEvent::Rendered(view.clone()));
        self.start_timer();
        LoadOutcome::Loaded(view)
    }

    pub async fn update_draft(&self, text: &str) {
        let view = {
            let mut guard = self.state.lock().await;
            let Some(state) = guard.as_mut() else {
                return;
            };
            state.composer_mut().set_draft(text);
            state.view()
        };
        self.emit(ControllerEvent::Rendered(view));
    }

    pub async fn submit(&self, answer: &str) -> SubmitOutcome {
        let ticket = {
            let mut guard = self.state.lock().await;
            let Some(state) = guard.as_mut() else {
                return SubmitOutcome::Ignored;
            };
            match state.begin_submit(answer) {
                SubmitAdmission::Ignored => return SubmitOutcome::Ignored,
                SubmitAdmission::TooShort => {
                    self.emit(ControllerEvent::Rendered(state.view()));
                    return SubmitOutcome::RejectedTooShort;
                }
                SubmitAdmission::Admitted(ticket) => {
                    self.emit(ControllerEvent::Rendered(state.view()));
                    ticket
                }
            }
        };

        let result = self
            .api
            .submit_answer(&ticket.session_id, &ticket.answer)
            .await;
        if let Err(err) = &result {
            warn!(session_id = %ticket.session_id, error = %err, "interview: submit failed");
        }

        let (outcome, view) = {
            let mut guard = self.state.lock().await;
            let Some(state) = guard.as_mut() else {
                return SubmitOutcome::Ignored;
            };
            let outcome = state.resolve_submit(result);
            (outcome, state.view())
        };

        match &outcome {
            SubmitOutcome::Completed(results) => {
                info!(session_id = %ticket.session_id, "interview: completed");
                self.stop_timer();
                self.store.save_results(results);
                self.emit(ControllerEvent::Navigate(Page::Results));
            }
            SubmitOutcome::Advanced(progress) => {
                info!(
                    session_id = %ticket.session_id,
                    current = progress.current,
                    "interview: advanced"
                );
                self.emit(ControllerEvent::Rendered(view));
            }
            SubmitOutcome::BlockedOffTopic => {
                info!(session_id = %ticket.session_id, "interview: answer flagged off-topic");
                self.emit(ControllerEvent::Rendered(view));
            }
            SubmitOutcome::TransientFailure => {
                self.emit(ControllerEvent::Notice(
                    "Could not submit your answer. Please try again.".into(),
                ));
                self.emit(ControllerEvent::Rendered(view));
            }
            SubmitOutcome::Ignored | SubmitOutcome::RejectedTooShort => {}
        }
        outcome
    }

    pub async fn rephrase(&self) -> RephraseOutcome {
        let ticket = {
            let mut guard = self.state.lock().await;
            let Some(state) = guard.as_mut() else {
                return RephraseOutcome::Ignored;
            };
            let Some(ticket) = state.begin_rephrase() else {
                return RephraseOutcome::Ignored;
            };
            self.emit(ControllerEvent::Rendered(state.view()));
            ticket
        };

        let result = self.api.rephrase(&ticket.session_id).await;
        if let Err(err) = &result {
            warn!(session_id = %ticket.session_id, error = %err, "interview: rephrase failed");
        }

        let (outcome, view) = {
            let mut guard = self.state.lock().await;
            let Some(state) = guard.as_mut() else {
                return RephraseOutcome::Ignored;
            };
            let outcome = state.resolve_rephrase(&ticket, result);
            (outcome, state.view())
        };

        if outcome == RephraseOutcome::Failed {
            self.emit(ControllerEvent::Notice(
                "Could not rephrase the question. Please try again.".into(),
            ));
        }
        if outcome != RephraseOutcome::Ignored {
            self.emit(ControllerEvent::Rendered(view));
        }
        outcome
    }

    /// Stops the clock. Safe to call more than once.
    pub fn teardown(&self) {
        self.stop_timer();
    }

    fn start_timer(self: &Arc<Self>) {
        let mut slot = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if !matches!(*slot, TimerSlot::Idle) {
            return;
        }
        let controller: Weak<Self> = Arc::downgrade(self);
        let period = self.tick_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                let elapsed_secs = {
                    let mut guard = controller.state.lock().await;
                    match guard.as_mut() {
                        Some(state) => state.tick(),
                        None => continue,
                    }
                };
                controller.emit(ControllerEvent::Tick { elapsed_secs });
            }
        });
        *slot = TimerSlot::Running(handle);
    }

    fn stop_timer(&self) -> bool {
        let mut slot = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(&mut *slot, TimerSlot::Stopped) {
            TimerSlot::Running(handle) => {
                handle.abort();
                true
            }
            TimerSlot::Idle | TimerSlot::Stopped => false,
        }
    }

    fn emit(&self, event: ControllerEvent) {
        let _ = self.events.send(event);
    }
}

impl Drop for InterviewSessionController {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
