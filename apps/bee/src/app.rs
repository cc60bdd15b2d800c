use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use client_core::{
    session::format_elapsed, ControllerEvent, InterviewApi, InterviewSessionController,
    InterviewView, LandingController, LoadOutcome, Page, RephraseOutcome, RestartOutcome,
    ResultsController, ResultsOutcome, SessionStore, StartOutcome, SubmitOutcome,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::debug;

use crate::terminal::{render_interview, render_results, render_transcript};

/// How the start view is entered.
#[derive(Debug, Clone)]
pub enum Entry {
    Skills(String),
    Resume(PathBuf),
    Prompt,
}

pub struct App {
    api: Arc<dyn InterviewApi>,
    store: Arc<dyn SessionStore>,
    input: Lines<BufReader<Stdin>>,
}

impl App {
    pub fn new(api: Arc<dyn InterviewApi>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            store,
            input: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    pub async fn run(mut self, entry: Entry) -> Result<()> {
        let mut entry = Some(entry);
        let mut page = Page::Start;
        loop {
            let next = match page {
                Page::Start => self.start_view(entry.take().unwrap_or(Entry::Prompt)).await?,
                Page::Interview => self.interview_view().await?,
                Page::Results => self.results_view().await?,
            };
            let Some(next) = next else {
                return Ok(());
            };
            debug!(from = ?page, to = ?next, "navigate");
            page = next;
        }
    }

    async fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.input.next_line().await?)
    }

    async fn start_view(&mut self, entry: Entry) -> Result<Option<Page>> {
        let landing = LandingController::new(self.api.clone(), self.store.clone());
        let first = match entry {
            Entry::Skills(skills) => Some(landing.start_with_skills(&skills).await),
            Entry::Resume(path) => Some(landing.start_with_resume(&path).await),
            Entry::Prompt => None,
        };
        if let Some(outcome) = first {
            if let Some(page) = report_start(outcome) {
                return Ok(Some(page));
            }
        }

        loop {
            println!("Enter your skills (comma separated), /resume <path>, or /quit:");
            let Some(line) = self.read_line().await? else {
                return Ok(None);
            };
            let line = line.trim();
            let outcome = match line.split_once(' ') {
                _ if line == "/quit" => return Ok(None),
                Some(("/resume", path)) => {
                    println!("Analyzing your resume...");
                    landing.start_with_resume(Path::new(path.trim())).await
                }
                _ => {
                    println!("Generating your interview questions...");
                    landing.start_with_skills(line).await
                }
            };
            if let Some(page) = report_start(outcome) {
                return Ok(Some(page));
            }
        }
    }

    async fn interview_view(&mut self) -> Result<Option<Page>> {
        let controller = InterviewSessionController::new(self.api.clone(), self.store.clone());
        let printer = spawn_printer(controller.subscribe_events());

        let next = match controller.load().await {
            LoadOutcome::Redirected => {
                println!("Could not load the interview. Please start again.");
                Some(Page::Start)
            }
            LoadOutcome::Loaded(_) => self.answer_loop(&controller).await?,
        };

        controller.teardown();
        printer.abort();
        Ok(next)
    }

    async fn answer_loop(&mut self, controller: &InterviewSessionController) -> Result<Option<Page>> {
        let mut draft = String::new();
        loop {
            let Some(line) = self.read_line().await? else {
                return Ok(None);
            };
            match line.trim() {
                "/quit" => return Ok(None),
                "/submit" => match controller.submit(&draft).await {
                    SubmitOutcome::Completed(_) => return Ok(Some(Page::Results)),
                    SubmitOutcome::Advanced(_) => draft.clear(),
                    SubmitOutcome::Ignored => println!("Your previous answer is still being evaluated."),
                    SubmitOutcome::RejectedTooShort
                    | SubmitOutcome::BlockedOffTopic
                    | SubmitOutcome::TransientFailure => {}
                },
                "/rephrase" => {
                    if controller.rephrase().await == RephraseOutcome::Ignored {
                        println!("Rephrasing is not available for this question.");
                    }
                }
                "/clear" => {
                    draft.clear();
                    controller.update_draft(&draft).await;
                }
                "/transcript" => print!("{}", render_transcript(&controller.transcript().await)),
                "/time" => {
                    if let Some(view) = controller.snapshot().await {
                        println!("Elapsed {}", format_elapsed(view.elapsed_secs));
                    }
                }
                _ => {
                    if !draft.is_empty() {
                        draft.push('\n');
                    }
                    draft.push_str(&line);
                    controller.update_draft(&draft).await;
                }
            }
        }
    }

    async fn results_view(&mut self) -> Result<Option<Page>> {
        let results = ResultsController::new(self.api.clone(), self.store.clone());
        match results.open() {
            ResultsOutcome::Redirected => return Ok(Some(Page::Start)),
            ResultsOutcome::Ready(view) => print!("{}", render_results(&view)),
        }

        loop {
            println!("\n/restart to try again with the same skills, /new for new skills, /quit:");
            let Some(line) = self.read_line().await? else {
                return Ok(None);
            };
            match line.trim() {
                "/quit" => return Ok(None),
                "/new" => return Ok(Some(Page::Start)),
                "/restart" => {
                    println!("Generating new questions...");
                    return Ok(Some(match results.restart().await {
                        RestartOutcome::Restarted(_) => Page::Interview,
                        RestartOutcome::Redirected => {
                            println!("Restart failed. Please start a new interview.");
                            Page::Start
                        }
                    }));
                }
                _ => {}
            }
        }
    }
}

fn report_start(outcome: StartOutcome) -> Option<Page> {
    match outcome {
        StartOutcome::Started(started) => {
            if !started.skills.is_empty() {
                println!("Interview skills: {}", started.skills.join(", "));
            }
            Some(Page::Interview)
        }
        StartOutcome::Warning(message) => {
            println!("{message}");
            None
        }
    }
}

/// Ignores changes that only move the character counter or the clock.
fn same_screen(a: &InterviewView, b: &InterviewView) -> bool {
    let strip = |view: &InterviewView| InterviewView {
        draft_chars: 0,
        elapsed_secs: 0,
        transcript_len: 0,
        ..view.clone()
    };
    strip(a) == strip(b)
}

fn spawn_printer(mut events: broadcast::Receiver<ControllerEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last: Option<InterviewView> = None;
        loop {
            match events.recv().await {
                Ok(ControllerEvent::Rendered(view)) => {
                    if last.as_ref().is_some_and(|prev| same_screen(prev, &view)) {
                        if view.draft_chars > 0 {
                            println!("  ({} chars)", view.draft_chars);
                        }
                    } else {
                        println!();
                        print!("{}", render_interview(&view));
                    }
                    last = Some(view);
                }
                Ok(ControllerEvent::Tick { elapsed_secs }) => {
                    if elapsed_secs > 0 && elapsed_secs % 60 == 0 {
                        println!("[{} elapsed]", format_elapsed(elapsed_secs));
                    }
                }
                Ok(ControllerEvent::Notice(message)) => println!("! {message}"),
                Ok(ControllerEvent::Navigate(page)) => debug!(?page, "controller navigation"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "renderer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}
