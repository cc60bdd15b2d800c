//! Client side of the BEE mock-interview flow: backend API access, the
//! interview state machine and the controllers behind the start, interview
//! and results views.

pub mod api;
pub mod controller;
pub mod error;
pub mod landing;
pub mod results;
pub mod session;
pub mod store;

pub use api::{HttpInterviewApi, InterviewApi, ResumeUpload, Timeouts};
pub use controller::{ControllerEvent, InterviewSessionController, LoadOutcome, Page};
pub use error::{ClientError, ClientResult};
pub use landing::{LandingController, StartOutcome};
pub use results::{ResultsController, ResultsOutcome, ResultsView, RestartOutcome};
pub use session::{InterviewView, RephraseOutcome, SubmitOutcome};
pub use store::{MemorySessionStore, SessionStore, StoreKey};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
