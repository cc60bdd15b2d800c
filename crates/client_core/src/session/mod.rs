//! Client-side interview state machine, free of I/O.

pub mod banners;
pub mod composer;
pub mod state;
pub mod view;

pub use banners::{Banner, BannerSet};
pub use composer::{Composer, TranscriptEntry};
pub use state::{
    InterviewState, Phase, RephraseControl, RephraseOutcome, RephraseTicket, SubmitAdmission,
    SubmitOutcome, SubmitTicket, MIN_ANSWER_CHARS,
};
pub use view::{format_elapsed, progress_dots, DotState, InterviewView, ProgressDot};
