mod completion;
mod progress;
mod review;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use completion::CompletionListener;
pub use progress::SessionProgress;
pub use service::{
    FinishOutcome, FinishPolicy, Navigation, SessionService, Submission, TickReport,
};
pub use workflow::SessionLoopService;
