//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::config::SessionConfigError;
use exam_core::model::{QuestionType, SessionStatus, SnapshotError};
use exam_core::timer::TimerError;
use storage::repository::StorageError;

/// Errors emitted by session services.
///
/// Refused navigation, a finish that needs confirmation and a repeated
/// submission are ordinary outcomes, not errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,

    #[error("operation not allowed while the session is {status}")]
    InvalidState { status: SessionStatus },

    #[error("question index {index} is out of range for {len} questions")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("answer shape does not fit a {expected} question")]
    AnswerTypeMismatch { expected: QuestionType },

    #[error("question {index} is already submitted")]
    AlreadySubmitted { index: usize },

    #[error("per-question submission is only available in practice mode")]
    PracticeOnly,

    #[error("snapshot holds {found} questions but the bank has {expected}")]
    RestoreMismatch { expected: usize, found: usize },

    #[error("snapshot rejected: {0}")]
    InvalidSnapshot(#[source] SnapshotError),

    #[error("unknown option {0:?}")]
    UnknownOption(String),

    #[error("unknown item {0:?}")]
    UnknownItem(String),

    #[error("unknown zone {0:?}")]
    UnknownZone(String),

    #[error(transparent)]
    Config(#[from] SessionConfigError),

    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<SnapshotError> for SessionError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::LengthMismatch { expected, found } => {
                SessionError::RestoreMismatch { expected, found }
            }
            other => SessionError::InvalidSnapshot(other),
        }
    }
}
