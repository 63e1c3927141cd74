use exam_core::model::{SessionId, SessionResult};

/// Receives the aggregate result once per finished session.
///
/// Called synchronously from `finish` (or the auto-submitting tick) after the
/// session has moved to `Completed`.
pub trait CompletionListener: Send + Sync {
    fn on_complete(&self, session_id: SessionId, result: &SessionResult);
}

impl<F> CompletionListener for F
where
    F: Fn(SessionId, &SessionResult) + Send + Sync,
{
    fn on_complete(&self, session_id: SessionId, result: &SessionResult) {
        self(session_id, result);
    }
}
