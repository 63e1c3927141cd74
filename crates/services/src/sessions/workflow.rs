use std::sync::Arc;

use exam_core::config::SessionConfig;
use exam_core::model::{Question, SessionId, SessionStatus};
use storage::repository::{ResultRepository, SnapshotRepository, Storage};
use tracing::{info, warn};

use super::completion::CompletionListener;
use super::service::{FinishOutcome, FinishPolicy, SessionService, TickReport};
use crate::Clock;
use crate::error::SessionError;

/// Orchestrates session start, save-and-resume, and result persistence.
///
/// Nothing is saved implicitly: progress reaches storage only through `save`,
/// and a session dropped without saving is gone.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    snapshots: Arc<dyn SnapshotRepository>,
    results: Arc<dyn ResultRepository>,
    listener: Option<Arc<dyn CompletionListener>>,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        snapshots: Arc<dyn SnapshotRepository>,
        results: Arc<dyn ResultRepository>,
    ) -> Self {
        Self {
            clock,
            snapshots,
            results,
            listener: None,
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(
            clock,
            Arc::clone(&storage.snapshots),
            Arc::clone(&storage.results),
        )
    }

    /// Listener handed to every session this service starts.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn CompletionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Start a session, resuming from the stored snapshot when `resume` names
    /// one. A resume id without a stored snapshot starts fresh under that id.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for storage failures, configuration errors, or
    /// a snapshot that does not fit the questions.
    pub async fn start_session(
        &self,
        questions: Vec<Question>,
        config: SessionConfig,
        resume: Option<SessionId>,
    ) -> Result<SessionService, SessionError> {
        let id = resume.unwrap_or_else(SessionId::generate);
        let snapshot = match resume {
            Some(id) => self.snapshots.load_snapshot(id).await?,
            None => None,
        };
        if resume.is_some() && snapshot.is_none() {
            info!(session = %id, "no saved snapshot, starting fresh");
        }

        let mut session = SessionService::new(id, questions, config)?;
        if let Some(listener) = &self.listener {
            session.set_listener(Arc::clone(listener));
        }
        session.start(snapshot.as_ref(), self.clock.now())?;
        Ok(session)
    }

    /// Persist a snapshot of an in-progress session.
    ///
    /// A failed save is reported and never retried; the session is untouched.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the session is `InProgress`, otherwise
    /// `SessionError::Storage`.
    pub async fn save(&self, session: &SessionService) -> Result<(), SessionError> {
        if session.status() != SessionStatus::InProgress {
            return Err(SessionError::InvalidState {
                status: session.status(),
            });
        }
        let snapshot = session.snapshot(self.clock.now());
        if let Err(err) = self.snapshots.save_snapshot(session.id(), &snapshot).await {
            warn!(session = %session.id(), error = %err, "saving session snapshot failed");
            return Err(err.into());
        }
        Ok(())
    }

    /// Finish the session and persist its result.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if finishing is not allowed or persistence fails.
    /// A persistence failure leaves the session completed; retry with
    /// [`SessionLoopService::finalize_result`].
    pub async fn finish(
        &self,
        session: &mut SessionService,
        policy: FinishPolicy,
    ) -> Result<FinishOutcome, SessionError> {
        let outcome = session.finish(self.clock.now(), policy)?;
        if matches!(outcome, FinishOutcome::Completed(_)) {
            self.finalize_result(session).await?;
        }
        Ok(outcome)
    }

    /// Drive one timer tick and persist the result if it auto-submitted.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the auto-submitted result cannot be stored.
    pub async fn tick(&self, session: &mut SessionService) -> Result<TickReport, SessionError> {
        let report = session.tick(self.clock.now());
        if report.completion.is_some() {
            self.finalize_result(session).await?;
        }
        Ok(report)
    }

    /// Store the result of a completed session and drop its snapshot.
    ///
    /// Idempotent: a session whose result is already stored returns the same id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the session is not complete, or
    /// `SessionError::Storage` if persistence fails.
    pub async fn finalize_result(&self, session: &mut SessionService) -> Result<i64, SessionError> {
        if let Some(id) = session.result_id() {
            return Ok(id);
        }
        let Some(result) = session.result() else {
            return Err(SessionError::InvalidState {
                status: session.status(),
            });
        };

        let id = self.results.append_result(session.id(), result).await?;
        session.set_result_id(id);
        self.snapshots.delete_snapshot(session.id()).await?;
        info!(session = %session.id(), result_id = id, "session result stored");
        Ok(id)
    }

    /// Forget a saved session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the snapshot cannot be deleted.
    pub async fn discard(&self, session_id: SessionId) -> Result<(), SessionError> {
        self.snapshots.delete_snapshot(session_id).await?;
        info!(session = %session_id, "session discarded");
        Ok(())
    }
}
