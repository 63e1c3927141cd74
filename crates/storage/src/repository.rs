use async_trait::async_trait;
use exam_core::model::{SessionId, SessionResult, SessionSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted session result together with its storage id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub id: i64,
    pub session_id: SessionId,
    pub result: SessionResult,
}

impl ResultRow {
    #[must_use]
    pub fn new(id: i64, session_id: SessionId, result: SessionResult) -> Self {
        Self {
            id,
            session_id,
            result,
        }
    }
}

/// Save-and-resume contract for in-progress sessions.
///
/// A save is a one-shot request: adapters never retry, and callers decide what
/// to do with a failure.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Persist or replace the snapshot for a session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_snapshot(
        &self,
        session_id: SessionId,
        snapshot: &SessionSnapshot,
    ) -> Result<(), StorageError>;

    /// Fetch the latest snapshot for a session. `Ok(None)` means none was saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn load_snapshot(
        &self,
        session_id: SessionId,
    ) -> Result<Option<SessionSnapshot>, StorageError>;

    /// Remove a stored snapshot. Deleting a missing snapshot is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection failures.
    async fn delete_snapshot(&self, session_id: SessionId) -> Result<(), StorageError>;
}

/// Append-only log of completed sessions.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Store a result and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn append_result(
        &self,
        session_id: SessionId,
        result: &SessionResult,
    ) -> Result<i64, StorageError>;

    /// Most recent results first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn list_results(&self, limit: u32) -> Result<Vec<ResultRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    snapshots: Arc<Mutex<HashMap<SessionId, SessionSnapshot>>>,
    results: Arc<Mutex<Vec<ResultRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotRepository for InMemoryRepository {
    async fn save_snapshot(
        &self,
        session_id: SessionId,
        snapshot: &SessionSnapshot,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(session_id, snapshot.clone());
        Ok(())
    }

    async fn load_snapshot(
        &self,
        session_id: SessionId,
    ) -> Result<Option<SessionSnapshot>, StorageError> {
        let guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&session_id).cloned())
    }

    async fn delete_snapshot(&self, session_id: SessionId) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&session_id);
        Ok(())
    }
}

#[async_trait]
impl ResultRepository for InMemoryRepository {
    async fn append_result(
        &self,
        session_id: SessionId,
        result: &SessionResult,
    ) -> Result<i64, StorageError> {
        let mut guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = i64::try_from(guard.len() + 1)
            .map_err(|_| StorageError::Serialization("result id overflow".into()))?;
        guard.push(ResultRow::new(id, session_id, result.clone()));
        Ok(id)
    }

    async fn list_results(&self, limit: u32) -> Result<Vec<ResultRow>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }
}

/// Aggregates the persistence contracts behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub snapshots: Arc<dyn SnapshotRepository>,
    pub results: Arc<dyn ResultRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let snapshots: Arc<dyn SnapshotRepository> = Arc::new(repo.clone());
        let results: Arc<dyn ResultRepository> = Arc::new(repo);
        Self { snapshots, results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{AnswerValue, SessionMode};
    use exam_core::time::fixed_now;
    use std::collections::{BTreeMap, BTreeSet};

    fn build_snapshot() -> SessionSnapshot {
        SessionSnapshot {
            index: 1,
            answers: vec![
                AnswerValue::FreeText("draft".into()),
                AnswerValue::ChoiceSet(BTreeSet::from(["A".to_string()])),
            ],
            scores: vec![None, Some(1)],
            submitted: vec![false, true],
            marked: BTreeSet::from([0]),
            notes: BTreeMap::from([(0, "revisit".to_string())]),
            timestamp: fixed_now(),
            question_ids: Vec::new(),
            remaining_secs: Some(42),
            timer_duration_secs: Some(600),
            timer_auto_submit: Some(true),
        }
    }

    #[tokio::test]
    async fn snapshot_save_load_delete() {
        let repo = InMemoryRepository::new();
        let id = SessionId::generate();
        assert!(repo.load_snapshot(id).await.unwrap().is_none());

        let snapshot = build_snapshot();
        repo.save_snapshot(id, &snapshot).await.unwrap();
        assert_eq!(repo.load_snapshot(id).await.unwrap(), Some(snapshot));

        repo.delete_snapshot(id).await.unwrap();
        assert!(repo.load_snapshot(id).await.unwrap().is_none());
        repo.delete_snapshot(id).await.unwrap();
    }

    #[tokio::test]
    async fn results_list_newest_first() {
        let storage = Storage::in_memory();
        let session = SessionId::generate();
        for points in [1, 2, 3] {
            let result =
                SessionResult::new(SessionMode::Assessment, 3, 3, points, 3, 60, fixed_now());
            storage.results.append_result(session, &result).await.unwrap();
        }

        let rows = storage.results.list_results(2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 3);
        assert_eq!(rows[0].result.correct_answers, 3);
        assert_eq!(rows[1].id, 2);
    }
}
