use exam_core::model::{SessionId, SessionResult};

use super::SqliteRepository;
use super::mapping::{conn, i64_from_u64, i64_from_usize, map_result_row};
use crate::repository::{ResultRepository, ResultRow, StorageError};

#[async_trait::async_trait]
impl ResultRepository for SqliteRepository {
    async fn append_result(
        &self,
        session_id: SessionId,
        result: &SessionResult,
    ) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO session_results (
                    session_id, mode, score, total_questions, correct_answers,
                    max_score, answered_count, time_spent_secs, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(session_id.to_string())
        .bind(result.mode.as_str())
        .bind(i64::from(result.score))
        .bind(i64_from_usize("total_questions", result.total_questions)?)
        .bind(i64::from(result.correct_answers))
        .bind(i64::from(result.max_score))
        .bind(i64_from_usize("answered_count", result.answered_count)?)
        .bind(i64_from_u64("time_spent_secs", result.time_spent_secs)?)
        .bind(result.completed_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn list_results(&self, limit: u32) -> Result<Vec<ResultRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, session_id, mode, score, total_questions, correct_answers,
                    max_score, answered_count, time_spent_secs, completed_at
                FROM session_results
                ORDER BY completed_at DESC, id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_result_row).collect()
    }
}
